pub mod api;
pub mod upstream;

pub use api::*;
