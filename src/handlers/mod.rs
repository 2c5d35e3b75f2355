pub mod health;
pub mod index;
pub mod research;

pub use health::*;
pub use index::*;
pub use research::*;
