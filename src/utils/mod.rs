pub mod markdown;
pub mod prompts;

pub use self::markdown::*;
pub use self::prompts::*;
