pub mod completion;
pub mod query_generator;
pub mod report_synthesizer;
pub mod research_service;
pub mod retry;
pub mod search_runner;
pub mod web_search;

mod upstream;

pub use completion::*;
pub use query_generator::*;
pub use report_synthesizer::*;
pub use research_service::*;
pub use search_runner::*;
pub use web_search::*;
