pub mod json_extractor;
pub mod path_extractor;
pub mod query_extractor;

pub use json_extractor::*;
pub use path_extractor::*;
pub use query_extractor::*;
