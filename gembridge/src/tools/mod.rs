mod tool;
pub use tool::*;
mod toolset;
pub use toolset::*;

pub use gembridge_llm::tools::{Parameters, Property, ToolParameters};
