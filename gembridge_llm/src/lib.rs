mod llm;
pub use llm::*;
mod messages;
pub use messages::*;
mod error;
pub use error::*;
mod capability;
pub use capability::*;
mod content;
pub use content::*;
mod decorator;
pub use decorator::*;
mod generation;
pub use generation::*;

pub mod gemini;
pub mod mock;
pub mod tools;
pub use tools::{FunctionDeclaration, Parameters, Property, ToolParameters};

pub use gembridge_derive::ToolParameters;
