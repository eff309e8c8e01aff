pub mod agent;
pub mod bridge;
pub mod crew;
mod error;
pub use error::*;
pub mod tools;

pub use gembridge_llm as llm;
