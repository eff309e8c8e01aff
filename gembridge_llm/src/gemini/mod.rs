mod config;
pub use config::*;
mod llm;
pub use llm::*;
mod schema;
pub use schema::*;
