pub mod agent;
pub mod chat;
pub mod cli;
pub mod error;
pub mod mcp;
pub mod models;
pub mod shortcuts;
pub mod store;
pub mod tools;

pub use error::{Result, TaskError};
pub use models::*;
