pub mod config;
pub mod error;
pub mod finance;
pub mod responder;
pub mod session;
pub mod snapshot;

// Re-export common error type
pub use error::{FinbotError, Result};
