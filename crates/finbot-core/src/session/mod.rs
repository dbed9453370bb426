//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`MessageRole`, `ConversationMessage`)
//! - `model`: The append-only conversation log (`ConversationSession`)
//!
//! # Usage
//!
//! ```ignore
//! use finbot_core::session::{ConversationMessage, ConversationSession, MessageRole};
//! ```

mod message;
mod model;

// Re-export public API
pub use message::{ConversationMessage, MessageRole};
pub use model::{ConversationSession, GREETING_MESSAGE};
