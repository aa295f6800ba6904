//! Conversation model for chat-driven link creation.
//!
//! - [`state`] - Steps and sessions
//! - [`transition`] - Pure step/input → outcome function
//! - [`reply`] - Outbound message values
//! - [`session_store`] - Per-user session arena with expiry

pub mod reply;
pub mod session_store;
pub mod state;
pub mod transition;

pub use reply::{LinkEntry, Reply};
pub use session_store::{SessionGuard, SessionStore};
pub use state::{ConversationStep, Session};
pub use transition::{CodeChoice, Transition};
