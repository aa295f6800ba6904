//! Application layer.
//!
//! Services consume the [`crate::domain::repositories::LinkStore`] trait and
//! expose one entry point per use case to the chat and HTTP layers.
//!
//! - [`services::ConversationEngine`] - chat dialogue handlers
//! - [`services::CodeAllocator`] - short code allocation with bounded retry
//! - [`services::RedirectResolver`] - code → destination with click accounting

pub mod services;
