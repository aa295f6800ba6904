//! Infrastructure layer: concrete stores, caches and the chat transport.
//!
//! - [`persistence`] - link store implementations
//! - [`cache`] - redirect cache (Redis and no-op)
//! - [`chat`] - Telegram transport and message dispatch

pub mod cache;
pub mod chat;
pub mod persistence;
