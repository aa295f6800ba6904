//! Domain layer: entities, the store contract, and the conversation model.
//!
//! Nothing here knows about HTTP, Telegram or PostgreSQL.
//!
//! - [`entities`] - Persisted data structures
//! - [`repositories`] - Link store trait
//! - [`conversation`] - Dialogue steps, transitions, replies and sessions
//! - [`click_event`] / [`click_worker`] - Asynchronous click accounting
//! - [`session_sweeper`] - Periodic removal of idle sessions
//!
//! # Click Processing Flow
//!
//! 1. The redirect resolver queues a [`click_event::ClickEvent`]
//! 2. [`click_worker::run_click_worker`] applies it with retry
//! 3. The counter is stored via [`repositories::LinkStore::increment_clicks`]

pub mod click_event;
pub mod click_worker;
pub mod conversation;
pub mod entities;
pub mod repositories;
pub mod session_sweeper;
