//! HTTP surface: redirects, health and banner.
//!
//! - [`dto`] - response bodies
//! - [`handlers`] - request handlers
//! - [`middleware`] - rate limiting and tracing

pub mod dto;
pub mod handlers;
pub mod middleware;
