//! Core domain entities.
//!
//! - [`ShortLink`] - a persisted short code → URL mapping
//! - [`NewShortLink`] - input for creating one

pub mod short_link;

pub use short_link::{NewShortLink, ShortLink};
