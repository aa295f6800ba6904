//! Pure helpers shared by the chat and redirect paths.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_safety`] - Destination URL safety policy and URL extraction

pub mod code_generator;
pub mod url_safety;
