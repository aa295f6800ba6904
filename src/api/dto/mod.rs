//! Response bodies of the HTTP surface.

pub mod health;
pub mod index;
