//! Link store implementations.
//!
//! - [`PgLinkStore`] - PostgreSQL via SQLx
//! - [`MemoryLinkStore`] - in-process map for tests and local runs

pub mod memory_link_store;
pub mod pg_link_store;

pub use memory_link_store::MemoryLinkStore;
pub use pg_link_store::PgLinkStore;
