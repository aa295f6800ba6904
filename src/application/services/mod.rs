//! Services coordinating the domain model with the link store.

pub mod code_allocator;
pub mod conversation_engine;
pub mod redirect_resolver;

pub use code_allocator::{AllocationError, CodeAllocator};
pub use conversation_engine::ConversationEngine;
pub use redirect_resolver::{RedirectResolver, ResolveError};
