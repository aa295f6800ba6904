//! Short code allocation with bounded collision retry.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_candidate, is_reserved_code};

/// Default number of random candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Errors returned by [`CodeAllocator::allocate_unique`].
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// Every candidate collided. Retryable and user-visible, not fatal.
    #[error("no free short code after {attempts} attempts")]
    Exhausted { attempts: usize },

    /// The occupancy check itself failed.
    #[error(transparent)]
    Store(#[from] AppError),
}

/// Produces short codes that are free in the store at call time.
///
/// With 64 symbols and 6 characters a collision is rare, so a handful of
/// attempts bounds latency without looping on a saturated keyspace. The limit
/// is configurable (`CODE_MAX_ATTEMPTS`); there is no longer-code fallback.
pub struct CodeAllocator {
    store: Arc<dyn LinkStore>,
    code_length: usize,
    max_attempts: usize,
}

impl CodeAllocator {
    /// Creates an allocator generating `code_length`-character codes.
    pub fn new(store: Arc<dyn LinkStore>, code_length: usize, max_attempts: usize) -> Self {
        Self {
            store,
            code_length,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Creates an allocator with 6-character codes and 5 attempts.
    pub fn with_defaults(store: Arc<dyn LinkStore>) -> Self {
        Self::new(store, DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Draws one random candidate. Not guaranteed unique.
    pub fn generate_candidate(&self) -> String {
        generate_candidate(self.code_length)
    }

    /// Returns true when `code` already maps to a stored link or is reserved
    /// by a static route.
    ///
    /// Custom codes go through this same check, but a collision there is
    /// reported back to the user rather than replaced with a random code.
    pub async fn is_taken(&self, code: &str) -> Result<bool, AppError> {
        if is_reserved_code(code) {
            return Ok(true);
        }

        Ok(self.store.find_by_code(code).await?.is_some())
    }

    /// Returns the first generated candidate that is free in the store.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::Exhausted`] after `max_attempts` consecutive collisions
    /// - [`AllocationError::Store`] if an occupancy check fails
    pub async fn allocate_unique(&self) -> Result<String, AllocationError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generate_candidate();

            if !self.is_taken(&candidate).await? {
                debug!(code = %candidate, attempt, "Allocated short code");
                return Ok(candidate);
            }

            debug!(code = %candidate, attempt, "Short code collision");
        }

        warn!(
            attempts = self.max_attempts,
            "Short code allocation exhausted"
        );
        Err(AllocationError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
