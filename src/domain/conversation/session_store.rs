//! In-memory session arena with per-user serialization and idle expiry.
//!
//! # Concurrency
//!
//! Each user owns a slot: an `Arc<tokio::sync::Mutex<Option<Session>>>`
//! stored in a [`DashMap`]. A message handler clones the slot out of the map
//! (holding the shard lock only for that clone) and then locks the slot for
//! the whole transition, store round-trips included. Two messages from the
//! same user therefore run one after the other, while other users never wait
//! on that slot.
//!
//! # Expiry
//!
//! Sessions idle strictly longer than the TTL are treated as absent by every
//! lookup and are physically removed by [`SessionStore::sweep_expired`]. The
//! sweep skips any slot that a handler holds or is about to lock, so a
//! session touched mid-sweep survives.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::state::{ConversationStep, Session};

/// Default idle time after which a session is dropped.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 10 * 60;

type Slot = Arc<Mutex<Option<Session>>>;

/// Owner of all conversation sessions.
pub struct SessionStore {
    slots: DashMap<String, Slot>,
    ttl: Duration,
}

impl SessionStore {
    /// Creates an empty store expiring sessions idle longer than `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Locks `user_id`'s slot for one transition.
    ///
    /// Waits only for an in-flight transition of the same user.
    pub async fn lock(&self, user_id: &str) -> SessionGuard {
        let slot = self
            .slots
            .entry(user_id.to_string())
            .or_default()
            .value()
            .clone();

        SessionGuard {
            slot: slot.lock_owned().await,
            ttl: self.ttl,
        }
    }

    /// Returns a copy of the user's live session, if any.
    pub async fn snapshot(&self, user_id: &str) -> Option<Session> {
        self.snapshot_at(user_id, Utc::now()).await
    }

    /// Same as [`Self::snapshot`] with an explicit clock reading.
    pub async fn snapshot_at(&self, user_id: &str, now: DateTime<Utc>) -> Option<Session> {
        let slot = self.slots.get(user_id).map(|entry| entry.value().clone())?;
        let mut guard = SessionGuard {
            slot: slot.lock_owned().await,
            ttl: self.ttl,
        };

        guard.current_at(now).cloned()
    }

    /// Removes sessions idle past the TTL. Returns how many slots were dropped.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    /// Same as [`Self::sweep_expired`] with an explicit clock reading.
    ///
    /// Also reclaims slots left empty by finished or cancelled sessions.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.ttl;
        let mut removed = 0;

        self.slots.retain(|_, slot| {
            // Another clone means a handler holds the slot or is waiting for it.
            if Arc::strong_count(slot) > 1 {
                return true;
            }

            let keep = match slot.try_lock() {
                Ok(session) => session
                    .as_ref()
                    .is_some_and(|session| !session.is_expired(now, ttl)),
                Err(_) => true,
            };

            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    /// Number of live (non-expired) sessions. Busy slots count as live.
    pub fn active_sessions(&self) -> usize {
        let now = Utc::now();

        self.slots
            .iter()
            .filter(|entry| match entry.value().try_lock() {
                Ok(session) => session
                    .as_ref()
                    .is_some_and(|session| !session.is_expired(now, self.ttl)),
                Err(_) => true,
            })
            .count()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SESSION_TTL_SECONDS))
    }
}

/// Exclusive access to one user's session for the duration of a transition.
pub struct SessionGuard {
    slot: OwnedMutexGuard<Option<Session>>,
    ttl: Duration,
}

impl SessionGuard {
    /// The live session, dropping it first if it has gone idle past the TTL.
    pub fn current(&mut self) -> Option<&Session> {
        self.current_at(Utc::now())
    }

    /// Same as [`Self::current`] with an explicit clock reading.
    pub fn current_at(&mut self, now: DateTime<Utc>) -> Option<&Session> {
        if self
            .slot
            .as_ref()
            .is_some_and(|session| session.is_expired(now, self.ttl))
        {
            *self.slot = None;
        }

        self.slot.as_ref()
    }

    /// Replaces the session with a fresh one at `step`.
    pub fn set(&mut self, step: ConversationStep) {
        self.set_at(step, Utc::now());
    }

    /// Same as [`Self::set`] with an explicit activity timestamp.
    pub fn set_at(&mut self, step: ConversationStep, at: DateTime<Utc>) {
        *self.slot = Some(Session::new(step, at));
    }

    /// Refreshes `last_activity` without changing the step.
    pub fn touch(&mut self) {
        if let Some(session) = self.slot.as_mut() {
            session.last_activity = Utc::now();
        }
    }

    /// Ends the session.
    pub fn clear(&mut self) {
        *self.slot = None;
    }
}
