//! Periodic removal of idle conversation sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::domain::conversation::SessionStore;

/// Sweeps expired sessions every `every` until the task is dropped.
///
/// Expiry is silent: no message goes to the user, whose next message simply
/// finds no active session.
pub async fn run_session_sweeper(sessions: Arc<SessionStore>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let removed = sessions.sweep_expired();
        if removed > 0 {
            debug!(removed, "Swept idle sessions");
        }
    }
}
