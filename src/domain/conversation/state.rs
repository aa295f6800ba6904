//! Per-user conversation state.

use chrono::{DateTime, Duration, Utc};

/// Where a user is in the link-creation dialogue.
///
/// Each step carries exactly the data it needs, so a pending URL can't be
/// missing while choosing a code, and the taken code only exists in the retry
/// step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationStep {
    /// Session started; waiting for the long URL.
    AwaitingUrl,
    /// URL accepted; waiting for `random` or a custom code.
    AwaitingCode { pending_url: String },
    /// The custom code the user asked for was taken; waiting for another choice.
    AwaitingRetryCode {
        pending_url: String,
        taken_code: String,
    },
}

impl ConversationStep {
    /// The accepted URL, once the user is past URL intake.
    pub fn pending_url(&self) -> Option<&str> {
        match self {
            Self::AwaitingUrl => None,
            Self::AwaitingCode { pending_url } | Self::AwaitingRetryCode { pending_url, .. } => {
                Some(pending_url)
            }
        }
    }

    /// The code found taken, present only in [`Self::AwaitingRetryCode`].
    pub fn taken_code(&self) -> Option<&str> {
        match self {
            Self::AwaitingRetryCode { taken_code, .. } => Some(taken_code),
            _ => None,
        }
    }
}

/// An active session: the current step plus when it last moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub step: ConversationStep,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(step: ConversationStep, last_activity: DateTime<Utc>) -> Self {
        Self {
            step,
            last_activity,
        }
    }

    /// True when the session has been idle strictly longer than `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_activity) > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_url_per_step() {
        assert_eq!(ConversationStep::AwaitingUrl.pending_url(), None);

        let code = ConversationStep::AwaitingCode {
            pending_url: "https://example.com".to_string(),
        };
        assert_eq!(code.pending_url(), Some("https://example.com"));

        let retry = ConversationStep::AwaitingRetryCode {
            pending_url: "https://example.com".to_string(),
            taken_code: "promo".to_string(),
        };
        assert_eq!(retry.pending_url(), Some("https://example.com"));
        assert_eq!(retry.taken_code(), Some("promo"));
        assert_eq!(code.taken_code(), None);
    }

    #[test]
    fn test_expiry_is_strict() {
        let start = Utc::now();
        let ttl = Duration::minutes(10);
        let session = Session::new(ConversationStep::AwaitingUrl, start);

        assert!(!session.is_expired(start + ttl, ttl));
        assert!(session.is_expired(start + ttl + Duration::milliseconds(1), ttl));
    }
}
