//! Pure transition function for the link-creation dialogue.
//!
//! Given the current step and the user's text, [`transition`] decides the
//! next step and reply without touching the store. Code selection needs a
//! store round-trip, so it comes back as [`Transition::SelectCode`] and the
//! engine finishes it.
//!
//! | Step | Input | Result |
//! |---|---|---|
//! | any | `cancel` | [`Transition::End`] with [`Reply::Cancelled`] |
//! | `AwaitingUrl` | acceptable URL | `AwaitingCode` + [`Reply::ChooseCode`] |
//! | `AwaitingUrl` | no URL | stay + [`Reply::InvalidUrlFormat`] |
//! | `AwaitingUrl` | unsafe URL | stay + [`Reply::UrlRejected`] |
//! | `AwaitingCode` / `AwaitingRetryCode` | `random` | [`Transition::SelectCode`] |
//! | `AwaitingCode` / `AwaitingRetryCode` | valid code | [`Transition::SelectCode`] |
//! | `AwaitingCode` / `AwaitingRetryCode` | invalid code | stay + [`Reply::InvalidCode`] |

use super::reply::Reply;
use super::state::ConversationStep;
use crate::utils::code_generator::is_valid_code;
use crate::utils::url_safety::{extract_url, is_acceptable};

/// How the user wants their code chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeChoice {
    Random,
    Custom(String),
}

/// Outcome of applying one message to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Keep the current step.
    Stay(Reply),
    /// Move to `next`.
    Advance { next: ConversationStep, reply: Reply },
    /// Drop the session.
    End(Reply),
    /// Check and persist a code for `pending_url`.
    SelectCode {
        pending_url: String,
        choice: CodeChoice,
    },
}

/// True for the case-insensitive `cancel` keyword.
pub fn is_cancel(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("cancel")
}

/// Classifies a code-step message. `None` means the code is malformed.
pub fn parse_code_choice(text: &str) -> Option<CodeChoice> {
    let trimmed = text.trim();

    if trimmed.eq_ignore_ascii_case("random") {
        return Some(CodeChoice::Random);
    }

    is_valid_code(trimmed).then(|| CodeChoice::Custom(trimmed.to_string()))
}

/// Applies `text` to a session currently at `step`.
pub fn transition(step: &ConversationStep, text: &str) -> Transition {
    if is_cancel(text) {
        return Transition::End(Reply::Cancelled);
    }

    match step {
        ConversationStep::AwaitingUrl => match extract_url(text) {
            None => Transition::Stay(Reply::InvalidUrlFormat),
            Some(url) if !is_acceptable(&url) => Transition::Stay(Reply::UrlRejected),
            Some(url) => Transition::Advance {
                next: ConversationStep::AwaitingCode {
                    pending_url: url.clone(),
                },
                reply: Reply::ChooseCode { url },
            },
        },
        ConversationStep::AwaitingCode { pending_url }
        | ConversationStep::AwaitingRetryCode { pending_url, .. } => {
            match parse_code_choice(text) {
                Some(choice) => Transition::SelectCode {
                    pending_url: pending_url.clone(),
                    choice,
                },
                None => Transition::Stay(Reply::InvalidCode),
            }
        }
    }
}
