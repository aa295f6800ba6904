//! Chat front end.
//!
//! - [`transport`] - transport contract and inbound message type
//! - [`telegram`] - Telegram Bot API long-polling transport
//! - [`dispatcher`] - command parsing and the receive/answer loop

pub mod dispatcher;
pub mod telegram;
pub mod transport;

pub use dispatcher::{ChatCommand, dispatch, run_chat_loop};
pub use telegram::TelegramTransport;
pub use transport::{ChatTransport, InboundMessage, TransportError};
