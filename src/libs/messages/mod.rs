//! User-facing messages.
//!
//! - [`types`]: the [`Message`] enum
//! - [`display`]: the text of each message
//! - [`macros`]: `msg_*` macros that print messages, or log them through
//!   `tracing` in debug mode

pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;
