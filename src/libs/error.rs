//! Error types shared by the break engine.
//!
//! The engine distinguishes three failure kinds:
//!
//! - **`InvalidConfiguration`**: a duration or predicate that cannot be used,
//!   rejected before any state is mutated
//! - **`PreconditionViolated`**: a break operation invoked in a stage that
//!   does not support it
//! - **`DeserializationFailed`**: a persisted timer state that is malformed or
//!   carries an unsupported version
//!
//! Configuration and deserialization errors are returned to the caller.
//! Precondition errors are produced by [`crate::libs::break_control::BreakControl`]
//! and logged as warnings by the coordinator.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("precondition violated: {0}")]
    PreconditionViolated(String),

    #[error("failed to restore timer state: {0}")]
    DeserializationFailed(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
