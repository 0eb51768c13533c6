//! Claims domain error types

use thiserror::Error;

/// Errors raised by the claim aggregate
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid claim state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}
