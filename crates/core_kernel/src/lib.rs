//! Core Kernel - Foundational types for the claims adjudication system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed identifiers
//! - Common error types
//! - Port abstractions for external collaborators

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{ClaimId, UserId};
pub use error::CoreError;
pub use ports::{DomainPort, PortError};
