//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the claims pipeline, following the repository
//! pattern: [`repositories::ClaimsRepository`] implements the domain's
//! `ClaimStore` port, hiding SQLx behind the trait boundary. The finalize
//! path is a single transaction so a claim's decision, survey, image, and
//! explanation records commit together or not at all.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig};
pub use repositories::ClaimsRepository;
