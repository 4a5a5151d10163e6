//! Database layer - connection pool, migrations, and repositories
//!
//! # Design Principles
//!
//! - Connection pool with explicit limits - no shared mutable connection
//! - Mutating operations own their transaction: validate inside it,
//!   commit on success, nothing partial on failure
//! - Constraint violations are translated to domain errors, never
//!   surfaced raw

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::create_pool;
pub use repos::*;
