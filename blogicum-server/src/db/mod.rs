//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool (bounded) - no Arc<Mutex<Connection>>
//! - Listings fetch authors, categories, locations and comment counts in one query
//! - Rely on DB constraints for uniqueness, handle conflicts - no check-then-insert
//! - Transactions for multi-step operations

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{connect, pool_options};
pub use repos::*;
