//! Storage layer
//!
//! PostgreSQL (sqlx) is the authoritative user store. DashMap backs the
//! in-process list cache and the in-memory store used for local runs and tests.

pub mod db;
pub mod memory;
pub mod users_memory;

pub use db::{Database, PgUserStore};
pub use memory::MemoryCache;
pub use users_memory::MemoryUserStore;
