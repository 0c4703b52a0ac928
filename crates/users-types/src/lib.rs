//! Users Types - Pure type definitions
//!
//! This crate contains only plain data types with no async runtime dependencies,
//! so it can be shared by the storage adapters, the service, and any client.

pub mod user;

pub use user::*;
