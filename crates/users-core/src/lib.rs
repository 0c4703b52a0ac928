//! Users Core Library
//!
//! Domain error, port traits, and the application service for the users resource.

// Re-export pure types from users-types
pub use users_types::*;

pub mod error;
pub mod ports;
pub mod service;

pub use error::{Result, UsersError};
pub use ports::{Cache, UserStore};
pub use service::{UsersService, DEFAULT_LIST_TTL, USERS_CACHE_KEY};
