//! Error types for the users resource

use crate::UserId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UsersError>;

#[derive(Error, Debug)]
pub enum UsersError {
    #[error("User with ID {0} not found")]
    NotFound(UserId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl UsersError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UsersError::NotFound(_))
    }
}

impl From<serde_json::Error> for UsersError {
    fn from(e: serde_json::Error) -> Self {
        UsersError::Serialization(e.to_string())
    }
}
