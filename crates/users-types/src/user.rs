//! User types

use serde::{Deserialize, Serialize};

/// Storage-assigned user identifier
pub type UserId = i32;

/// User account as persisted in the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Partial user update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl User {
    /// Build the stored record for a freshly assigned id
    pub fn from_new(id: UserId, new_user: NewUser) -> Self {
        Self {
            id,
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
        }
    }

    /// Merge the supplied fields into this record
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(password) = changes.password {
            self.password = password;
        }
    }
}
