//! In-memory user store using DashMap
//!
//! Mirrors the Postgres store's contract: ids come from a monotonically
//! increasing counter and are never handed out twice, even after a delete.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use users_core::{NewUser, Result, User, UserChanges, UserId, UserStore, UsersError};

pub struct MemoryUserStore {
    users: DashMap<UserId, User>,
    next_id: AtomicI32,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User::from_new(id, new_user);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User> {
        match self.users.entry(id) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().apply(changes);
                Ok(entry.get().clone())
            }
            Entry::Vacant(_) => Err(UsersError::NotFound(id)),
        }
    }

    async fn delete(&self, id: UserId) -> Result<User> {
        self.users
            .remove(&id)
            .map(|(_, user)| user)
            .ok_or(UsersError::NotFound(id))
    }
}
