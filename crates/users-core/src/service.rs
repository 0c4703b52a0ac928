//! Users application service
//!
//! Orchestrates the list cache and the user store. The only domain error raised
//! here is [`UsersError::NotFound`]; everything else bubbles up from the store.

use crate::ports::{Cache, UserStore};
use crate::{NewUser, Result, User, UserChanges, UserId, UsersError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cache key holding the full user list
pub const USERS_CACHE_KEY: &str = "users-key";

/// How long a cached user list stays fresh
pub const DEFAULT_LIST_TTL: Duration = Duration::from_millis(10_000);

pub struct UsersService {
    store: Arc<dyn UserStore>,
    cache: Arc<dyn Cache>,
    list_ttl: Duration,
}

impl UsersService {
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn Cache>, list_ttl: Duration) -> Self {
        Self {
            store,
            cache,
            list_ttl,
        }
    }

    pub fn list_ttl(&self) -> Duration {
        self.list_ttl
    }

    /// List all users, served from the cache while the cached list is fresh.
    ///
    /// Mutations do not evict the cached list, so a caller may see a list up to
    /// `list_ttl` old.
    pub async fn find_all(&self) -> Result<Vec<User>> {
        if let Some(users) = self.cached_users().await {
            debug!("Users list cache hit ({} users)", users.len());
            return Ok(users);
        }

        debug!("Users list cache miss, loading from store");
        let users = self.store.get_all().await?;

        match serde_json::to_vec(&users) {
            Ok(data) => {
                if let Err(e) = self.cache.set(USERS_CACHE_KEY, data, self.list_ttl).await {
                    warn!("Failed to cache users list: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode users list for cache: {}", e),
        }

        Ok(users)
    }

    pub async fn find_one(&self, id: UserId) -> Result<User> {
        debug!("Finding user {}", id);
        self.store
            .get_by_id(id)
            .await?
            .ok_or(UsersError::NotFound(id))
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let user = self.store.create(new_user).await?;
        info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn update(&self, id: UserId, changes: UserChanges) -> Result<User> {
        let user = self.store.update(id, changes).await?;
        info!("Updated user {}", id);
        Ok(user)
    }

    pub async fn remove(&self, id: UserId) -> Result<User> {
        let user = self.store.delete(id).await?;
        info!("Deleted user {}", id);
        Ok(user)
    }

    async fn cached_users(&self) -> Option<Vec<User>> {
        let data = match self.cache.get(USERS_CACHE_KEY).await {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                warn!("Users list cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_slice::<Vec<User>>(&data) {
            Ok(users) => Some(users),
            Err(e) => {
                warn!("Discarding undecodable users list cache entry: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockCache, MockUserStore};
    use mockall::predicate::{always, eq};
    use tokio_test::{assert_err, assert_ok};

    fn user_dto() -> NewUser {
        NewUser {
            name: "Jhoe Doe".to_string(),
            email: "jhoedoe@email.com".to_string(),
            password: "1234567".to_string(),
        }
    }

    fn seeded(count: i32) -> Vec<User> {
        (1..=count).map(|id| User::from_new(id, user_dto())).collect()
    }

    fn service(store: MockUserStore, cache: MockCache) -> UsersService {
        UsersService::new(Arc::new(store), Arc::new(cache), DEFAULT_LIST_TTL)
    }

    fn empty_cache() -> MockCache {
        let mut cache = MockCache::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().returning(|_, _, _| Ok(()));
        cache
    }

    #[tokio::test]
    async fn test_find_all_miss_loads_store_and_populates_cache() {
        let mut store = MockUserStore::new();
        store
            .expect_get_all()
            .times(1)
            .returning(|| Ok(seeded(3)));

        let mut cache = MockCache::new();
        cache
            .expect_get()
            .with(eq(USERS_CACHE_KEY))
            .times(1)
            .returning(|_| Ok(None));
        cache
            .expect_set()
            .with(eq(USERS_CACHE_KEY), always(), eq(DEFAULT_LIST_TTL))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let users = assert_ok!(service(store, cache).find_all().await);
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn test_find_all_hit_skips_store() {
        let mut store = MockUserStore::new();
        store.expect_get_all().never();

        let cached = serde_json::to_vec(&seeded(2)).unwrap();
        let mut cache = MockCache::new();
        cache
            .expect_get()
            .times(1)
            .returning(move |_| Ok(Some(cached.clone())));
        cache.expect_set().never();

        let users = assert_ok!(service(store, cache).find_all().await);
        assert_eq!(users, seeded(2));
    }

    #[tokio::test]
    async fn test_find_all_cached_empty_list_is_a_hit() {
        let mut store = MockUserStore::new();
        store.expect_get_all().never();

        let mut cache = MockCache::new();
        cache
            .expect_get()
            .returning(|_| Ok(Some(b"[]".to_vec())));

        let users = assert_ok!(service(store, cache).find_all().await);
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_find_all_undecodable_entry_falls_back_to_store() {
        let mut store = MockUserStore::new();
        store
            .expect_get_all()
            .times(1)
            .returning(|| Ok(seeded(1)));

        let mut cache = MockCache::new();
        cache
            .expect_get()
            .returning(|_| Ok(Some(b"not json".to_vec())));
        cache.expect_set().times(1).returning(|_, _, _| Ok(()));

        let users = assert_ok!(service(store, cache).find_all().await);
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_find_all_survives_cache_failures() {
        let mut store = MockUserStore::new();
        store
            .expect_get_all()
            .times(1)
            .returning(|| Ok(seeded(3)));

        let mut cache = MockCache::new();
        cache
            .expect_get()
            .returning(|_| Err(UsersError::Cache("unreachable".to_string())));
        cache
            .expect_set()
            .returning(|_, _, _| Err(UsersError::Cache("unreachable".to_string())));

        let users = assert_ok!(service(store, cache).find_all().await);
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn test_find_all_propagates_store_failure() {
        let mut store = MockUserStore::new();
        store
            .expect_get_all()
            .returning(|| Err(UsersError::Database("connection refused".to_string())));

        let err = assert_err!(service(store, empty_cache()).find_all().await);
        assert!(matches!(err, UsersError::Database(_)));
    }

    #[tokio::test]
    async fn test_find_one_returns_user() {
        let mut store = MockUserStore::new();
        store
            .expect_get_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(User::from_new(id, user_dto()))));

        let user = assert_ok!(service(store, empty_cache()).find_one(1).await);
        assert_eq!(user, User::from_new(1, user_dto()));
    }

    #[tokio::test]
    async fn test_find_one_missing_is_not_found() {
        let mut store = MockUserStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));

        let err = assert_err!(service(store, empty_cache()).find_one(2).await);
        assert!(matches!(err, UsersError::NotFound(2)));
    }

    #[tokio::test]
    async fn test_create_delegates_to_store() {
        let mut store = MockUserStore::new();
        store
            .expect_create()
            .with(eq(user_dto()))
            .times(1)
            .returning(|new_user| Ok(User::from_new(7, new_user)));

        let mut cache = MockCache::new();
        cache.expect_get().never();
        cache.expect_set().never();

        let user = assert_ok!(service(store, cache).create(user_dto()).await);
        assert_eq!(user.id, 7);
        assert_eq!(user.name, "Jhoe Doe");
        assert_eq!(user.email, "jhoedoe@email.com");
        assert_eq!(user.password, "1234567");
    }

    #[tokio::test]
    async fn test_update_returns_stored_record() {
        let changes = UserChanges {
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        };

        let mut store = MockUserStore::new();
        store
            .expect_update()
            .with(eq(3), eq(changes.clone()))
            .times(1)
            .returning(|id, changes| {
                let mut user = User::from_new(id, user_dto());
                user.apply(changes);
                Ok(user)
            });

        let user = assert_ok!(service(store, empty_cache()).update(3, changes).await);
        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.email, "jhoedoe@email.com");
    }

    #[tokio::test]
    async fn test_update_propagates_not_found() {
        let mut store = MockUserStore::new();
        store
            .expect_update()
            .returning(|id, _| Err(UsersError::NotFound(id)));

        let err = assert_err!(
            service(store, empty_cache())
                .update(9, UserChanges::default())
                .await
        );
        assert!(matches!(err, UsersError::NotFound(9)));
    }

    #[tokio::test]
    async fn test_remove_delegates_to_store() {
        let mut store = MockUserStore::new();
        store
            .expect_delete()
            .with(eq(1))
            .times(1)
            .returning(|id| Ok(User::from_new(id, user_dto())));

        let removed = assert_ok!(service(store, empty_cache()).remove(1).await);
        assert_eq!(removed.id, 1);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let mut store = MockUserStore::new();
        store
            .expect_delete()
            .returning(|id| Err(UsersError::NotFound(id)));

        let err = assert_err!(service(store, empty_cache()).remove(5).await);
        assert!(err.is_not_found());
    }
}
