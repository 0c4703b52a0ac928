//! Users Server
//!
//! HTTP resource for listing, fetching, creating, updating, and deleting users.
//! PostgreSQL holds the records; the full user list is served through a
//! short-lived in-memory cache.
//!
//! # Response shape
//!
//! Users are stored with their password, but every HTTP response renders them
//! as `{id, name, email}` ([`handlers::users::UserResponse`]). Clients that
//! expect the password to be echoed back (as the full stored record would)
//! will not find it.

pub mod config;
pub mod error;
pub mod handlers;
pub mod storage;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use users_core::{Cache, UserStore, UsersService};

use config::{Config, DatabaseBackend};
use storage::{Database, MemoryCache, MemoryUserStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UsersService>,
}

impl AppState {
    pub fn new(users: UsersService) -> Self {
        Self {
            users: Arc::new(users),
        }
    }
}

/// Wire the configured store and the list cache into the users service
pub async fn build_state(config: &Config) -> Result<AppState> {
    let store: Arc<dyn UserStore> = match config.database_backend {
        DatabaseBackend::Postgres => {
            info!("Initializing PostgreSQL user store...");
            let db = Database::connect(&config.postgres)
                .await
                .context("Failed to initialize database")?;
            Arc::new(db.user_store())
        }
        DatabaseBackend::Memory => {
            info!("Using in-memory user store (data is lost on restart)");
            Arc::new(MemoryUserStore::new())
        }
    };

    info!("Initializing in-memory cache...");
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());

    let users = UsersService::new(store, cache, config.users_cache_ttl);
    info!("Users service initialized (list TTL {:?})", users.list_ttl());

    Ok(AppState::new(users))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(user_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::users::list).post(handlers::users::create),
        )
        .route(
            "/users/:id",
            get(handlers::users::get)
                .patch(handlers::users::update)
                .delete(handlers::users::delete),
        )
}
