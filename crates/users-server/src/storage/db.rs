//! PostgreSQL database layer

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::sync::Arc;
use users_core::{NewUser, User, UserChanges, UserId, UserStore, UsersError};

use crate::config::PostgresConfig;

/// Owner of the connection pool, created once at startup
pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        tracing::info!(
            "Connecting to PostgreSQL at {}:{}/{}",
            config.host,
            config.port,
            config.database
        );

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to PostgreSQL at {}:{}",
                    config.host, config.port
                )
            })?;

        tracing::info!("PostgreSQL connection established");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    pub fn user_store(&self) -> PgUserStore {
        PgUserStore::new(self.pool())
    }
}

/// `UserStore` over the `users` table
///
/// The table itself is managed outside this service.
pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: UserId) -> users_core::Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_all(&self) -> users_core::Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, password FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, new_user: NewUser) -> users_core::Result<User> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .fetch_one(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> users_core::Result<User> {
        // Merge and persist in one statement so a concurrent delete surfaces as a miss
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password = COALESCE($4, password)
            WHERE id = $1
            RETURNING id, name, email, password
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_error)?;

        row.map(|r| r.into()).ok_or(UsersError::NotFound(id))
    }

    async fn delete(&self, id: UserId) -> users_core::Result<User> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            DELETE FROM users WHERE id = $1
            RETURNING id, name, email, password
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_error)?;

        row.map(|r| r.into()).ok_or(UsersError::NotFound(id))
    }
}

fn db_error(e: sqlx::Error) -> UsersError {
    UsersError::Database(e.to_string())
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            name: r.name,
            email: r.email,
            password: r.password,
        }
    }
}
