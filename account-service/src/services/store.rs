//! Record store collaborators.
//!
//! The service reaches persistence through the narrow `RecordStore` trait;
//! `PgStore` is the production Postgres implementation and `MemoryStore`
//! backs hermetic tests.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

use crate::models::{NewUser, User, UserUpdate};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn create_user(&self, fields: NewUser) -> Result<User, StoreError>;
    async fn update_user(&self, id: i64, fields: UserUpdate) -> Result<Option<User>, StoreError>;
    /// Returns the number of deleted rows (0 when the id does not exist).
    async fn delete_user(&self, id: i64) -> Result<u64, StoreError>;
    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> Result<bool, StoreError>;
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// PostgreSQL record store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn create_user(&self, fields: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.password_hash)
        .bind(fields.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i64, fields: UserUpdate) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.email)
        .bind(fields.password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-process record store for tests.
pub struct MemoryStore {
    users: Mutex<HashMap<i64, User>>,
    next_id: Mutex<i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            next_id: Mutex::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.lock().unwrap();
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }

    async fn create_user(&self, fields: NewUser) -> Result<User, StoreError> {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;

        let now = chrono::Utc::now();
        let user = User {
            id,
            name: fields.name,
            email: fields.email,
            password_hash: fields.password_hash,
            role: fields.role,
            created_at: now,
            updated_at: now,
        };

        self.users.lock().unwrap().insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, fields: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = fields.name {
            user.name = name;
        }
        if let Some(email) = fields.email {
            user.email = email;
        }
        if let Some(password_hash) = fields.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = chrono::Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<u64, StoreError> {
        let mut users = self.users.lock().unwrap();
        Ok(if users.remove(&id).is_some() { 1 } else { 0 })
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> Result<bool, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .values()
            .any(|u| u.email == email && Some(u.id) != exclude_id))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
