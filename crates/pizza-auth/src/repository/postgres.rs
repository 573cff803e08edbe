//! PostgreSQL user and role store
//!
//! Runtime-checked queries over a `PgPool`. The schema and the role seed live
//! in `migrations/` and are embedded into the binary.

use async_trait::async_trait;
use sqlx::{
    postgres::{PgPool, PgPoolOptions, PgRow},
    Row,
};
use std::str::FromStr;

use crate::{
    models::{NewUser, Role, User, UserStatus, UserUpdate},
    rbac::RoleType,
    traits::{RoleRepository, UserRepository},
    AuthError, AuthResult,
};

const USER_COLUMNS: &str = "u.id, u.role_id, u.first_name, u.last_name, u.email, u.password, \
     u.phone, u.status, u.created_at, u.updated_at, u.deleted_at, \
     r.name AS role_name, r.description AS role_description, \
     r.created_at AS role_created_at, r.updated_at AS role_updated_at";

/// Users and roles stored in PostgreSQL
#[derive(Debug, Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` with a bounded pool
    pub async fn connect(database_url: &str, max_connections: u32) -> AuthResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations, seeding the standard roles
    pub async fn migrate(&self) -> AuthResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AuthError::database_error(format!("Migration failed: {}", e)))?;
        tracing::info!("auth schema is up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_user(&self, filter: &str, bind: UserKey<'_>) -> AuthResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users u LEFT JOIN roles r ON r.id = u.role_id WHERE {} = $1",
            USER_COLUMNS, filter
        );
        let query = sqlx::query(&sql);
        let query = match bind {
            UserKey::Id(id) => query.bind(id),
            UserKey::Email(email) => query.bind(email),
        };

        let row = query.fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn fetch_user_by_id(&self, id: i64) -> AuthResult<User> {
        self.fetch_user("u.id", UserKey::Id(id))
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

enum UserKey<'a> {
    Id(i64),
    Email(&'a str),
}

fn role_from_row(row: &PgRow) -> AuthResult<Role> {
    let name: String = row.try_get("name")?;
    Ok(Role {
        id: row.try_get("id")?,
        name: RoleType::from_str(&name)?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> AuthResult<User> {
    let role_id: i64 = row.try_get("role_id")?;
    let role_name: Option<String> = row.try_get("role_name")?;
    let role = match role_name {
        Some(name) => Some(Role {
            id: role_id,
            name: RoleType::from_str(&name)?,
            description: row.try_get("role_description")?,
            created_at: row.try_get("role_created_at")?,
            updated_at: row.try_get("role_updated_at")?,
        }),
        None => None,
    };

    let status: String = row.try_get("status")?;
    Ok(User {
        id: row.try_get("id")?,
        role_id,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
        phone: row.try_get("phone")?,
        status: UserStatus::from_str(&status)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
        role,
    })
}

#[async_trait]
impl UserRepository for PgAuthStore {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        self.fetch_user("u.email", UserKey::Email(email)).await
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        self.fetch_user("u.id", UserKey::Id(id)).await
    }

    async fn create(&self, user: NewUser) -> AuthResult<User> {
        // The unique index on email rejects a concurrent duplicate; the sqlx
        // error conversion turns that into EmailTaken.
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (role_id, first_name, last_name, email, password, phone) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(user.role_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(user_id = id, "user row inserted");
        self.fetch_user_by_id(id).await
    }

    async fn update(&self, id: i64, update: UserUpdate) -> AuthResult<User> {
        let result = sqlx::query(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                email = COALESCE($4, email), \
                phone = COALESCE($5, phone), \
                status = COALESCE($6, status), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(update.status.map(|s| s.as_str()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        self.fetch_user_by_id(id).await
    }

    async fn delete(&self, id: i64) -> AuthResult<()> {
        let result =
            sqlx::query("UPDATE users SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for PgAuthStore {
    async fn find_by_name(&self, name: RoleType) -> AuthResult<Option<Role>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM roles WHERE name = $1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(role_from_row).transpose()
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<Role>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(role_from_row).transpose()
    }

    async fn find_all(&self) -> AuthResult<Vec<Role>> {
        let rows = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM roles ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(role_from_row).collect()
    }
}
