//! User accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Row, SqlitePool};

use crate::error::{AuthError, Result};
use crate::password::{hash_password, validate_password, verify_password};

/// A user account. Users sign in with their email.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique, lower-case login email.
    pub email: String,
    #[serde(skip)]
    password_hash: String,
    /// Last login timestamp.
    pub last_login: Option<DateTime<Utc>>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates an unsaved user, hashing the password.
    pub fn create(name: &str, email: &str, password: &str) -> Result<Self> {
        validate_password(password)?;
        Ok(Self {
            id: 0,
            name: name.to_string(),
            email: email.trim().to_lowercase(),
            password_hash: hash_password(password)?,
            last_login: None,
            created_at: Utc::now(),
        })
    }

    /// Checks if the given password matches this user's password.
    pub fn check_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    /// Sets a new password for this user.
    pub fn set_password(&mut self, password: &str) -> Result<()> {
        validate_password(password)?;
        self.password_hash = hash_password(password)?;
        Ok(())
    }

    /// Inserts or updates the user.
    pub async fn save(&mut self, pool: &SqlitePool) -> Result<()> {
        if self.id == 0 {
            let result = sqlx::query(
                r"
                INSERT INTO users (name, email, password_hash, last_login, created_at)
                VALUES (?, ?, ?, ?, ?)
                ",
            )
            .bind(&self.name)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(self.last_login)
            .bind(self.created_at)
            .execute(pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::EmailTaken,
                other => AuthError::Database(other),
            })?;

            self.id = result.last_insert_rowid();
        } else {
            sqlx::query(
                r"
                UPDATE users
                SET name = ?, email = ?, password_hash = ?, last_login = ?
                WHERE id = ?
                ",
            )
            .bind(&self.name)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(self.last_login)
            .bind(self.id)
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    /// Finds a user by ID.
    pub async fn get(pool: &SqlitePool, id: i64) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Finds a user by email, case-insensitively.
    pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(pool)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Returns the number of accounts.
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM users").fetch_one(pool).await?;
        Ok(row.get(0))
    }
}

/// SQL to create the users table.
pub const CREATE_USER_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(100) NOT NULL,
    email VARCHAR(254) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    last_login TIMESTAMP,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)
";

/// Creates the users table if it doesn't exist.
pub async fn create_user_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_USER_TABLE_SQL).execute(pool).await?;
    Ok(())
}
