//! Login sessions.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::{FromRow, SqlitePool};

use crate::error::{AuthError, Result};
use crate::user::User;

/// A signed-in session, identified by a random key sent as a cookie or
/// bearer token.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    /// Unique session key (64 character hex string).
    pub session_key: String,
    /// Signed-in user.
    pub user_id: i64,
    /// Session expiration timestamp.
    pub expire_date: DateTime<Utc>,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Default session lifetime.
    pub const DEFAULT_EXPIRY_DAYS: i64 = 14;

    /// Opens a session for `user` lasting `days`.
    pub fn for_user(user: &User, days: i64) -> Self {
        let now = Utc::now();
        Self {
            session_key: generate_session_key(),
            user_id: user.id,
            expire_date: now + Duration::days(days),
            created_at: now,
        }
    }

    /// Returns whether this session has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expire_date
    }

    /// Saves the session to the database.
    pub async fn save(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO sessions (session_key, user_id, expire_date, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(session_key) DO UPDATE SET expire_date = excluded.expire_date
            ",
        )
        .bind(&self.session_key)
        .bind(self.user_id)
        .bind(self.expire_date)
        .bind(self.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Deletes the session from the database.
    pub async fn delete(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE session_key = ?")
            .bind(&self.session_key)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Finds a live session by its key.
    pub async fn get_by_key(pool: &SqlitePool, session_key: &str) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM sessions WHERE session_key = ? AND expire_date > ?",
        )
        .bind(session_key)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::SessionNotFound)
    }

    /// Deletes all sessions for a user.
    pub async fn delete_for_user(pool: &SqlitePool, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Deletes all expired sessions.
    pub async fn clear_expired(pool: &SqlitePool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expire_date < ?")
            .bind(Utc::now())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Generates a random 256-bit session key, hex encoded.
fn generate_session_key() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// SQL to create the sessions table.
pub const CREATE_SESSION_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    session_key VARCHAR(64) PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expire_date TIMESTAMP NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)
";

/// Creates the sessions table if it doesn't exist.
pub async fn create_session_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_SESSION_TABLE_SQL).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_generation() {
        let key1 = generate_session_key();
        let key2 = generate_session_key();

        assert_eq!(key1.len(), 64);
        assert!(key1.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_session_expiration() {
        let user = User::create("Ada", "ada@example.com", "password123").unwrap();
        let mut session = Session::for_user(&user, Session::DEFAULT_EXPIRY_DAYS);
        assert!(!session.is_expired());

        session.expire_date = Utc::now() - Duration::days(1);
        assert!(session.is_expired());
    }
}
