//! Database authentication backend.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{AuthError, Result};
use crate::session::Session;
use crate::user::User;

/// Authenticates users against the `users` and `sessions` tables.
#[derive(Debug, Clone)]
pub struct DatabaseBackend {
    session_days: i64,
}

impl Default for DatabaseBackend {
    fn default() -> Self {
        Self::new(Session::DEFAULT_EXPIRY_DAYS)
    }
}

impl DatabaseBackend {
    /// Creates a backend whose sessions last `session_days`.
    pub fn new(session_days: i64) -> Self {
        Self { session_days }
    }

    /// Creates an account and opens a session for it.
    pub async fn register(
        &self,
        pool: &SqlitePool,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, Session)> {
        let mut user = User::create(name, email, password)?;
        match User::get_by_email(pool, &user.email).await {
            Ok(_) => return Err(AuthError::EmailTaken),
            Err(AuthError::UserNotFound) => {}
            Err(e) => return Err(e),
        }
        user.last_login = Some(Utc::now());
        user.save(pool).await?;
        info!(user_id = user.id, "account registered");

        let session = Session::for_user(&user, self.session_days);
        session.save(pool).await?;
        Ok((user, session))
    }

    /// Authenticates a user by email and password.
    ///
    /// Returns `None` if the credentials do not match.
    pub async fn authenticate(
        &self,
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        let user = match User::get_by_email(pool, email).await {
            Ok(u) => u,
            Err(AuthError::UserNotFound) => return Ok(None),
            Err(e) => return Err(e),
        };

        if !user.check_password(password) {
            debug!(user_id = user.id, "password mismatch");
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Authenticates a user and opens a session.
    pub async fn login(
        &self,
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<(User, Session)> {
        let mut user = self
            .authenticate(pool, email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        user.last_login = Some(Utc::now());
        user.save(pool).await?;

        let session = Session::for_user(&user, self.session_days);
        session.save(pool).await?;
        info!(user_id = user.id, "user logged in");
        Ok((user, session))
    }

    /// Ends a session. Unknown keys are ignored.
    pub async fn logout(&self, pool: &SqlitePool, session_key: &str) -> Result<()> {
        match Session::get_by_key(pool, session_key).await {
            Ok(session) => session.delete(pool).await,
            Err(AuthError::SessionNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Returns the user signed in with `session_key`, if the session is live.
    pub async fn get_user(&self, pool: &SqlitePool, session_key: &str) -> Result<Option<User>> {
        let session = match Session::get_by_key(pool, session_key).await {
            Ok(s) => s,
            Err(AuthError::SessionNotFound) => return Ok(None),
            Err(e) => return Err(e),
        };

        match User::get(pool, session.user_id).await {
            Ok(user) => Ok(Some(user)),
            Err(AuthError::UserNotFound) => {
                session.delete(pool).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Changes a user's password and signs out every session.
    pub async fn change_password(
        &self,
        pool: &SqlitePool,
        user_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = User::get(pool, user_id).await?;
        if !user.check_password(old_password) {
            return Err(AuthError::InvalidCredentials);
        }

        user.set_password(new_password)?;
        user.save(pool).await?;
        Session::delete_for_user(pool, user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        create_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let pool = create_test_pool().await;
        let backend = DatabaseBackend::default();

        let (user, session) = backend
            .register(&pool, "Ada", "Ada@Example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(
            backend.get_user(&pool, &session.session_key).await.unwrap().unwrap().id,
            user.id
        );

        let (again, _) = backend
            .login(&pool, "ada@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
        assert!(again.last_login.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let pool = create_test_pool().await;
        let backend = DatabaseBackend::default();
        backend
            .register(&pool, "Ada", "ada@example.com", "password123")
            .await
            .unwrap();

        let err = backend
            .register(&pool, "Other", "ADA@example.com", "password456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let pool = create_test_pool().await;
        let backend = DatabaseBackend::default();
        backend
            .register(&pool, "Ada", "ada@example.com", "password123")
            .await
            .unwrap();

        let err = backend
            .login(&pool, "ada@example.com", "password124")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(backend
            .login(&pool, "nobody@example.com", "password123")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_logout() {
        let pool = create_test_pool().await;
        let backend = DatabaseBackend::default();
        let (_, session) = backend
            .register(&pool, "Ada", "ada@example.com", "password123")
            .await
            .unwrap();

        backend.logout(&pool, &session.session_key).await.unwrap();
        assert!(backend
            .get_user(&pool, &session.session_key)
            .await
            .unwrap()
            .is_none());
        // Logging out twice is harmless.
        backend.logout(&pool, &session.session_key).await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_ends_sessions() {
        let pool = create_test_pool().await;
        let backend = DatabaseBackend::default();
        let (user, session) = backend
            .register(&pool, "Ada", "ada@example.com", "password123")
            .await
            .unwrap();

        backend
            .change_password(&pool, user.id, "password123", "password456")
            .await
            .unwrap();
        assert!(backend
            .get_user(&pool, &session.session_key)
            .await
            .unwrap()
            .is_none());
        assert!(backend
            .login(&pool, "ada@example.com", "password456")
            .await
            .is_ok());
    }
}
