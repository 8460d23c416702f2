//! # tally-auth
//!
//! Accounts and sessions for Tally.
//!
//! Users sign in with their email and a password. Passwords are hashed with
//! Argon2id; a successful login opens a [`Session`] whose random key the
//! client sends back as a cookie or bearer token.
//!
//! ```rust
//! use tally_auth::{hash_password, verify_password};
//!
//! let hash = hash_password("secret123").expect("hashing works");
//! assert!(verify_password("secret123", &hash));
//! assert!(!verify_password("wrong", &hash));
//! ```
//!
//! For the async workflow with database persistence, see
//! [`DatabaseBackend`].

pub mod backends;
mod error;
mod password;
mod session;
mod user;

pub use backends::DatabaseBackend;
pub use error::{AuthError, Result};
pub use password::{hash_password, validate_password, verify_password, MIN_PASSWORD_LENGTH};
pub use session::{create_session_table, Session};
pub use user::{create_user_table, User};

use sqlx::SqlitePool;

/// Creates all authentication tables.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_user_table(pool).await?;
    create_session_table(pool).await?;
    Ok(())
}
