//! State shared by every request.

use std::sync::Arc;

use sqlx::SqlitePool;
use tally_auth::DatabaseBackend;
use tally_router::{BoxFuture, SessionResolver};
use tracing::warn;

/// Connection pool and authentication backend.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: DatabaseBackend,
    pub session_days: i64,
}

impl AppState {
    pub fn new(pool: SqlitePool, session_days: i64) -> Arc<Self> {
        Arc::new(Self {
            pool,
            auth: DatabaseBackend::new(session_days),
            session_days,
        })
    }

    /// Lifetime of the session cookie.
    pub fn session_max_age(&self) -> i64 {
        self.session_days * 24 * 60 * 60
    }
}

/// Resolves session keys against the sessions table.
pub struct Sessions(pub Arc<AppState>);

impl SessionResolver for Sessions {
    fn resolve<'a>(&'a self, session_key: &'a str) -> BoxFuture<'a, Option<i64>> {
        Box::pin(async move {
            match self.0.auth.get_user(&self.0.pool, session_key).await {
                Ok(user) => user.map(|u| u.id),
                Err(e) => {
                    warn!(error = %e, "session lookup failed");
                    None
                }
            }
        })
    }
}
