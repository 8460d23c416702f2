//! Request/response middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{info, warn};

use crate::request::Request;
use crate::response::Response;

/// A boxed future for async middleware operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of middleware processing.
pub enum MiddlewareResult {
    /// Continue to the next middleware/handler.
    Continue,
    /// Stop processing and return this response.
    Response(Response),
}

/// Hooks run around every request.
///
/// `before` may modify the request or answer it directly; `after` sees the
/// request as it reached the handler along with the response.
pub trait Middleware: Send + Sync {
    fn before<'a>(&'a self, req: &'a mut Request) -> BoxFuture<'a, MiddlewareResult>;

    fn after<'a>(&'a self, _req: &'a Request, res: Response) -> BoxFuture<'a, Response> {
        Box::pin(async move { res })
    }
}

/// Logs one line per request with its status and latency.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn before<'a>(&'a self, _req: &'a mut Request) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move { MiddlewareResult::Continue })
    }

    fn after<'a>(&'a self, req: &'a Request, res: Response) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let elapsed = req.received_at.elapsed();
            if res.status >= 500 {
                warn!(method = %req.method, path = %req.path, status = res.status, ?elapsed, "request failed");
            } else {
                info!(method = %req.method, path = %req.path, status = res.status, ?elapsed, "request");
            }
            res
        })
    }
}

/// Looks up the user owning a session key.
pub trait SessionResolver: Send + Sync {
    fn resolve<'a>(&'a self, session_key: &'a str) -> BoxFuture<'a, Option<i64>>;
}

/// Resolves the session of every request and rejects anonymous requests
/// outside the public paths with 401.
pub struct AuthMiddleware {
    resolver: Arc<dyn SessionResolver>,
    public: Vec<String>,
}

impl AuthMiddleware {
    pub fn new(resolver: Arc<dyn SessionResolver>) -> Self {
        Self {
            resolver,
            public: Vec::new(),
        }
    }

    /// Adds paths reachable without a session.
    #[must_use]
    pub fn public(mut self, paths: &[&str]) -> Self {
        self.public.extend(paths.iter().map(|s| (*s).to_string()));
        self
    }

    fn is_public(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.public.iter().any(|p| p == path)
    }
}

impl Middleware for AuthMiddleware {
    fn before<'a>(&'a self, req: &'a mut Request) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            if let Some(key) = req.session_key().map(str::to_string) {
                req.user_id = self.resolver.resolve(&key).await;
            }
            if req.user_id.is_none() && !self.is_public(&req.path) {
                return MiddlewareResult::Response(Response::unauthorized());
            }
            MiddlewareResult::Continue
        })
    }
}
