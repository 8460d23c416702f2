//! # tally-router
//!
//! Routing for the Tally JSON API.
//!
//! This crate provides:
//! - [`Request`]/[`Response`] types independent of the HTTP server
//! - Path patterns with `{name}` parameters
//! - Method-based dispatch with route groups
//! - Middleware for request logging and session authentication
//!
//! ```ignore
//! use tally_router::{AuthMiddleware, LoggingMiddleware, RouteGroup, Router};
//!
//! let api = RouteGroup::new("/api")
//!     .get("/clients", list_clients)?
//!     .get("/clients/{id}", get_client)?;
//!
//! let router = Router::new()
//!     .middleware(LoggingMiddleware)
//!     .middleware(AuthMiddleware::new(sessions).public(&["/api/auth/login"]))
//!     .group(api);
//!
//! let response = router.handle(Request::get("/api/clients/1")).await;
//! ```

mod error;
mod middleware;
mod path;
mod request;
mod response;
mod router;

pub use error::{Result, RouterError};
pub use middleware::{
    AuthMiddleware, BoxFuture, LoggingMiddleware, Middleware, MiddlewareResult, SessionResolver,
};
pub use path::PathPattern;
pub use request::{Method, PathParams, Request, SESSION_COOKIE};
pub use response::Response;
pub use router::{Handler, Route, RouteGroup, Router};
