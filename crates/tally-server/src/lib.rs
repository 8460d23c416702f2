//! # tally-server
//!
//! The Tally JSON API: server actions over [`tally_store`], routed by
//! [`tally_router`] and served with hyper.
//!
//! Every action answers with an [`ActionResponse`] envelope:
//!
//! ```json
//! { "success": true, "message": "Client created.", "data": { "id": 1 } }
//! ```
//!
//! Failures use the same shape without `data` and an HTTP status from the
//! [`ActionError`] variant: 400 validation, 401 unauthenticated, 404 not
//! found (including records owned by someone else), 409 conflicts, 500
//! unexpected.

mod action;
mod error;
pub mod handlers;
mod http;
mod routes;
mod state;

pub use action::ActionResponse;
pub use error::{ActionError, Result, INTERNAL_MESSAGE};
pub use http::serve;
pub use routes::{build_router, PUBLIC_PATHS};
pub use state::{AppState, Sessions};
