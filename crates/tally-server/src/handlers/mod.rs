//! Server actions, one module per area.
//!
//! Every action takes the shared state and the routed request and answers
//! with an [`ActionResponse`](crate::ActionResponse) envelope or an
//! [`ActionError`](crate::ActionError).

pub mod accounts;
pub mod auth;
pub mod business;
pub mod clients;
pub mod dashboard;
pub mod invoices;
pub mod items;

use tally_router::Request;

use crate::error::{ActionError, Result};

/// The signed-in user. The auth middleware guarantees one on private routes.
pub(crate) fn user_id(req: &Request) -> Result<i64> {
    req.user_id
        .ok_or_else(|| ActionError::Unauthorized("Please log in to continue.".to_string()))
}

/// The `{id}` path parameter.
pub(crate) fn record_id(req: &Request) -> Result<i64> {
    Ok(req.params.parse::<i64>("id")?)
}

/// The `q` search parameter, ignoring blanks.
pub(crate) fn search(req: &Request) -> Option<&str> {
    req.get_query("q").map(str::trim).filter(|q| !q.is_empty())
}
