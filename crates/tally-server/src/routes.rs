//! The API route table.

use std::future::Future;
use std::sync::Arc;

use tally_router::{AuthMiddleware, BoxFuture, LoggingMiddleware, Request, Response, RouteGroup, Router};

use crate::error::Result;
use crate::handlers::{accounts, auth, business, clients, dashboard, invoices, items};
use crate::state::{AppState, Sessions};

/// Paths reachable without a session.
pub const PUBLIC_PATHS: &[&str] = &["/api/auth/register", "/api/auth/login", "/api/auth/logout"];

/// Binds an action to the shared state, turning its error into a response.
fn action<F, Fut>(state: &Arc<AppState>, f: F) -> impl Fn(Request) -> BoxFuture<'static, Response> + Send + Sync + 'static
where
    F: Fn(Arc<AppState>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    let state = Arc::clone(state);
    move |req| {
        let fut = f(Arc::clone(&state), req);
        Box::pin(async move { fut.await.unwrap_or_else(Response::from) })
    }
}

/// Builds the router with logging and session middleware.
///
/// Literal paths are registered before `{id}` paths that would also match
/// them.
pub fn build_router(state: &Arc<AppState>) -> tally_router::Result<Router> {
    let s = state;

    let auth = RouteGroup::new("/api/auth")
        .post("/register", action(s, auth::register))?
        .post("/login", action(s, auth::login))?
        .post("/logout", action(s, auth::logout))?
        .get("/me", action(s, auth::me))?;

    let business = RouteGroup::new("/api/business")
        .get("", action(s, business::get))?
        .put("", action(s, business::save))?;

    let clients = RouteGroup::new("/api/clients")
        .get("", action(s, clients::list))?
        .post("", action(s, clients::create))?
        .get("/{id}", action(s, clients::get))?
        .put("/{id}", action(s, clients::update))?
        .delete("/{id}", action(s, clients::delete))?;

    let items = RouteGroup::new("/api/items")
        .get("", action(s, items::list))?
        .post("", action(s, items::create))?
        .get("/{id}", action(s, items::get))?
        .put("/{id}", action(s, items::update))?
        .delete("/{id}", action(s, items::delete))?;

    let accounts = RouteGroup::new("/api/accounts")
        .get("", action(s, accounts::list))?
        .post("", action(s, accounts::create))?
        .get("/{id}", action(s, accounts::get))?
        .put("/{id}", action(s, accounts::update))?
        .delete("/{id}", action(s, accounts::delete))?
        .post("/{id}/default", action(s, accounts::set_default))?;

    let invoices = RouteGroup::new("/api/invoices")
        .get("", action(s, invoices::list))?
        .post("", action(s, invoices::create))?
        .get("/next-number", action(s, invoices::next_number))?
        .post("/mark-overdue", action(s, invoices::mark_overdue))?
        .get("/{id}", action(s, invoices::get))?
        .put("/{id}", action(s, invoices::update))?
        .delete("/{id}", action(s, invoices::delete))?
        .post("/{id}/status", action(s, invoices::set_status))?
        .post("/{id}/duplicate", action(s, invoices::duplicate))?
        .get("/{id}/document", action(s, invoices::document))?
        .get("/{id}/pdf", action(s, invoices::pdf))?
        .get("/{id}/preview", action(s, invoices::preview))?;

    let dashboard = RouteGroup::new("/api/dashboard").get("", action(s, dashboard::summary))?;

    Ok(Router::new()
        .middleware(LoggingMiddleware)
        .middleware(AuthMiddleware::new(Arc::new(Sessions(Arc::clone(state)))).public(PUBLIC_PATHS))
        .group(auth)
        .group(business)
        .group(clients)
        .group(items)
        .group(accounts)
        .group(invoices)
        .group(dashboard))
}
