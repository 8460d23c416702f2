//! Registration, login and the current user.

use std::sync::Arc;

use tally_auth::User;
use tally_forms::{Form, LoginInput, RegisterInput};
use tally_router::{Request, Response};

use super::user_id;
use crate::action::ActionResponse;
use crate::error::Result;
use crate::state::AppState;

pub async fn register(state: Arc<AppState>, req: Request) -> Result<Response> {
    let input = RegisterInput::parse(&req.body)?;
    let (user, session) = state
        .auth
        .register(&state.pool, &input.name, &input.email, &input.password)
        .await?;
    Ok(ActionResponse::ok("Account created.", user)
        .respond(201)
        .with_session(&session.session_key, state.session_max_age()))
}

pub async fn login(state: Arc<AppState>, req: Request) -> Result<Response> {
    let input = LoginInput::parse(&req.body)?;
    let (user, session) = state
        .auth
        .login(&state.pool, &input.email, &input.password)
        .await?;
    Ok(ActionResponse::ok("Logged in.", user)
        .respond(200)
        .with_session(&session.session_key, state.session_max_age()))
}

pub async fn logout(state: Arc<AppState>, req: Request) -> Result<Response> {
    if let Some(key) = req.session_key() {
        state.auth.logout(&state.pool, key).await?;
    }
    Ok(ActionResponse::done("Logged out.").respond(200).clear_session())
}

pub async fn me(state: Arc<AppState>, req: Request) -> Result<Response> {
    let user = User::get(&state.pool, user_id(&req)?).await?;
    Ok(ActionResponse::ok("Signed in.", user).respond(200))
}
