//! The user's business profile.

use std::sync::Arc;

use tally_forms::{BusinessInput, Form};
use tally_router::{Request, Response};
use tally_store::Businesses;

use super::user_id;
use crate::action::ActionResponse;
use crate::error::Result;
use crate::state::AppState;

pub async fn get(state: Arc<AppState>, req: Request) -> Result<Response> {
    let business = Businesses::get(&state.pool, user_id(&req)?).await?;
    Ok(ActionResponse::ok("Business loaded.", business).respond(200))
}

/// Creates the profile on first save, replaces it afterwards.
pub async fn save(state: Arc<AppState>, req: Request) -> Result<Response> {
    let user_id = user_id(&req)?;
    let input = BusinessInput::parse(&req.body)?;
    let business = Businesses::save(&state.pool, user_id, &input).await?;
    Ok(ActionResponse::ok("Business saved.", business).respond(200))
}
