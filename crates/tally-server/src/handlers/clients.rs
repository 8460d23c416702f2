//! Client directory.

use std::sync::Arc;

use tally_forms::{ClientInput, Form};
use tally_router::{Request, Response};
use tally_store::Clients;

use super::{record_id, search, user_id};
use crate::action::ActionResponse;
use crate::error::Result;
use crate::state::AppState;

pub async fn list(state: Arc<AppState>, req: Request) -> Result<Response> {
    let clients = Clients::list(&state.pool, user_id(&req)?, search(&req)).await?;
    Ok(ActionResponse::ok("Clients loaded.", clients).respond(200))
}

pub async fn get(state: Arc<AppState>, req: Request) -> Result<Response> {
    let client = Clients::get(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::ok("Client loaded.", client).respond(200))
}

pub async fn create(state: Arc<AppState>, req: Request) -> Result<Response> {
    let user_id = user_id(&req)?;
    let input = ClientInput::parse(&req.body)?;
    let client = Clients::create(&state.pool, user_id, &input).await?;
    Ok(ActionResponse::ok("Client created.", client).respond(201))
}

pub async fn update(state: Arc<AppState>, req: Request) -> Result<Response> {
    let (user_id, id) = (user_id(&req)?, record_id(&req)?);
    let input = ClientInput::parse(&req.body)?;
    let client = Clients::update(&state.pool, user_id, id, &input).await?;
    Ok(ActionResponse::ok("Client updated.", client).respond(200))
}

pub async fn delete(state: Arc<AppState>, req: Request) -> Result<Response> {
    Clients::delete(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::done("Client deleted.").respond(200))
}
