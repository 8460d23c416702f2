//! Catalog items.

use std::sync::Arc;

use tally_forms::{Form, ItemInput};
use tally_router::{Request, Response};
use tally_store::Items;

use super::{record_id, search, user_id};
use crate::action::ActionResponse;
use crate::error::Result;
use crate::state::AppState;

pub async fn list(state: Arc<AppState>, req: Request) -> Result<Response> {
    let items = Items::list(&state.pool, user_id(&req)?, search(&req)).await?;
    Ok(ActionResponse::ok("Items loaded.", items).respond(200))
}

pub async fn get(state: Arc<AppState>, req: Request) -> Result<Response> {
    let item = Items::get(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::ok("Item loaded.", item).respond(200))
}

pub async fn create(state: Arc<AppState>, req: Request) -> Result<Response> {
    let user_id = user_id(&req)?;
    let input = ItemInput::parse(&req.body)?;
    let item = Items::create(&state.pool, user_id, &input).await?;
    Ok(ActionResponse::ok("Item created.", item).respond(201))
}

pub async fn update(state: Arc<AppState>, req: Request) -> Result<Response> {
    let (user_id, id) = (user_id(&req)?, record_id(&req)?);
    let input = ItemInput::parse(&req.body)?;
    let item = Items::update(&state.pool, user_id, id, &input).await?;
    Ok(ActionResponse::ok("Item updated.", item).respond(200))
}

pub async fn delete(state: Arc<AppState>, req: Request) -> Result<Response> {
    Items::delete(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::done("Item deleted.").respond(200))
}
