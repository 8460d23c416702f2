//! Payment accounts.

use std::sync::Arc;

use tally_forms::{Form, PaymentAccountInput};
use tally_router::{Request, Response};
use tally_store::PaymentAccounts;

use super::{record_id, user_id};
use crate::action::ActionResponse;
use crate::error::Result;
use crate::state::AppState;

pub async fn list(state: Arc<AppState>, req: Request) -> Result<Response> {
    let accounts = PaymentAccounts::list(&state.pool, user_id(&req)?).await?;
    Ok(ActionResponse::ok("Payment accounts loaded.", accounts).respond(200))
}

pub async fn get(state: Arc<AppState>, req: Request) -> Result<Response> {
    let account = PaymentAccounts::get(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::ok("Payment account loaded.", account).respond(200))
}

pub async fn create(state: Arc<AppState>, req: Request) -> Result<Response> {
    let user_id = user_id(&req)?;
    let input = PaymentAccountInput::parse(&req.body)?;
    let account = PaymentAccounts::create(&state.pool, user_id, &input).await?;
    Ok(ActionResponse::ok("Payment account created.", account).respond(201))
}

pub async fn update(state: Arc<AppState>, req: Request) -> Result<Response> {
    let (user_id, id) = (user_id(&req)?, record_id(&req)?);
    let input = PaymentAccountInput::parse(&req.body)?;
    let account = PaymentAccounts::update(&state.pool, user_id, id, &input).await?;
    Ok(ActionResponse::ok("Payment account updated.", account).respond(200))
}

pub async fn set_default(state: Arc<AppState>, req: Request) -> Result<Response> {
    let account = PaymentAccounts::set_default(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    let message = format!("{} is now your default payment account.", account.label);
    Ok(ActionResponse::ok(message, account).respond(200))
}

pub async fn delete(state: Arc<AppState>, req: Request) -> Result<Response> {
    PaymentAccounts::delete(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::done("Payment account deleted.").respond(200))
}
