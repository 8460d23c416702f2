//! Dashboard summary.

use std::sync::Arc;

use tally_router::{Request, Response};
use tally_store::Dashboard;

use super::user_id;
use crate::action::ActionResponse;
use crate::error::Result;
use crate::state::AppState;

pub async fn summary(state: Arc<AppState>, req: Request) -> Result<Response> {
    let dashboard = Dashboard::load(&state.pool, user_id(&req)?).await?;
    Ok(ActionResponse::ok("Dashboard loaded.", dashboard).respond(200))
}
