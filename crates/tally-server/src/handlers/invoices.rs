//! Invoices, their lifecycle and their documents.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tally_core::InvoiceStatus;
use tally_forms::{Form, InvoiceInput, StatusInput};
use tally_render::{render_html, render_pdf};
use tally_router::{Request, Response};
use tally_store::{InvoiceFilter, Invoices};

use super::{record_id, user_id};
use crate::action::ActionResponse;
use crate::error::{ActionError, Result};
use crate::state::AppState;

/// Reads the `status` and `client` query parameters.
fn filter(req: &Request) -> Result<InvoiceFilter> {
    let present = |key| req.get_query(key).map(str::trim).filter(|v| !v.is_empty());
    let status = present("status")
        .map(str::parse::<InvoiceStatus>)
        .transpose()?;
    let client_id = present("client")
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| ActionError::Validation("Invalid client filter.".to_string()))
        })
        .transpose()?;
    Ok(InvoiceFilter { status, client_id })
}

pub async fn list(state: Arc<AppState>, req: Request) -> Result<Response> {
    let filter = filter(&req)?;
    let invoices = Invoices::list(&state.pool, user_id(&req)?, &filter).await?;
    Ok(ActionResponse::ok("Invoices loaded.", invoices).respond(200))
}

pub async fn get(state: Arc<AppState>, req: Request) -> Result<Response> {
    let invoice = Invoices::get(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::ok("Invoice loaded.", invoice).respond(200))
}

pub async fn create(state: Arc<AppState>, req: Request) -> Result<Response> {
    let user_id = user_id(&req)?;
    let input = InvoiceInput::parse(&req.body)?;
    let invoice = Invoices::create(&state.pool, user_id, &input).await?;
    Ok(ActionResponse::ok("Invoice created.", invoice).respond(201))
}

pub async fn update(state: Arc<AppState>, req: Request) -> Result<Response> {
    let (user_id, id) = (user_id(&req)?, record_id(&req)?);
    let input = InvoiceInput::parse(&req.body)?;
    let invoice = Invoices::update(&state.pool, user_id, id, &input).await?;
    Ok(ActionResponse::ok("Invoice updated.", invoice).respond(200))
}

pub async fn delete(state: Arc<AppState>, req: Request) -> Result<Response> {
    Invoices::delete(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::done("Invoice deleted.").respond(200))
}

pub async fn set_status(state: Arc<AppState>, req: Request) -> Result<Response> {
    let (user_id, id) = (user_id(&req)?, record_id(&req)?);
    let status = StatusInput::parse(&req.body)?;
    let invoice = Invoices::set_status(&state.pool, user_id, id, status).await?;
    let message = format!("Invoice marked as {}.", invoice.status.label().to_lowercase());
    Ok(ActionResponse::ok(message, invoice).respond(200))
}

pub async fn duplicate(state: Arc<AppState>, req: Request) -> Result<Response> {
    let copy = Invoices::duplicate(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    let message = format!("Invoice duplicated as {}.", copy.invoice_number);
    Ok(ActionResponse::ok(message, copy).respond(201))
}

pub async fn next_number(state: Arc<AppState>, req: Request) -> Result<Response> {
    let number = Invoices::next_number(&state.pool, user_id(&req)?).await?;
    Ok(ActionResponse::ok("Next invoice number.", json!({ "invoice_number": number })).respond(200))
}

/// Moves the user's sent invoices that are past due to overdue.
pub async fn mark_overdue(state: Arc<AppState>, req: Request) -> Result<Response> {
    let user_id = user_id(&req)?;
    let today = Utc::now().date_naive();
    let updated = Invoices::mark_overdue(&state.pool, today, Some(user_id)).await?;
    let message = format!("{updated} invoice(s) marked overdue.");
    Ok(ActionResponse::ok(message, json!({ "updated": updated })).respond(200))
}

pub async fn document(state: Arc<AppState>, req: Request) -> Result<Response> {
    let document = Invoices::document(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(ActionResponse::ok("Invoice document.", document).respond(200))
}

pub async fn pdf(state: Arc<AppState>, req: Request) -> Result<Response> {
    let document = Invoices::document(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    let pdf = render_pdf(&document)?;
    Ok(Response::pdf(pdf.bytes, &format!("{}.pdf", document.invoice_number)))
}

pub async fn preview(state: Arc<AppState>, req: Request) -> Result<Response> {
    let document = Invoices::document(&state.pool, user_id(&req)?, record_id(&req)?).await?;
    Ok(Response::html(render_html(&document)))
}
