//! Auto-save target backed by the invoices table.

use sqlx::SqlitePool;
use tally_core::{BoxFuture, CoreError, DraftStore, InvoiceDraft};
use tally_forms::{Form, InvoiceInput};

use crate::error::StoreError;
use crate::invoices::Invoices;

/// Saves drafts of one user through [`Invoices`].
///
/// Each save runs the invoice form validation first; a draft that does not
/// validate is reported as a failed save.
#[derive(Debug, Clone)]
pub struct SqliteDraftStore {
    pool: SqlitePool,
    user_id: i64,
}

impl SqliteDraftStore {
    /// Creates a store writing as `user_id`.
    pub fn new(pool: SqlitePool, user_id: i64) -> Self {
        Self { pool, user_id }
    }
}

fn persistence(e: impl ToString) -> CoreError {
    CoreError::Persistence(e.to_string())
}

impl DraftStore for SqliteDraftStore {
    fn create<'a>(&'a self, draft: &'a InvoiceDraft) -> BoxFuture<'a, tally_core::Result<i64>> {
        Box::pin(async move {
            let input = InvoiceInput::from(draft).clean().map_err(persistence)?;
            let invoice = Invoices::create(&self.pool, self.user_id, &input)
                .await
                .map_err(persistence)?;
            Ok(invoice.id)
        })
    }

    fn update<'a>(&'a self, id: i64, draft: &'a InvoiceDraft) -> BoxFuture<'a, tally_core::Result<()>> {
        Box::pin(async move {
            let input = InvoiceInput::from(draft).clean().map_err(persistence)?;
            match Invoices::update(&self.pool, self.user_id, id, &input).await {
                Ok(_) => Ok(()),
                Err(StoreError::Core(e)) => Err(e),
                Err(e) => Err(persistence(e)),
            }
        })
    }
}
