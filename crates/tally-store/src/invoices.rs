//! Invoices, their status lifecycle and document aggregation.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tally_core::{
    decode_line_items, encode_line_items, next_invoice_number, Adjustment, Invoice,
    InvoiceDocument, InvoiceStatus, DEFAULT_INVOICE_PREFIX,
};
use tally_forms::{validate_line_items, CleanedInvoice};
use tracing::{debug, info, warn};

use crate::accounts::PaymentAccounts;
use crate::business::Businesses;
use crate::clients::Clients;
use crate::columns;
use crate::error::{Result, StoreError};

#[derive(FromRow)]
struct InvoiceRow {
    id: i64,
    user_id: i64,
    business_id: i64,
    client_id: i64,
    invoice_number: String,
    status: String,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    currency: String,
    line_items: String,
    discount_kind: String,
    discount_value: String,
    tax_kind: String,
    tax_value: String,
    tax_base: String,
    subtotal: String,
    discount_amount: String,
    tax_amount: String,
    total: String,
    notes: Option<String>,
    terms: Option<String>,
    payment_account_id: Option<i64>,
    template: String,
    sent_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const ENTITY: &str = "invoice";

impl TryFrom<InvoiceRow> for Invoice {
    type Error = StoreError;

    fn try_from(row: InvoiceRow) -> Result<Self> {
        let id = row.id;
        let amount = |column: &str, value: &str| columns::amount(ENTITY, id, column, value);

        let line_items = decode_line_items(&row.line_items)
            .map_err(|e| StoreError::corrupt(ENTITY, id, format!("line_items: {e}")))?;
        let errors = validate_line_items(&line_items);
        if !errors.is_empty() {
            warn!(invoice_id = id, "stored line items fail validation: {}", errors);
            return Err(StoreError::corrupt(ENTITY, id, errors));
        }

        let invoice = Self {
            id,
            user_id: row.user_id,
            business_id: row.business_id,
            client_id: row.client_id,
            invoice_number: row.invoice_number,
            status: columns::tag(ENTITY, id, &row.status)?,
            issue_date: row.issue_date,
            due_date: row.due_date,
            currency: row.currency,
            line_items,
            discount: Adjustment {
                kind: columns::tag(ENTITY, id, &row.discount_kind)?,
                value: amount("discount_value", &row.discount_value)?,
            },
            tax: Adjustment {
                kind: columns::tag(ENTITY, id, &row.tax_kind)?,
                value: amount("tax_value", &row.tax_value)?,
            },
            tax_base: columns::tag(ENTITY, id, &row.tax_base)?,
            subtotal: amount("subtotal", &row.subtotal)?,
            discount_amount: amount("discount_amount", &row.discount_amount)?,
            tax_amount: amount("tax_amount", &row.tax_amount)?,
            total: amount("total", &row.total)?,
            notes: row.notes,
            terms: row.terms,
            payment_account_id: row.payment_account_id,
            template: columns::tag(ENTITY, id, &row.template)?,
            sent_at: row.sent_at,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        let computed = invoice
            .computed_totals()
            .map_err(|e| StoreError::corrupt(ENTITY, id, e))?;
        if computed != invoice.totals() {
            warn!(invoice_id = id, "stored totals differ from line items");
        }
        Ok(invoice)
    }
}

/// Filters for [`Invoices::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    #[serde(rename = "client")]
    pub client_id: Option<i64>,
}

/// One row of the invoice list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_number: String,
    pub client_id: i64,
    pub client_name: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
    pub total: Decimal,
}

#[derive(FromRow)]
struct SummaryRow {
    id: i64,
    invoice_number: String,
    client_id: i64,
    client_name: String,
    status: String,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    currency: String,
    total: String,
}

impl TryFrom<SummaryRow> for InvoiceSummary {
    type Error = StoreError;

    fn try_from(row: SummaryRow) -> Result<Self> {
        Ok(Self {
            status: columns::tag(ENTITY, row.id, &row.status)?,
            total: columns::amount(ENTITY, row.id, "total", &row.total)?,
            id: row.id,
            invoice_number: row.invoice_number,
            client_id: row.client_id,
            client_name: row.client_name,
            issue_date: row.issue_date,
            due_date: row.due_date,
            currency: row.currency,
        })
    }
}

fn duplicate_number(number: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("Invoice number {number} is already in use."))
        }
        other => StoreError::Database(other),
    }
}

fn locked(invoice: &Invoice) -> StoreError {
    StoreError::Conflict(format!(
        "Invoice {} is paid and can no longer be changed.",
        invoice.invoice_number
    ))
}

/// Access to the `invoices` table, scoped to one owner.
pub struct Invoices;

impl Invoices {
    /// Lists invoices, newest issue date first.
    pub async fn list(pool: &SqlitePool, user_id: i64, filter: &InvoiceFilter) -> Result<Vec<InvoiceSummary>> {
        Self::summaries(pool, user_id, filter, None).await
    }

    /// Returns the `limit` most recently created invoices.
    pub async fn recent(pool: &SqlitePool, user_id: i64, limit: i64) -> Result<Vec<InvoiceSummary>> {
        Self::summaries(pool, user_id, &InvoiceFilter::default(), Some(limit)).await
    }

    async fn summaries(
        pool: &SqlitePool,
        user_id: i64,
        filter: &InvoiceFilter,
        limit: Option<i64>,
    ) -> Result<Vec<InvoiceSummary>> {
        let order = if limit.is_some() {
            "i.created_at DESC, i.id DESC"
        } else {
            "i.issue_date DESC, i.id DESC"
        };
        let sql = format!(
            r"
            SELECT i.id, i.invoice_number, i.client_id, c.business_name AS client_name,
                   i.status, i.issue_date, i.due_date, i.currency, i.total
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            WHERE i.user_id = ?1
              AND (?2 IS NULL OR i.status = ?2)
              AND (?3 IS NULL OR i.client_id = ?3)
            ORDER BY {order}
            LIMIT ?4
            "
        );

        sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(user_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.client_id)
            .bind(limit.unwrap_or(-1))
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(InvoiceSummary::try_from)
            .collect()
    }

    /// Finds an invoice owned by `user_id`.
    pub async fn get(pool: &SqlitePool, user_id: i64, id: i64) -> Result<Invoice> {
        sqlx::query_as::<_, InvoiceRow>("SELECT * FROM invoices WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("invoice"))?
            .try_into()
    }

    /// Creates a draft invoice for the user's business.
    pub async fn create(pool: &SqlitePool, user_id: i64, input: &CleanedInvoice) -> Result<Invoice> {
        let business = Businesses::find(pool, user_id).await?.ok_or_else(|| {
            StoreError::Invalid("Set up your business before creating invoices.".to_string())
        })?;
        check_references(pool, user_id, input).await?;

        let now = Utc::now();
        let line_items = encode_line_items(&input.line_items).map_err(tally_core::CoreError::from)?;
        let result = sqlx::query(
            r"
            INSERT INTO invoices (user_id, business_id, client_id, invoice_number, status,
                issue_date, due_date, currency, line_items, discount_kind, discount_value,
                tax_kind, tax_value, tax_base, subtotal, discount_amount, tax_amount, total,
                notes, terms, payment_account_id, template, created_at, updated_at)
            VALUES (?, ?, ?, ?, 'draft', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(user_id)
        .bind(business.id)
        .bind(input.client_id)
        .bind(&input.invoice_number)
        .bind(input.issue_date)
        .bind(input.due_date)
        .bind(&input.currency)
        .bind(line_items)
        .bind(input.discount.kind.as_str())
        .bind(input.discount.value.to_string())
        .bind(input.tax.kind.as_str())
        .bind(input.tax.value.to_string())
        .bind(input.tax_base.as_str())
        .bind(input.totals.subtotal.to_string())
        .bind(input.totals.discount.to_string())
        .bind(input.totals.tax.to_string())
        .bind(input.totals.total.to_string())
        .bind(&input.notes)
        .bind(&input.terms)
        .bind(input.payment_account_id)
        .bind(input.template.as_str())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(duplicate_number(&input.invoice_number))?;

        let id = result.last_insert_rowid();
        info!(user_id, invoice_id = id, number = %input.invoice_number, "invoice created");
        Self::get(pool, user_id, id).await
    }

    /// Replaces an unpaid invoice's content. The status is left alone.
    pub async fn update(
        pool: &SqlitePool,
        user_id: i64,
        id: i64,
        input: &CleanedInvoice,
    ) -> Result<Invoice> {
        let existing = Self::get(pool, user_id, id).await?;
        if existing.ensure_editable().is_err() {
            return Err(locked(&existing));
        }
        check_references(pool, user_id, input).await?;

        let line_items = encode_line_items(&input.line_items).map_err(tally_core::CoreError::from)?;
        let result = sqlx::query(
            r"
            UPDATE invoices
            SET client_id = ?, invoice_number = ?, issue_date = ?, due_date = ?, currency = ?,
                line_items = ?, discount_kind = ?, discount_value = ?, tax_kind = ?,
                tax_value = ?, tax_base = ?, subtotal = ?, discount_amount = ?, tax_amount = ?,
                total = ?, notes = ?, terms = ?, payment_account_id = ?, template = ?,
                updated_at = ?
            WHERE id = ? AND user_id = ? AND status != 'paid'
            ",
        )
        .bind(input.client_id)
        .bind(&input.invoice_number)
        .bind(input.issue_date)
        .bind(input.due_date)
        .bind(&input.currency)
        .bind(line_items)
        .bind(input.discount.kind.as_str())
        .bind(input.discount.value.to_string())
        .bind(input.tax.kind.as_str())
        .bind(input.tax.value.to_string())
        .bind(input.tax_base.as_str())
        .bind(input.totals.subtotal.to_string())
        .bind(input.totals.discount.to_string())
        .bind(input.totals.tax.to_string())
        .bind(input.totals.total.to_string())
        .bind(&input.notes)
        .bind(&input.terms)
        .bind(input.payment_account_id)
        .bind(input.template.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(duplicate_number(&input.invoice_number))?;
        if result.rows_affected() == 0 {
            return Err(locked(&existing));
        }

        debug!(user_id, invoice_id = id, "invoice updated");
        Self::get(pool, user_id, id).await
    }

    /// Deletes an unpaid invoice.
    pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> Result<()> {
        let invoice = Self::get(pool, user_id, id).await?;
        if invoice.status.is_locked() {
            return Err(locked(&invoice));
        }

        let result =
            sqlx::query("DELETE FROM invoices WHERE id = ? AND user_id = ? AND status != 'paid'")
                .bind(id)
                .bind(user_id)
                .execute(pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(locked(&invoice));
        }
        info!(user_id, invoice_id = id, "invoice deleted");
        Ok(())
    }

    /// Moves an invoice to `status`.
    ///
    /// The first move to `sent` stamps `sent_at` and needs at least one line
    /// item; a move to `paid` stamps `paid_at`.
    pub async fn set_status(
        pool: &SqlitePool,
        user_id: i64,
        id: i64,
        status: InvoiceStatus,
    ) -> Result<Invoice> {
        let invoice = Self::get(pool, user_id, id).await?;
        if invoice.status.is_locked() {
            return Err(locked(&invoice));
        }
        if !invoice.status.can_transition_to(status) {
            return Err(StoreError::Invalid(format!(
                "A {} invoice cannot be marked {}.",
                invoice.status.label().to_lowercase(),
                status.label().to_lowercase()
            )));
        }
        if status == InvoiceStatus::Sent && invoice.line_items.is_empty() {
            return Err(StoreError::Invalid(
                "Add at least one line item before sending the invoice.".to_string(),
            ));
        }

        let now = Utc::now();
        let sent_at = match status {
            InvoiceStatus::Sent => invoice.sent_at.or(Some(now)),
            _ => invoice.sent_at,
        };
        let paid_at = match status {
            InvoiceStatus::Paid => Some(now),
            _ => invoice.paid_at,
        };

        let result = sqlx::query(
            r"
            UPDATE invoices SET status = ?, sent_at = ?, paid_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND status != 'paid'
            ",
        )
        .bind(status.as_str())
        .bind(sent_at)
        .bind(paid_at)
        .bind(now)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(locked(&invoice));
        }

        info!(user_id, invoice_id = id, from = %invoice.status, to = %status, "invoice status changed");
        Self::get(pool, user_id, id).await
    }

    /// Copies an invoice into a new draft with the next number, issued today
    /// and due after the same number of days as the original.
    pub async fn duplicate(pool: &SqlitePool, user_id: i64, id: i64) -> Result<Invoice> {
        let source = Self::get(pool, user_id, id).await?;
        let issue_date = Utc::now().date_naive();
        let term = u64::try_from(source.payment_term_days()).unwrap_or_default();
        let due_date = issue_date.checked_add_days(Days::new(term)).unwrap_or(issue_date);

        let input = CleanedInvoice {
            client_id: source.client_id,
            invoice_number: Self::next_number(pool, user_id).await?,
            issue_date,
            due_date,
            currency: source.currency.clone(),
            totals: source.computed_totals()?,
            line_items: source.line_items,
            discount: source.discount,
            tax: source.tax,
            tax_base: source.tax_base,
            notes: source.notes,
            terms: source.terms,
            payment_account_id: source.payment_account_id,
            template: source.template,
        };
        let copy = Self::create(pool, user_id, &input).await?;
        info!(user_id, source_id = id, invoice_id = copy.id, "invoice duplicated");
        Ok(copy)
    }

    /// Suggests the next invoice number for the user's business.
    pub async fn next_number(pool: &SqlitePool, user_id: i64) -> Result<String> {
        let Some(business) = Businesses::find(pool, user_id).await? else {
            return Ok(next_invoice_number(DEFAULT_INVOICE_PREFIX, std::iter::empty()));
        };
        let numbers: Vec<String> =
            sqlx::query_scalar("SELECT invoice_number FROM invoices WHERE business_id = ?")
                .bind(business.id)
                .fetch_all(pool)
                .await?;
        Ok(next_invoice_number(
            &business.invoice_prefix,
            numbers.iter().map(String::as_str),
        ))
    }

    /// Marks sent invoices due before `today` as overdue, for one user or for
    /// everyone. Returns the number of invoices changed.
    pub async fn mark_overdue(pool: &SqlitePool, today: NaiveDate, user_id: Option<i64>) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE invoices SET status = 'overdue', updated_at = ?1
            WHERE status = 'sent' AND due_date < ?2 AND (?3 IS NULL OR user_id = ?3)
            ",
        )
        .bind(Utc::now())
        .bind(today)
        .bind(user_id)
        .execute(pool)
        .await?;

        let changed = result.rows_affected();
        if changed > 0 {
            info!(changed, %today, "invoices marked overdue");
        }
        Ok(changed)
    }

    /// Gathers everything printed on an invoice.
    pub async fn document(pool: &SqlitePool, user_id: i64, id: i64) -> Result<InvoiceDocument> {
        let invoice = Self::get(pool, user_id, id).await?;
        let business = Businesses::get(pool, user_id).await?;
        let client = Clients::get(pool, user_id, invoice.client_id).await?;
        let account = match invoice.payment_account_id {
            Some(account_id) => Some(PaymentAccounts::get(pool, user_id, account_id).await?),
            None => None,
        };

        Ok(InvoiceDocument::assemble(
            &invoice,
            &business,
            &client,
            account.as_ref(),
        )?)
    }
}

/// Checks that the client and payment account exist and belong to the user.
async fn check_references(pool: &SqlitePool, user_id: i64, input: &CleanedInvoice) -> Result<()> {
    Clients::get(pool, user_id, input.client_id).await?;
    if let Some(account_id) = input.payment_account_id {
        PaymentAccounts::get(pool, user_id, account_id).await?;
    }
    Ok(())
}
