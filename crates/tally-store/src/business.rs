//! The per-user business profile.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tally_core::{Business, DEFAULT_INVOICE_PREFIX};
use tally_forms::BusinessInput;
use tracing::info;

use crate::error::{Result, StoreError};

#[derive(FromRow)]
struct BusinessRow {
    id: i64,
    user_id: i64,
    name: String,
    email: String,
    phone: Option<String>,
    address: String,
    tax_id: Option<String>,
    logo: Option<String>,
    signature: Option<String>,
    default_currency: String,
    invoice_prefix: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BusinessRow> for Business {
    fn from(row: BusinessRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            tax_id: row.tax_id,
            logo: row.logo,
            signature: row.signature,
            default_currency: row.default_currency,
            invoice_prefix: row.invoice_prefix,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Access to the `businesses` table.
pub struct Businesses;

impl Businesses {
    /// Returns the user's business, if set up.
    pub async fn find(pool: &SqlitePool, user_id: i64) -> Result<Option<Business>> {
        let row = sqlx::query_as::<_, BusinessRow>("SELECT * FROM businesses WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Business::from))
    }

    /// Returns the user's business or a not-found error.
    pub async fn get(pool: &SqlitePool, user_id: i64) -> Result<Business> {
        Self::find(pool, user_id)
            .await?
            .ok_or(StoreError::NotFound("business"))
    }

    /// Creates or updates the user's business.
    pub async fn save(pool: &SqlitePool, user_id: i64, input: &BusinessInput) -> Result<Business> {
        let now = Utc::now();
        let prefix = input
            .invoice_prefix
            .as_deref()
            .unwrap_or(DEFAULT_INVOICE_PREFIX);

        sqlx::query(
            r"
            INSERT INTO businesses (user_id, name, email, phone, address, tax_id, logo,
                signature, default_currency, invoice_prefix, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                phone = excluded.phone,
                address = excluded.address,
                tax_id = excluded.tax_id,
                logo = excluded.logo,
                signature = excluded.signature,
                default_currency = excluded.default_currency,
                invoice_prefix = excluded.invoice_prefix,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.tax_id)
        .bind(&input.logo)
        .bind(&input.signature)
        .bind(&input.default_currency)
        .bind(prefix)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        info!(user_id, "business profile saved");
        Self::get(pool, user_id).await
    }
}
