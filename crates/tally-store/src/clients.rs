//! Client records.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Row, SqlitePool};
use tally_core::Client;
use tally_forms::ClientInput;
use tracing::info;

use crate::error::{Result, StoreError};

#[derive(FromRow)]
struct ClientRow {
    id: i64,
    user_id: i64,
    business_name: String,
    contact_name: String,
    email: String,
    phone: Option<String>,
    address: String,
    tax_id: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            business_name: row.business_name,
            contact_name: row.contact_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            tax_id: row.tax_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Access to the `clients` table, scoped to one owner.
pub struct Clients;

impl Clients {
    /// Lists clients by name, optionally filtered by a search term matching
    /// business name, contact name or email.
    pub async fn list(pool: &SqlitePool, user_id: i64, search: Option<&str>) -> Result<Vec<Client>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let rows = sqlx::query_as::<_, ClientRow>(
            r"
            SELECT * FROM clients
            WHERE user_id = ?1
              AND (?2 IS NULL
                   OR instr(lower(business_name), lower(?2)) > 0
                   OR instr(lower(contact_name), lower(?2)) > 0
                   OR instr(lower(email), lower(?2)) > 0)
            ORDER BY business_name COLLATE NOCASE, id
            ",
        )
        .bind(user_id)
        .bind(search)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Finds a client owned by `user_id`.
    pub async fn get(pool: &SqlitePool, user_id: i64, id: i64) -> Result<Client> {
        sqlx::query_as::<_, ClientRow>("SELECT * FROM clients WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .map(Client::from)
            .ok_or(StoreError::NotFound("client"))
    }

    /// Inserts a client.
    pub async fn create(pool: &SqlitePool, user_id: i64, input: &ClientInput) -> Result<Client> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO clients (user_id, business_name, contact_name, email, phone, address,
                tax_id, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(user_id)
        .bind(&input.business_name)
        .bind(&input.contact_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.tax_id)
        .bind(&input.notes)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(user_id, client_id = id, "client created");
        Self::get(pool, user_id, id).await
    }

    /// Updates a client in place.
    pub async fn update(pool: &SqlitePool, user_id: i64, id: i64, input: &ClientInput) -> Result<Client> {
        let result = sqlx::query(
            r"
            UPDATE clients
            SET business_name = ?, contact_name = ?, email = ?, phone = ?, address = ?,
                tax_id = ?, notes = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            ",
        )
        .bind(&input.business_name)
        .bind(&input.contact_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.tax_id)
        .bind(&input.notes)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("client"));
        }
        Self::get(pool, user_id, id).await
    }

    /// Deletes a client that no invoice refers to.
    pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> Result<()> {
        let client = Self::get(pool, user_id, id).await?;
        let invoices: i64 = sqlx::query("SELECT COUNT(*) FROM invoices WHERE client_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?
            .get(0);
        if invoices > 0 {
            return Err(StoreError::Conflict(format!(
                "{} has {} invoice(s) and cannot be deleted.",
                client.business_name, invoices
            )));
        }

        sqlx::query("DELETE FROM clients WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        info!(user_id, client_id = id, "client deleted");
        Ok(())
    }

    /// Returns the number of clients owned by `user_id`.
    pub async fn count(pool: &SqlitePool, user_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM clients WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.get(0))
    }
}
