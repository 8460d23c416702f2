//! Client records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::business::split_lines;

/// A customer that invoices are addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    /// Primary key.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Company name.
    pub business_name: String,
    /// Person to address.
    pub contact_name: String,
    /// Billing email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address, one line per row.
    pub address: String,
    /// VAT/EIN or similar.
    pub tax_id: Option<String>,
    /// Private notes, never printed.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Returns the address split into display lines.
    pub fn address_lines(&self) -> Vec<&str> {
        split_lines(&self.address)
    }
}
