//! The invoicing identity of a user.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default prefix for generated invoice numbers.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV-";

/// A user's business: the "from" block of every invoice.
///
/// Each user owns at most one business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Business {
    /// Primary key.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Trading name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address, one line per row.
    pub address: String,
    /// VAT/EIN or similar.
    pub tax_id: Option<String>,
    /// Logo as an `http(s)` or `data:image` URL.
    pub logo: Option<String>,
    /// Signature image as an `http(s)` or `data:image` URL.
    pub signature: Option<String>,
    /// Currency preselected for new invoices.
    pub default_currency: String,
    /// Prefix for generated invoice numbers.
    pub invoice_prefix: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Returns the address split into display lines.
    pub fn address_lines(&self) -> Vec<&str> {
        split_lines(&self.address)
    }
}

/// Splits a multi-line text field into trimmed, non-empty lines.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
