//! Invoice line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::money::round2;

/// One row of an invoice.
///
/// Line items are stored as a JSON array on the invoice row; the line total
/// is always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItem {
    /// What is being billed.
    pub description: String,
    /// Billed quantity (hours, units, ...).
    pub quantity: Decimal,
    /// Price of one unit.
    pub unit_price: Decimal,
    /// Catalog item this row was created from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
}

impl LineItem {
    /// Creates a free-form line item.
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            item_id: None,
        }
    }

    /// Returns `quantity × unit_price` rounded to cents.
    pub fn total(&self) -> Result<Decimal> {
        self.quantity
            .checked_mul(self.unit_price)
            .map(round2)
            .ok_or_else(|| CoreError::Overflow(format!("line total of {:?}", self.description)))
    }
}

/// A line item together with its computed total, for display and API output.
#[derive(Debug, Clone, Serialize)]
pub struct LineItemView<'a> {
    #[serde(flatten)]
    pub item: &'a LineItem,
    pub total: Decimal,
}

impl<'a> TryFrom<&'a LineItem> for LineItemView<'a> {
    type Error = CoreError;

    fn try_from(item: &'a LineItem) -> Result<Self> {
        Ok(Self {
            total: item.total()?,
            item,
        })
    }
}

/// Decodes the JSON column holding an invoice's line items.
pub fn decode_line_items(json: &str) -> serde_json::Result<Vec<LineItem>> {
    serde_json::from_str(json)
}

/// Encodes line items for the JSON column.
pub fn encode_line_items(items: &[LineItem]) -> serde_json::Result<String> {
    serde_json::to_string(items)
}
