//! Reusable catalog items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::line_item::LineItem;

/// A product or service that can be dropped onto an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Primary key.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Short name.
    pub name: String,
    /// Longer description used as the line item text when present.
    pub description: Option<String>,
    /// Default price of one unit.
    pub unit_price: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Builds a line item billing `quantity` units of this item.
    pub fn to_line_item(&self, quantity: Decimal) -> LineItem {
        let description = match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => format!("{} - {}", self.name, text),
            _ => self.name.clone(),
        };
        LineItem {
            description,
            quantity,
            unit_price: self.unit_price,
            item_id: Some(self.id),
        }
    }
}
