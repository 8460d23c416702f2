use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ValidationErrors;
use crate::form::{Fields, Form};
use crate::validation::{MaxLength, Required};

/// Catalog item form.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit_price: Decimal,
}

impl Form for ItemInput {
    type Cleaned = Self;

    fn clean(self) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new();
        let name = fields.text("name", &self.name, &[&Required::new("Name"), &MaxLength::new("Name", 200)]);
        let description = fields.optional(
            "description",
            self.description.as_deref(),
            &[&MaxLength::new("Description", 1000)],
        );
        fields.non_negative("unit_price", "Unit price", self.unit_price);
        fields.finish(Self {
            name,
            description,
            unit_price: self.unit_price,
        })
    }
}
