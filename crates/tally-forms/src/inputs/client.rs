use serde::Deserialize;

use crate::error::ValidationErrors;
use crate::form::{Fields, Form};
use crate::validation::{Email, MaxLength, Required};

/// Client form.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInput {
    pub business_name: String,
    #[serde(default)]
    pub contact_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Form for ClientInput {
    type Cleaned = Self;

    fn clean(self) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new();
        let cleaned = Self {
            business_name: fields.text(
                "business_name",
                &self.business_name,
                &[&Required::new("Business name"), &MaxLength::new("Business name", 200)],
            ),
            contact_name: fields.text("contact_name", &self.contact_name, &[&MaxLength::new("Contact name", 100)]),
            email: fields.text("email", &self.email, &[&Required::new("Email"), &Email]),
            phone: fields.optional("phone", self.phone.as_deref(), &[&MaxLength::new("Phone", 40)]),
            address: fields.text("address", &self.address, &[&MaxLength::new("Address", 500)]),
            tax_id: fields.optional("tax_id", self.tax_id.as_deref(), &[&MaxLength::new("Tax ID", 50)]),
            notes: fields.optional("notes", self.notes.as_deref(), &[&MaxLength::new("Notes", 2000)]),
        };
        fields.finish(cleaned)
    }
}
