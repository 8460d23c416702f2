use serde::Deserialize;
use tally_core::DEFAULT_INVOICE_PREFIX;

use crate::error::ValidationErrors;
use crate::form::{Fields, Form};
use crate::validation::{CurrencyCode, Email, ImageSource, MaxLength, Pattern, Required};

/// Business profile form.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    pub default_currency: String,
    #[serde(default)]
    pub invoice_prefix: Option<String>,
}

impl Form for BusinessInput {
    type Cleaned = Self;

    fn clean(self) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::new();
        let prefix = Pattern::new(
            r"^[A-Za-z0-9][A-Za-z0-9/_-]*$",
            "Invoice prefix may only contain letters, digits, '/', '_' and '-'.",
        )
        .map_err(|e| ValidationErrors::single("invoice_prefix", e.to_string()))?;

        let cleaned = Self {
            name: fields.text("name", &self.name, &[&Required::new("Business name"), &MaxLength::new("Business name", 200)]),
            email: fields.text("email", &self.email, &[&Required::new("Email"), &Email]),
            phone: fields.optional("phone", self.phone.as_deref(), &[&MaxLength::new("Phone", 40)]),
            address: fields.text("address", &self.address, &[&MaxLength::new("Address", 500)]),
            tax_id: fields.optional("tax_id", self.tax_id.as_deref(), &[&MaxLength::new("Tax ID", 50)]),
            logo: fields.optional("logo", self.logo.as_deref(), &[&ImageSource]),
            signature: fields.optional("signature", self.signature.as_deref(), &[&ImageSource]),
            default_currency: fields
                .text("default_currency", &self.default_currency.to_ascii_uppercase(), &[&CurrencyCode]),
            invoice_prefix: Some(
                fields
                    .optional(
                        "invoice_prefix",
                        self.invoice_prefix.as_deref(),
                        &[&MaxLength::new("Invoice prefix", 12), &prefix],
                    )
                    .unwrap_or_else(|| DEFAULT_INVOICE_PREFIX.to_string()),
            ),
        };
        fields.finish(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BusinessInput {
        BusinessInput {
            name: "Acme Studio".to_string(),
            email: "billing@acme.test".to_string(),
            phone: None,
            address: "1 Main St".to_string(),
            tax_id: Some("  ".to_string()),
            logo: Some("data:image/png;base64,AAAA".to_string()),
            signature: None,
            default_currency: "usd".to_string(),
            invoice_prefix: None,
        }
    }

    #[test]
    fn test_clean_defaults() {
        let cleaned = input().clean().unwrap();
        assert_eq!(cleaned.default_currency, "USD");
        assert_eq!(cleaned.invoice_prefix.as_deref(), Some("INV-"));
        assert_eq!(cleaned.tax_id, None);
    }

    #[test]
    fn test_rejects_bad_logo_and_prefix() {
        let mut bad = input();
        bad.logo = Some("javascript:alert(1)".to_string());
        bad.invoice_prefix = Some("INV #".to_string());
        let errors = bad.clean().unwrap_err();
        assert!(errors.has("logo"));
        assert!(errors.has("invoice_prefix"));
    }
}
