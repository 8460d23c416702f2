//! The `Form` trait and the field cleaner used by input types.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::error::{FormError, Result, ValidationErrors};
use crate::validation::Validator;

/// A submitted input that can be validated into a clean value.
pub trait Form: DeserializeOwned {
    /// The validated, normalized value.
    type Cleaned;

    /// Validates the input, collecting every field error.
    fn clean(self) -> std::result::Result<Self::Cleaned, ValidationErrors>;

    /// Decodes a JSON body.
    fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| FormError::Parse(e.to_string()))
    }

    /// Decodes and validates a JSON body.
    fn parse(body: &[u8]) -> Result<Self::Cleaned> {
        Ok(Self::from_json(body)?.clean()?)
    }
}

/// Collects field errors while an input is cleaned.
///
/// Each field reports at most its first failing validator.
#[derive(Debug, Default)]
pub struct Fields {
    errors: ValidationErrors,
}

impl Fields {
    /// Creates an empty cleaner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims `value` and runs `validators` against it.
    pub fn text(&mut self, name: &str, value: &str, validators: &[&dyn Validator]) -> String {
        let value = value.trim();
        self.run(name, value, validators);
        value.to_string()
    }

    /// Runs `validators` against `value` as submitted, e.g. a password.
    pub fn verbatim(&mut self, name: &str, value: &str, validators: &[&dyn Validator]) {
        self.run(name, value, validators);
    }

    /// Like [`Fields::text`], but blank values become `None` and skip validation.
    pub fn optional(
        &mut self,
        name: &str,
        value: Option<&str>,
        validators: &[&dyn Validator],
    ) -> Option<String> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        self.run(name, value, validators);
        Some(value.to_string())
    }

    /// Requires `amount >= 0`.
    pub fn non_negative(&mut self, name: &str, label: &str, amount: Decimal) {
        self.check(
            name,
            amount >= Decimal::ZERO,
            format!("{label} cannot be negative."),
        );
    }

    /// Requires `amount > 0`.
    pub fn positive(&mut self, name: &str, label: &str, amount: Decimal) {
        self.check(
            name,
            amount > Decimal::ZERO,
            format!("{label} must be greater than zero."),
        );
    }

    /// Requires `amount <= max`.
    pub fn at_most(&mut self, name: &str, label: &str, amount: Decimal, max: Decimal) {
        self.check(name, amount <= max, format!("{label} cannot exceed {max}."));
    }

    /// Requires `0 <= amount <= 100`.
    pub fn percentage(&mut self, name: &str, label: &str, amount: Decimal) {
        self.check(
            name,
            amount >= Decimal::ZERO && amount <= Decimal::ONE_HUNDRED,
            format!("{label} percentage must be between 0 and 100."),
        );
    }

    /// Records `message` unless `ok`.
    pub fn check(&mut self, name: &str, ok: bool, message: impl Into<String>) {
        if !ok {
            self.errors.add(name, message);
        }
    }

    /// Records an error.
    pub fn add(&mut self, name: &str, message: impl Into<String>) {
        self.errors.add(name, message);
    }

    /// Adds nested errors under `prefix`.
    pub fn merge(&mut self, prefix: &str, errors: ValidationErrors) {
        self.errors.merge(prefix, errors);
    }

    /// Returns whether `name` already failed.
    pub fn has_error(&self, name: &str) -> bool {
        self.errors.has(name)
    }

    /// Returns `value` if nothing failed.
    pub fn finish<T>(self, value: T) -> std::result::Result<T, ValidationErrors> {
        self.errors.into_result(value)
    }

    fn run(&mut self, name: &str, value: &str, validators: &[&dyn Validator]) {
        if let Some(message) = validators.iter().find_map(|v| v.validate(value).err()) {
            self.errors.add(name, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Email, MaxLength, Required};
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_failing_validator_wins() {
        let mut fields = Fields::new();
        let email = fields.text("email", "  ", &[&Required::new("Email"), &Email]);
        assert_eq!(email, "");
        let errors = fields.finish(()).unwrap_err();
        assert_eq!(errors.message(), "Email is required.");
    }

    #[test]
    fn test_optional_blank_is_none() {
        let mut fields = Fields::new();
        assert_eq!(fields.optional("phone", Some("   "), &[&MaxLength::new("Phone", 2)]), None);
        assert_eq!(fields.optional("phone", None, &[]), None);
        assert_eq!(
            fields.optional("tax_id", Some(" DE123 "), &[]),
            Some("DE123".to_string())
        );
        assert!(fields.finish(()).is_ok());
    }

    #[test]
    fn test_amount_checks() {
        let mut fields = Fields::new();
        fields.non_negative("price", "Unit price", dec!(-1));
        fields.positive("quantity", "Quantity", Decimal::ZERO);
        fields.percentage("tax", "Tax", dec!(100.01));
        fields.percentage("discount", "Discount", dec!(100));
        fields.at_most("rate", "Rate", dec!(10.01), dec!(10));
        fields.at_most("fee", "Fee", dec!(10), dec!(10));
        let errors = fields.finish(()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("rate"), vec!["Rate cannot exceed 10."]);
        assert!(!errors.has("discount"));
    }
}
