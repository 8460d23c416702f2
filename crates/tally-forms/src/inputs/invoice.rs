use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tally_core::{
    calculate_totals, Adjustment, AdjustmentKind, DocumentTemplate, InvoiceDraft, InvoiceStatus,
    LineItem, TaxBase, Totals,
};

use crate::error::ValidationErrors;
use crate::form::{Fields, Form};
use crate::validation::{CurrencyCode, MaxLength, Required};

/// Largest quantity, unit price or flat adjustment accepted on an invoice:
/// one trillion.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Invoice form, also produced from an auto-saved draft.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceInput {
    pub client_id: Option<i64>,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub discount: Adjustment,
    #[serde(default)]
    pub tax: Adjustment,
    #[serde(default)]
    pub tax_base: TaxBase,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub payment_account_id: Option<i64>,
    #[serde(default)]
    pub template: DocumentTemplate,
}

/// A validated invoice with its computed totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedInvoice {
    pub client_id: i64,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
    pub line_items: Vec<LineItem>,
    pub discount: Adjustment,
    pub tax: Adjustment,
    pub tax_base: TaxBase,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub payment_account_id: Option<i64>,
    pub template: DocumentTemplate,
    pub totals: Totals,
}

impl From<&InvoiceDraft> for InvoiceInput {
    fn from(draft: &InvoiceDraft) -> Self {
        Self {
            client_id: draft.client_id,
            invoice_number: draft.invoice_number.clone(),
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            currency: draft.currency.clone(),
            line_items: draft.line_items.clone(),
            discount: draft.discount,
            tax: draft.tax,
            tax_base: draft.tax_base,
            notes: draft.notes.clone(),
            terms: draft.terms.clone(),
            payment_account_id: draft.payment_account_id,
            template: draft.template,
        }
    }
}

impl Form for InvoiceInput {
    type Cleaned = CleanedInvoice;

    fn clean(self) -> Result<CleanedInvoice, ValidationErrors> {
        let mut fields = Fields::new();

        fields.check("client_id", self.client_id.is_some(), "Select a client.");
        let invoice_number = fields.text(
            "invoice_number",
            &self.invoice_number,
            &[&Required::new("Invoice number"), &MaxLength::new("Invoice number", 32)],
        );
        let currency = fields.text("currency", &self.currency.to_ascii_uppercase(), &[&CurrencyCode]);
        fields.check(
            "due_date",
            self.due_date >= self.issue_date,
            "Due date cannot be before the issue date.",
        );

        let line_items: Vec<LineItem> = self
            .line_items
            .into_iter()
            .enumerate()
            .map(|(i, item)| clean_line_item(&mut fields, i, item))
            .collect();

        check_adjustment(&mut fields, "discount", "Discount", &self.discount);
        check_adjustment(&mut fields, "tax", "Tax", &self.tax);

        let notes = fields.optional("notes", self.notes.as_deref(), &[&MaxLength::new("Notes", 2000)]);
        let terms = fields.optional("terms", self.terms.as_deref(), &[&MaxLength::new("Terms", 2000)]);

        let totals = match calculate_totals(&line_items, &self.discount, &self.tax, self.tax_base) {
            Ok(totals) => {
                if self.discount.kind == AdjustmentKind::Flat
                    && self.discount.value > totals.subtotal
                    && !fields.has_error("discount")
                {
                    fields.add("discount", "Discount cannot exceed the subtotal.");
                }
                totals
            }
            Err(_) => {
                fields.add("line_items", "Invoice total is too large.");
                Totals::default()
            }
        };
        fields.finish(CleanedInvoice {
            client_id: self.client_id.unwrap_or_default(),
            invoice_number,
            issue_date: self.issue_date,
            due_date: self.due_date,
            currency,
            line_items,
            discount: self.discount,
            tax: self.tax,
            tax_base: self.tax_base,
            notes,
            terms,
            payment_account_id: self.payment_account_id,
            template: self.template,
            totals,
        })
    }
}

fn clean_line_item(fields: &mut Fields, index: usize, item: LineItem) -> LineItem {
    let line = index + 1;
    let name = |field: &str| format!("line_items[{index}].{field}");

    let description = fields.text(
        &name("description"),
        &item.description,
        &[
            &Required::new(&format!("Line {line} description")),
            &MaxLength::new(&format!("Line {line} description"), 500),
        ],
    );
    let quantity = format!("Line {line} quantity");
    fields.positive(&name("quantity"), &quantity, item.quantity);
    if !fields.has_error(&name("quantity")) {
        fields.at_most(&name("quantity"), &quantity, item.quantity, MAX_AMOUNT);
    }
    let unit_price = format!("Line {line} unit price");
    fields.non_negative(&name("unit_price"), &unit_price, item.unit_price);
    if !fields.has_error(&name("unit_price")) {
        fields.at_most(&name("unit_price"), &unit_price, item.unit_price, MAX_AMOUNT);
    }

    LineItem {
        description,
        ..item
    }
}

/// Checks line items read back from storage against the rules a submitted
/// invoice must meet. Errors are keyed like `line_items[0].quantity`.
pub fn validate_line_items(items: &[LineItem]) -> ValidationErrors {
    let mut fields = Fields::new();
    for (i, item) in items.iter().enumerate() {
        let cleaned = clean_line_item(&mut fields, i, item.clone());
        fields.check(
            &format!("line_items[{i}].description"),
            cleaned.description == item.description,
            format!("Line {} description has surrounding whitespace.", i + 1),
        );
    }
    fields.finish(()).err().unwrap_or_default()
}

fn check_adjustment(fields: &mut Fields, name: &str, label: &str, adjustment: &Adjustment) {
    match adjustment.kind {
        AdjustmentKind::Percentage => fields.percentage(name, label, adjustment.value),
        AdjustmentKind::Flat => {
            fields.non_negative(name, label, adjustment.value);
            if !fields.has_error(name) {
                fields.at_most(name, label, adjustment.value, MAX_AMOUNT);
            }
        }
    }
}

/// Status change form.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusInput {
    pub status: InvoiceStatus,
}

impl Form for StatusInput {
    type Cleaned = InvoiceStatus;

    fn clean(self) -> Result<InvoiceStatus, ValidationErrors> {
        Ok(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> InvoiceInput {
        InvoiceInput {
            client_id: Some(3),
            invoice_number: " INV-0001 ".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            currency: "usd".to_string(),
            line_items: vec![
                LineItem::new("Design", dec!(10), dec!(50)),
                LineItem::new("Hosting", dec!(1), dec!(25.50)),
            ],
            discount: Adjustment::percentage(dec!(10)),
            tax: Adjustment::percentage(dec!(20)),
            tax_base: TaxBase::Subtotal,
            notes: None,
            terms: Some("Net 30".to_string()),
            payment_account_id: None,
            template: DocumentTemplate::Classic,
        }
    }

    #[test]
    fn test_clean_computes_totals() {
        let cleaned = input().clean().unwrap();
        assert_eq!(cleaned.invoice_number, "INV-0001");
        assert_eq!(cleaned.currency, "USD");
        assert_eq!(cleaned.totals.total, dec!(578.05));
    }

    #[test]
    fn test_percentages_must_be_in_range() {
        let mut bad = input();
        bad.discount = Adjustment::percentage(dec!(-5));
        bad.tax = Adjustment::percentage(dec!(120));
        let errors = bad.clean().unwrap_err();
        assert_eq!(
            errors.message(),
            "Discount percentage must be between 0 and 100.; Tax percentage must be between 0 and 100."
        );
    }

    #[test]
    fn test_flat_discount_cannot_exceed_subtotal() {
        let mut bad = input();
        bad.discount = Adjustment::flat(dec!(525.51));
        assert!(bad.clean().unwrap_err().has("discount"));

        let mut ok = input();
        ok.discount = Adjustment::flat(dec!(525.50));
        assert_eq!(ok.clean().unwrap().totals.discount, dec!(525.50));
    }

    #[test]
    fn test_line_item_errors_are_numbered() {
        let mut bad = input();
        bad.line_items.push(LineItem::new("", dec!(0), dec!(-1)));
        let errors = bad.clean().unwrap_err();
        assert_eq!(errors.get("line_items[2].description"), vec!["Line 3 description is required."]);
        assert!(errors.has("line_items[2].quantity"));
        assert!(errors.has("line_items[2].unit_price"));
    }

    #[test]
    fn test_huge_amounts_are_rejected_not_panicking() {
        let body = br#"{
            "client_id": 1,
            "invoice_number": "INV-0001",
            "issue_date": "2024-03-01",
            "due_date": "2024-03-31",
            "currency": "USD",
            "line_items": [
                {"description": "Design", "quantity": "79228162514264337593543950335", "unit_price": "2"}
            ]
        }"#;
        let err = InvoiceInput::parse(body).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Line 1 quantity cannot exceed 1000000000000."));

        let mut bad = input();
        bad.line_items[0].unit_price = MAX_AMOUNT + Decimal::ONE;
        bad.tax = Adjustment::flat(Decimal::MAX);
        let errors = bad.clean().unwrap_err();
        assert!(errors.has("line_items[0].unit_price"));
        assert_eq!(errors.get("tax"), vec!["Tax cannot exceed 1000000000000."]);

        let mut largest = input();
        largest.line_items = vec![LineItem::new("Everything", MAX_AMOUNT, MAX_AMOUNT)];
        largest.discount = Adjustment::none();
        largest.tax = Adjustment::percentage(Decimal::ONE_HUNDRED);
        let totals = largest.clean().unwrap().totals;
        assert_eq!(totals.subtotal, MAX_AMOUNT * MAX_AMOUNT);
    }

    #[test]
    fn test_stored_line_items_follow_submission_rules() {
        assert!(validate_line_items(&input().line_items).is_empty());

        let errors = validate_line_items(&[
            LineItem::new("Design", dec!(1), dec!(-500)),
            LineItem::new("x".repeat(501), dec!(1), dec!(1)),
            LineItem::new(" Padded ", dec!(1), dec!(1)),
        ]);
        assert!(errors.has("line_items[0].unit_price"));
        assert!(errors.has("line_items[1].description"));
        assert!(errors.has("line_items[2].description"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_requires_client_and_dates_in_order() {
        let mut bad = input();
        bad.client_id = None;
        bad.due_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let errors = bad.clean().unwrap_err();
        assert!(errors.has("client_id"));
        assert!(errors.has("due_date"));
    }

    #[test]
    fn test_from_draft() {
        let draft = InvoiceDraft::new("INV-0002", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "EUR");
        let input = InvoiceInput::from(&draft);
        assert_eq!(input.client_id, None);
        assert!(input.clean().unwrap_err().has("client_id"));
    }
}
