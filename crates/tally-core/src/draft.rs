//! In-progress invoice edits.
//!
//! An [`InvoiceDraft`] is driven by [`DraftAction`]s through [`InvoiceDraft::reduce`].
//! Totals are never stored on the draft; they are derived from the line
//! items on demand. The [`fingerprint`](InvoiceDraft::fingerprint) covers the
//! fields that are persisted, so comparing it with the fingerprint recorded
//! at the last save tells whether there is anything left to save.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Item;
use crate::error::Result;
use crate::invoice::{DocumentTemplate, Invoice, InvoiceStatus};
use crate::line_item::LineItem;
use crate::money::{calculate_totals, Adjustment, TaxBase, Totals};

/// Days between issue and due date for a fresh draft.
pub const DEFAULT_PAYMENT_TERM_DAYS: u64 = 30;

/// Editable state of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// Row id once the draft has been saved.
    pub id: Option<i64>,
    pub status: InvoiceStatus,
    pub client_id: Option<i64>,
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
    #[serde(skip)]
    saved_fingerprint: Option<String>,
}

/// Partial update of one line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemPatch {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
}

/// An edit applied to a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    /// Replace the draft with a persisted invoice.
    Load(Box<Invoice>),
    /// Replace the draft wholesale, e.g. with a fresh one.
    Reset(Box<InvoiceDraft>),
    SetClient(Option<i64>),
    SetInvoiceNumber(String),
    /// Move the issue date, keeping the payment term length.
    SetIssueDate(NaiveDate),
    SetDueDate(NaiveDate),
    SetCurrency(String),
    AddLineItem(LineItem),
    /// Append one unit of a catalog item.
    AddCatalogItem(Box<Item>),
    UpdateLineItem { index: usize, patch: LineItemPatch },
    RemoveLineItem(usize),
    MoveLineItem { from: usize, to: usize },
    SetDiscount(Adjustment),
    SetTax { tax: Adjustment, base: TaxBase },
    SetNotes(Option<String>),
    SetTerms(Option<String>),
    SetPaymentAccount(Option<i64>),
    SetTemplate(DocumentTemplate),
    /// Record a completed save.
    MarkSaved { id: i64, fingerprint: String },
}

/// Fields covered by the fingerprint, in serialization order.
#[derive(Serialize)]
struct Fingerprint<'a> {
    client_id: Option<i64>,
    invoice_number: &'a str,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    currency: &'a str,
    line_items: Vec<(&'a str, Decimal, Decimal, Option<i64>)>,
    discount: (&'static str, Decimal),
    tax: (&'static str, Decimal),
    tax_base: &'static str,
    notes: Option<&'a str>,
    terms: Option<&'a str>,
    payment_account_id: Option<i64>,
    template: &'static str,
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

impl InvoiceDraft {
    /// Creates an empty draft due [`DEFAULT_PAYMENT_TERM_DAYS`] after `issue_date`.
    pub fn new(invoice_number: impl Into<String>, issue_date: NaiveDate, currency: impl Into<String>) -> Self {
        let due_date = issue_date
            .checked_add_days(Days::new(DEFAULT_PAYMENT_TERM_DAYS))
            .unwrap_or(issue_date);
        Self {
            id: None,
            status: InvoiceStatus::Draft,
            client_id: None,
            invoice_number: invoice_number.into(),
            issue_date,
            due_date,
            currency: currency.into(),
            line_items: Vec::new(),
            discount: Adjustment::none(),
            tax: Adjustment::none(),
            tax_base: TaxBase::Subtotal,
            notes: None,
            terms: None,
            payment_account_id: None,
            template: DocumentTemplate::Classic,
            saved_fingerprint: None,
        }
    }

    /// Creates a clean draft from a persisted invoice.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let mut draft = Self {
            id: Some(invoice.id),
            status: invoice.status,
            client_id: Some(invoice.client_id),
            invoice_number: invoice.invoice_number.clone(),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            currency: invoice.currency.clone(),
            line_items: invoice.line_items.clone(),
            discount: invoice.discount,
            tax: invoice.tax,
            tax_base: invoice.tax_base,
            notes: invoice.notes.clone(),
            terms: invoice.terms.clone(),
            payment_account_id: invoice.payment_account_id,
            template: invoice.template,
            saved_fingerprint: None,
        };
        draft.saved_fingerprint = Some(draft.fingerprint());
        draft
    }

    /// Applies one edit and returns the new state.
    ///
    /// Edits to a locked draft are ignored, as are edits addressing a line
    /// item that does not exist.
    #[must_use]
    pub fn reduce(mut self, action: DraftAction) -> Self {
        match action {
            DraftAction::Load(invoice) => return Self::from_invoice(&invoice),
            DraftAction::Reset(draft) => return *draft,
            DraftAction::MarkSaved { id, fingerprint } => {
                self.id = Some(id);
                self.saved_fingerprint = Some(fingerprint);
                return self;
            }
            _ if self.is_locked() => return self,
            DraftAction::SetClient(client_id) => self.client_id = client_id,
            DraftAction::SetInvoiceNumber(number) => self.invoice_number = number,
            DraftAction::SetIssueDate(date) => {
                let term = self.due_date - self.issue_date;
                self.issue_date = date;
                self.due_date = date.checked_add_signed(term).unwrap_or(date);
            }
            DraftAction::SetDueDate(date) => self.due_date = date,
            DraftAction::SetCurrency(currency) => self.currency = currency,
            DraftAction::AddLineItem(item) => self.line_items.push(item),
            DraftAction::AddCatalogItem(item) => self.line_items.push(item.to_line_item(Decimal::ONE)),
            DraftAction::UpdateLineItem { index, patch } => {
                if let Some(line) = self.line_items.get_mut(index) {
                    if let Some(description) = patch.description {
                        line.description = description;
                    }
                    if let Some(quantity) = patch.quantity {
                        line.quantity = quantity;
                    }
                    if let Some(unit_price) = patch.unit_price {
                        line.unit_price = unit_price;
                    }
                }
            }
            DraftAction::RemoveLineItem(index) => {
                if index < self.line_items.len() {
                    self.line_items.remove(index);
                }
            }
            DraftAction::MoveLineItem { from, to } => {
                if from < self.line_items.len() && to < self.line_items.len() {
                    let line = self.line_items.remove(from);
                    self.line_items.insert(to, line);
                }
            }
            DraftAction::SetDiscount(discount) => self.discount = discount,
            DraftAction::SetTax { tax, base } => {
                self.tax = tax;
                self.tax_base = base;
            }
            DraftAction::SetNotes(notes) => self.notes = notes,
            DraftAction::SetTerms(terms) => self.terms = terms,
            DraftAction::SetPaymentAccount(account_id) => self.payment_account_id = account_id,
            DraftAction::SetTemplate(template) => self.template = template,
        }
        self
    }

    /// Derived totals for the current line items.
    pub fn totals(&self) -> Result<Totals> {
        calculate_totals(&self.line_items, &self.discount, &self.tax, self.tax_base)
    }

    /// Stable serialization of the persisted fields.
    ///
    /// Decimals are normalized so `1.50` and `1.5` fingerprint the same, and
    /// blank notes or terms count as absent.
    pub fn fingerprint(&self) -> String {
        let fields = Fingerprint {
            client_id: self.client_id,
            invoice_number: self.invoice_number.trim(),
            issue_date: self.issue_date,
            due_date: self.due_date,
            currency: &self.currency,
            line_items: self
                .line_items
                .iter()
                .map(|l| (l.description.as_str(), l.quantity.normalize(), l.unit_price.normalize(), l.item_id))
                .collect(),
            discount: (self.discount.kind.as_str(), self.discount.value.normalize()),
            tax: (self.tax.kind.as_str(), self.tax.value.normalize()),
            tax_base: self.tax_base.as_str(),
            notes: non_blank(&self.notes),
            terms: non_blank(&self.terms),
            payment_account_id: self.payment_account_id,
            template: self.template.as_str(),
        };
        // Serializing plain fields cannot fail.
        serde_json::to_string(&fields).unwrap_or_default()
    }

    /// Fingerprint recorded by the last save, if any.
    pub fn saved_fingerprint(&self) -> Option<&str> {
        self.saved_fingerprint.as_deref()
    }

    /// Returns whether there are edits since the last save.
    pub fn is_dirty(&self) -> bool {
        self.saved_fingerprint.as_deref() != Some(self.fingerprint().as_str())
    }

    /// Returns whether edits are ignored.
    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    /// Returns whether the draft can be persisted.
    pub fn is_ready(&self) -> bool {
        self.client_id.is_some() && !self.is_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> InvoiceDraft {
        InvoiceDraft::new("INV-0001", date(2024, 3, 1), "USD")
            .reduce(DraftAction::SetClient(Some(4)))
            .reduce(DraftAction::AddLineItem(LineItem::new("Design", dec!(10), dec!(50))))
            .reduce(DraftAction::AddLineItem(LineItem::new("Hosting", dec!(1), dec!(25.50))))
    }

    #[test]
    fn test_new_draft_defaults() {
        let d = InvoiceDraft::new("INV-0001", date(2024, 3, 1), "EUR");
        assert_eq!(d.due_date, date(2024, 3, 31));
        assert!(!d.is_ready());
        assert!(d.is_dirty());
    }

    #[test]
    fn test_totals_follow_line_items() {
        let d = draft()
            .reduce(DraftAction::SetDiscount(Adjustment::percentage(dec!(10))))
            .reduce(DraftAction::SetTax {
                tax: Adjustment::percentage(dec!(20)),
                base: TaxBase::Subtotal,
            });
        assert_eq!(d.totals().unwrap().total, dec!(578.05));

        let d = d.reduce(DraftAction::UpdateLineItem {
            index: 1,
            patch: LineItemPatch {
                quantity: Some(dec!(2)),
                ..LineItemPatch::default()
            },
        });
        assert_eq!(d.totals().unwrap().subtotal, dec!(551.00));
    }

    #[test]
    fn test_issue_date_keeps_term() {
        let d = draft()
            .reduce(DraftAction::SetDueDate(date(2024, 3, 15)))
            .reduce(DraftAction::SetIssueDate(date(2024, 4, 1)));
        assert_eq!(d.due_date, date(2024, 4, 15));
    }

    #[test]
    fn test_line_item_edits() {
        let d = draft().reduce(DraftAction::MoveLineItem { from: 1, to: 0 });
        assert_eq!(d.line_items[0].description, "Hosting");

        let d = d.reduce(DraftAction::RemoveLineItem(0));
        assert_eq!(d.line_items.len(), 1);
        assert_eq!(d.line_items[0].description, "Design");

        // Out-of-range indexes change nothing.
        let unchanged = d.clone();
        let d = d
            .reduce(DraftAction::RemoveLineItem(5))
            .reduce(DraftAction::MoveLineItem { from: 0, to: 3 })
            .reduce(DraftAction::UpdateLineItem {
                index: 9,
                patch: LineItemPatch::default(),
            });
        assert_eq!(d, unchanged);
    }

    #[test]
    fn test_add_catalog_item() {
        let now = Utc::now();
        let item = Item {
            id: 12,
            user_id: 1,
            name: "Support".to_string(),
            description: None,
            unit_price: dec!(99),
            created_at: now,
            updated_at: now,
        };
        let d = draft().reduce(DraftAction::AddCatalogItem(Box::new(item)));
        let line = d.line_items.last().unwrap();
        assert_eq!(line.item_id, Some(12));
        assert_eq!(line.quantity, Decimal::ONE);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = draft();
        let b = InvoiceDraft::new("INV-0001", date(2024, 3, 1), "USD")
            .reduce(DraftAction::SetClient(Some(4)))
            .reduce(DraftAction::AddLineItem(LineItem::new("Design", dec!(10.00), dec!(50.0))))
            .reduce(DraftAction::AddLineItem(LineItem::new("Hosting", dec!(1), dec!(25.5))))
            .reduce(DraftAction::SetNotes(Some("   ".to_string())));
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = a.clone().reduce(DraftAction::SetCurrency("EUR".to_string()));
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_saved_marker() {
        let d = draft();
        let fingerprint = d.fingerprint();
        let saved = d.reduce(DraftAction::MarkSaved {
            id: 7,
            fingerprint: fingerprint.clone(),
        });
        assert_eq!(saved.fingerprint(), fingerprint);
        assert_eq!(saved.id, Some(7));
        assert!(!saved.is_dirty());

        let edited = saved.reduce(DraftAction::SetTerms(Some("Net 15".to_string())));
        assert!(edited.is_dirty());
    }

    #[test]
    fn test_locked_draft_ignores_edits() {
        let mut d = draft();
        d.status = InvoiceStatus::Paid;
        let before = d.clone();
        let after = d
            .reduce(DraftAction::SetClient(None))
            .reduce(DraftAction::AddLineItem(LineItem::new("Extra", dec!(1), dec!(1))));
        assert_eq!(after, before);
        assert!(!after.is_ready());
    }
}
