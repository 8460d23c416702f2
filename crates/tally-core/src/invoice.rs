//! Invoice record, status lifecycle and document templates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::line_item::LineItem;
use crate::money::{calculate_totals, Adjustment, TaxBase, Totals};

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being edited, not yet sent.
    #[default]
    Draft,
    /// Sent to the client and awaiting payment.
    Sent,
    /// Paid in full. Paid invoices are immutable.
    Paid,
    /// Sent and past its due date.
    Overdue,
    /// Voided.
    Cancelled,
}

impl InvoiceStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Sent,
        Self::Paid,
        Self::Overdue,
        Self::Cancelled,
    ];

    /// Returns the storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Sent => "Sent",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns whether invoices in this state are frozen.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Returns whether money is still expected for invoices in this state.
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Sent | Self::Overdue)
    }

    /// Returns whether an invoice may move from this state to `next`.
    ///
    /// Paid invoices are final, and only a sent invoice can become overdue.
    /// Staying in the same state is allowed.
    pub fn can_transition_to(&self, next: Self) -> bool {
        if self.is_locked() {
            return false;
        }
        match next {
            Self::Overdue => matches!(self, Self::Sent | Self::Overdue),
            _ => true,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidStatus(s.to_string()))
    }
}

/// Page layout used when rendering an invoice document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentTemplate {
    /// Business block on the left, title on the right, ruled table.
    #[default]
    Classic,
    /// Coloured header band with the title over the business block.
    Modern,
    /// No colour, no rules, generous spacing.
    Minimal,
}

impl DocumentTemplate {
    /// Every template.
    pub const ALL: [Self; 3] = [Self::Classic, Self::Modern, Self::Minimal];

    /// Returns the storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Minimal => "minimal",
        }
    }
}

impl FromStr for DocumentTemplate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|template| template.as_str() == s)
            .ok_or_else(|| CoreError::InvalidTemplate(s.to_string()))
    }
}

/// A persisted invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    /// Primary key.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Issuing business.
    pub business_id: i64,
    /// Billed client.
    pub client_id: i64,
    /// Number shown on the document, unique per business.
    pub invoice_number: String,
    /// Lifecycle state.
    pub status: InvoiceStatus,
    /// Date of issue.
    pub issue_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Billed rows.
    pub line_items: Vec<LineItem>,
    /// Discount mode and value.
    pub discount: Adjustment,
    /// Tax mode and value.
    pub tax: Adjustment,
    /// What a percentage tax applies to.
    pub tax_base: TaxBase,
    /// Stored sum of line totals.
    pub subtotal: Decimal,
    /// Stored discount amount.
    pub discount_amount: Decimal,
    /// Stored tax amount.
    pub tax_amount: Decimal,
    /// Stored amount due.
    pub total: Decimal,
    /// Free-form notes printed on the document.
    pub notes: Option<String>,
    /// Payment terms printed on the document.
    pub terms: Option<String>,
    /// Account whose details are printed for payment.
    pub payment_account_id: Option<i64>,
    /// Document layout.
    pub template: DocumentTemplate,
    /// When the invoice was first sent.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the invoice was marked paid.
    pub paid_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Returns the stored totals.
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            discount: self.discount_amount,
            tax: self.tax_amount,
            total: self.total,
        }
    }

    /// Recomputes the totals from the line items.
    pub fn computed_totals(&self) -> Result<Totals> {
        calculate_totals(&self.line_items, &self.discount, &self.tax, self.tax_base)
    }

    /// Returns an error if the invoice can no longer be modified.
    pub fn ensure_editable(&self) -> Result<()> {
        if self.status.is_locked() {
            return Err(CoreError::InvoiceLocked(self.invoice_number.clone()));
        }
        Ok(())
    }

    /// Returns whether a sent invoice has passed its due date.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && self.due_date < today
    }

    /// Number of days between issue and due date.
    pub fn payment_term_days(&self) -> i64 {
        (self.due_date - self.issue_date).num_days()
    }
}
