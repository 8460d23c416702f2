//! # tally-core
//!
//! Domain model for the Tally invoicing back end.
//!
//! This crate provides:
//! - Records for businesses, clients, catalog items, invoices and payment accounts
//! - Decimal money arithmetic for subtotals, discounts, taxes and totals
//! - Typed account data for every supported payment gateway
//! - A reducer-driven invoice draft with a persistence fingerprint
//! - Debounced auto-save of drafts through a [`DraftStore`]
//! - Aggregation of an invoice into a printable [`InvoiceDocument`]
//!
//! ## Totals
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::{calculate_totals, Adjustment, LineItem, TaxBase};
//!
//! let items = vec![LineItem::new("Design", Decimal::from(10), Decimal::from(50))];
//! let totals = calculate_totals(
//!     &items,
//!     &Adjustment::percentage(Decimal::from(10)),
//!     &Adjustment::flat(Decimal::from(20)),
//!     TaxBase::Subtotal,
//! )
//! .unwrap();
//! assert_eq!(totals.total, Decimal::from(470));
//! ```
//!
//! ## Drafts
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use tally_core::{DraftAction, InvoiceDraft, LineItem};
//!
//! let issued = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let draft = InvoiceDraft::new("INV-0001", issued, "USD")
//!     .reduce(DraftAction::SetClient(Some(1)))
//!     .reduce(DraftAction::AddLineItem(LineItem::new("Audit", Decimal::ONE, Decimal::from(900))));
//!
//! assert!(draft.is_ready());
//! assert!(draft.is_dirty());
//! assert_eq!(draft.totals().unwrap().total, Decimal::from(900));
//! ```

pub mod autosave;
mod business;
mod catalog;
mod client;
mod document;
mod draft;
mod error;
pub mod gateway;
mod invoice;
mod line_item;
pub mod money;
mod numbering;

pub use autosave::{AutoSave, BoxFuture, DraftStore, SaveOutcome, SkipReason};
pub use business::{Business, DEFAULT_INVOICE_PREFIX};
pub use catalog::Item;
pub use client::Client;
pub use document::{
    format_date, DocumentRow, InvoiceDocument, PartyBlock, PaymentBlock, TotalsRow,
};
pub use draft::{DraftAction, InvoiceDraft, LineItemPatch, DEFAULT_PAYMENT_TERM_DAYS};
pub use error::{CoreError, Result};
pub use gateway::{AccountData, GatewayType, InstructionLine, PaymentAccount};
pub use invoice::{DocumentTemplate, Invoice, InvoiceStatus};
pub use line_item::{decode_line_items, encode_line_items, LineItem, LineItemView};
pub use money::{
    calculate_subtotal, calculate_total, calculate_totals, format_money, round2, Adjustment,
    AdjustmentKind, TaxBase, Totals,
};
pub use numbering::next_invoice_number;
