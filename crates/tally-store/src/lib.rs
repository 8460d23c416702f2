//! SQLite persistence for Tally.
//!
//! Each table has a repository type ([`Clients`], [`Items`],
//! [`PaymentAccounts`], [`Invoices`], ...) whose associated functions take
//! the pool and the id of the acting user. Rows owned by another user are
//! reported as [`StoreError::NotFound`].
//!
//! ```rust,ignore
//! use tally_store::{create_tables, Clients};
//!
//! create_tables(&pool).await?;
//! let clients = Clients::list(&pool, user.id, Some("acme")).await?;
//! ```

mod accounts;
mod business;
mod clients;
mod columns;
mod dashboard;
mod drafts;
mod error;
mod invoices;
mod items;
mod schema;

#[cfg(test)]
mod testing;

pub use accounts::PaymentAccounts;
pub use business::Businesses;
pub use clients::Clients;
pub use dashboard::{CurrencyTotal, Dashboard, RECENT_INVOICES};
pub use drafts::SqliteDraftStore;
pub use error::{Result, StoreError};
pub use invoices::{InvoiceFilter, InvoiceSummary, Invoices};
pub use items::Items;
pub use schema::create_tables;
