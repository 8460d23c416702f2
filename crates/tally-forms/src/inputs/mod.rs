//! Typed inputs for every form the application accepts.

mod account;
mod auth;
mod business;
mod client;
mod invoice;
mod item;

pub use account::{validate_account_data, CleanedAccount, PaymentAccountInput};
pub use auth::{LoginInput, RegisterInput, MIN_PASSWORD_LENGTH};
pub use business::BusinessInput;
pub use client::ClientInput;
pub use invoice::{validate_line_items, CleanedInvoice, InvoiceInput, StatusInput, MAX_AMOUNT};
pub use item::ItemInput;
