//! # tally-forms
//!
//! Validation of submitted forms.
//!
//! This crate provides:
//! - Reusable field validators
//! - Ordered [`ValidationErrors`] whose message joins every field error
//! - The [`Form`] trait, turning a JSON body into a cleaned value
//! - Inputs for every entity, including gateway-specific payment account data
//!
//! ## Quick Start
//!
//! ```rust
//! use tally_forms::{ClientInput, Form};
//!
//! let body = br#"{"business_name": "", "email": "nope"}"#;
//! let err = ClientInput::parse(body).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Business name is required.; Enter a valid email address."
//! );
//! ```
//!
//! ## Validators
//!
//! ```rust
//! use tally_forms::validation::{Email, Required, Validator};
//!
//! assert!(Required::new("Email").validate("").is_err());
//! assert!(Email.validate("ada@example.com").is_ok());
//! ```

pub mod banking;
mod error;
mod form;
pub mod inputs;
pub mod validation;

pub use error::{FormError, Result, ValidationErrors};
pub use form::{Fields, Form};
pub use inputs::{
    validate_account_data, validate_line_items, BusinessInput, CleanedAccount, CleanedInvoice,
    ClientInput, InvoiceInput, ItemInput, LoginInput, PaymentAccountInput, RegisterInput,
    StatusInput, MAX_AMOUNT, MIN_PASSWORD_LENGTH,
};
