//! Decoding of text columns into domain values.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{Result, StoreError};

/// Parses a stored decimal amount.
pub(crate) fn amount(entity: &'static str, id: i64, column: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| StoreError::corrupt(entity, id, format!("{column} {value:?}: {e}")))
}

/// Parses a stored enum tag.
pub(crate) fn tag<T>(entity: &'static str, id: i64, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| StoreError::corrupt(entity, id, e))
}
