//! Money arithmetic for invoice totals.
//!
//! All amounts are [`Decimal`]s rounded to two places with
//! midpoint-away-from-zero. Discounts and taxes are either a flat amount or a
//! percentage; a percentage tax is computed against either the subtotal or the
//! post-discount amount.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::line_item::LineItem;

/// Rounds an amount to two decimal places.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// How a discount or tax value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// A fixed amount in the invoice currency.
    #[default]
    Flat,
    /// A percentage in `[0, 100]`.
    Percentage,
}

impl AdjustmentKind {
    /// Returns the storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Percentage => "percentage",
        }
    }
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Self::Flat),
            "percentage" => Ok(Self::Percentage),
            other => Err(CoreError::InvalidAdjustmentKind(other.to_string())),
        }
    }
}

/// What a percentage tax is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBase {
    /// Tax the full subtotal.
    #[default]
    Subtotal,
    /// Tax the subtotal after the discount.
    AfterDiscount,
}

impl TaxBase {
    /// Returns the storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subtotal => "subtotal",
            Self::AfterDiscount => "after_discount",
        }
    }
}

impl FromStr for TaxBase {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "subtotal" => Ok(Self::Subtotal),
            "after_discount" => Ok(Self::AfterDiscount),
            other => Err(CoreError::InvalidTaxBase(other.to_string())),
        }
    }
}

/// A discount or tax: a mode plus its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Adjustment {
    /// Flat amount or percentage.
    pub kind: AdjustmentKind,
    /// Amount or percentage, depending on `kind`.
    pub value: Decimal,
}

impl Adjustment {
    /// An adjustment that changes nothing.
    pub const fn none() -> Self {
        Self {
            kind: AdjustmentKind::Flat,
            value: Decimal::ZERO,
        }
    }

    /// A flat amount.
    pub const fn flat(value: Decimal) -> Self {
        Self {
            kind: AdjustmentKind::Flat,
            value,
        }
    }

    /// A percentage of the base.
    pub const fn percentage(value: Decimal) -> Self {
        Self {
            kind: AdjustmentKind::Percentage,
            value,
        }
    }

    /// Returns whether the adjustment has no effect.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns the amount this adjustment contributes on top of `base`.
    pub fn amount_on(&self, base: Decimal) -> Result<Decimal> {
        match self.kind {
            AdjustmentKind::Flat => Ok(round2(self.value)),
            AdjustmentKind::Percentage => base
                .checked_mul(self.value)
                .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                .map(round2)
                .ok_or_else(|| overflow("percentage amount")),
        }
    }
}

/// Computed totals for an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of the line totals.
    pub subtotal: Decimal,
    /// Discount amount subtracted from the subtotal.
    pub discount: Decimal,
    /// Tax amount added to the subtotal.
    pub tax: Decimal,
    /// Amount due, never negative.
    pub total: Decimal,
}

fn overflow(what: &str) -> CoreError {
    CoreError::Overflow(what.to_string())
}

/// Sums the line totals.
pub fn calculate_subtotal(items: &[LineItem]) -> Result<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |sum, item| {
        sum.checked_add(item.total()?)
            .ok_or_else(|| overflow("subtotal"))
    })
}

/// Combines subtotal, tax and discount into the amount due.
///
/// The result is clamped at zero.
pub fn calculate_total(subtotal: Decimal, tax: Decimal, discount: Decimal) -> Result<Decimal> {
    subtotal
        .checked_add(tax)
        .and_then(|v| v.checked_sub(discount))
        .map(|v| round2(v).max(Decimal::ZERO))
        .ok_or_else(|| overflow("total"))
}

/// Computes every total for a set of line items.
pub fn calculate_totals(
    items: &[LineItem],
    discount: &Adjustment,
    tax: &Adjustment,
    tax_base: TaxBase,
) -> Result<Totals> {
    let subtotal = calculate_subtotal(items)?;
    let discount_amount = discount.amount_on(subtotal)?;
    let taxable = match tax_base {
        TaxBase::Subtotal => subtotal,
        TaxBase::AfterDiscount => subtotal
            .checked_sub(discount_amount)
            .ok_or_else(|| overflow("taxable amount"))?
            .max(Decimal::ZERO),
    };
    let tax_amount = tax.amount_on(taxable)?;

    Ok(Totals {
        subtotal,
        discount: discount_amount,
        tax: tax_amount,
        total: calculate_total(subtotal, tax_amount, discount_amount)?,
    })
}

/// Returns the display symbol for an ISO 4217 currency code.
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "INR" => "₹",
        "CAD" => "CA$",
        "AUD" => "A$",
        "NZD" => "NZ$",
        "CHF" => "CHF ",
        "SEK" => "kr ",
        "NGN" => "₦",
        "BRL" => "R$",
        _ => return None,
    };
    Some(symbol)
}

/// Formats an amount with its currency symbol and thousands separators.
///
/// Unknown currencies fall back to the code as a prefix, e.g. `"XYZ 12.00"`.
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", round2(amount.abs()));
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{grouped}.{frac_part}"),
        None => format!("{sign}{currency} {grouped}.{frac_part}"),
    }
}

/// Formats a percentage without trailing zeros, e.g. `"8.25%"`.
pub fn format_percentage(value: Decimal) -> String {
    format!("{}%", value.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("Design", dec!(10), dec!(50)),
            LineItem::new("Hosting", dec!(1), dec!(25.50)),
        ]
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(calculate_subtotal(&items()).unwrap(), dec!(525.50));
        assert_eq!(calculate_subtotal(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_percentage_discount_and_tax_on_subtotal() {
        let totals = calculate_totals(
            &items(),
            &Adjustment::percentage(dec!(10)),
            &Adjustment::percentage(dec!(20)),
            TaxBase::Subtotal,
        )
        .unwrap();
        assert_eq!(totals.subtotal, dec!(525.50));
        assert_eq!(totals.discount, dec!(52.55));
        assert_eq!(totals.tax, dec!(105.10));
        assert_eq!(totals.total, dec!(578.05));
    }

    #[test]
    fn test_tax_after_discount() {
        let totals = calculate_totals(
            &items(),
            &Adjustment::flat(dec!(25.50)),
            &Adjustment::percentage(dec!(10)),
            TaxBase::AfterDiscount,
        )
        .unwrap();
        assert_eq!(totals.discount, dec!(25.50));
        assert_eq!(totals.tax, dec!(50.00));
        assert_eq!(totals.total, dec!(550.00));
    }

    #[test]
    fn test_flat_tax() {
        let totals = calculate_totals(
            &items(),
            &Adjustment::none(),
            &Adjustment::flat(dec!(12.345)),
            TaxBase::Subtotal,
        )
        .unwrap();
        assert_eq!(totals.tax, dec!(12.35));
        assert_eq!(totals.total, dec!(537.85));
    }

    #[test]
    fn test_total_never_negative() {
        assert_eq!(
            calculate_total(dec!(10), dec!(0), dec!(50)).unwrap(),
            Decimal::ZERO
        );
        assert_eq!(calculate_total(dec!(10), dec!(1), dec!(5)).unwrap(), dec!(6));

        let totals = calculate_totals(
            &items(),
            &Adjustment::flat(dec!(10000)),
            &Adjustment::percentage(dec!(10)),
            TaxBase::AfterDiscount,
        )
        .unwrap();
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = vec![LineItem::new("Huge", Decimal::MAX, dec!(2))];
        assert!(matches!(calculate_subtotal(&huge), Err(CoreError::Overflow(_))));

        let two = vec![
            LineItem::new("Half", Decimal::MAX, Decimal::ONE),
            LineItem::new("Half", Decimal::MAX, Decimal::ONE),
        ];
        assert!(calculate_subtotal(&two).is_err());

        let big = vec![LineItem::new("Big", Decimal::MAX, Decimal::ONE)];
        assert!(calculate_totals(
            &big,
            &Adjustment::none(),
            &Adjustment::percentage(dec!(50)),
            TaxBase::Subtotal
        )
        .is_err());
        assert!(calculate_total(Decimal::MAX, Decimal::MAX, Decimal::ZERO).is_err());
    }

    #[test]
    fn test_rounding_midpoint_away_from_zero() {
        assert_eq!(round2(dec!(0.125)), dec!(0.13));
        assert_eq!(round2(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round2(dec!(0.124)), dec!(0.12));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(1234567.5), "USD"), "$1,234,567.50");
        assert_eq!(format_money(dec!(999), "EUR"), "€999.00");
        assert_eq!(format_money(dec!(-12.3), "GBP"), "-£12.30");
        assert_eq!(format_money(dec!(1000), "XYZ"), "XYZ 1,000.00");
        assert_eq!(format_money(Decimal::ZERO, "USD"), "$0.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(dec!(8.250)), "8.25%");
        assert_eq!(format_percentage(dec!(10.00)), "10%");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "percentage".parse::<AdjustmentKind>().unwrap(),
            AdjustmentKind::Percentage
        );
        assert!("percent".parse::<AdjustmentKind>().is_err());
        assert_eq!(
            "after_discount".parse::<TaxBase>().unwrap(),
            TaxBase::AfterDiscount
        );
    }
}
