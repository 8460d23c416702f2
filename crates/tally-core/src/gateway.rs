//! Payment gateways and their account data.
//!
//! Each gateway carries its own set of account fields. The data is stored as
//! JSON next to the account and decoded back into the typed struct for its
//! gateway on every read, so a row whose JSON drifted from the schema is
//! detected instead of silently rendered.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Kind of payment account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayType {
    /// US bank transfer (ACH).
    BankUs,
    /// UK bank transfer.
    BankUk,
    /// SEPA transfer.
    Sepa,
    /// International wire.
    Swift,
    /// Stripe card payments.
    Stripe,
    /// PayPal.
    Paypal,
    /// Wise.
    Wise,
    /// Anything else, described in free text.
    Other,
}

impl GatewayType {
    /// Every gateway.
    pub const ALL: [Self; 8] = [
        Self::BankUs,
        Self::BankUk,
        Self::Sepa,
        Self::Swift,
        Self::Stripe,
        Self::Paypal,
        Self::Wise,
        Self::Other,
    ];

    /// Returns the storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankUs => "bank_us",
            Self::BankUk => "bank_uk",
            Self::Sepa => "sepa",
            Self::Swift => "swift",
            Self::Stripe => "stripe",
            Self::Paypal => "paypal",
            Self::Wise => "wise",
            Self::Other => "other",
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BankUs => "US bank transfer (ACH)",
            Self::BankUk => "UK bank transfer",
            Self::Sepa => "SEPA transfer",
            Self::Swift => "International wire",
            Self::Stripe => "Stripe",
            Self::Paypal => "PayPal",
            Self::Wise => "Wise",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for GatewayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|gateway| gateway.as_str() == s)
            .ok_or_else(|| CoreError::InvalidGateway(s.to_string()))
    }
}

/// Kind of US bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsAccountType {
    Checking,
    Savings,
}

impl UsAccountType {
    fn label(self) -> &'static str {
        match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BankUsData {
    pub account_holder: String,
    pub bank_name: String,
    pub routing_number: String,
    pub account_number: String,
    pub account_type: UsAccountType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BankUkData {
    pub account_holder: String,
    pub bank_name: String,
    pub sort_code: String,
    pub account_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SepaData {
    pub account_holder: String,
    pub iban: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwiftData {
    pub account_holder: String,
    pub bank_name: String,
    pub swift_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StripeData {
    pub account_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaypalData {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paypal_me: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WiseData {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtherData {
    pub instructions: String,
}

/// Gateway-specific account data.
///
/// Serialized untagged: the gateway is stored in its own column, and
/// [`AccountData::decode`] picks the variant from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AccountData {
    BankUs(BankUsData),
    BankUk(BankUkData),
    Sepa(SepaData),
    Swift(SwiftData),
    Stripe(StripeData),
    Paypal(PaypalData),
    Wise(WiseData),
    Other(OtherData),
}

/// One labelled line of payment instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionLine {
    pub label: String,
    pub value: String,
}

impl InstructionLine {
    fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

impl AccountData {
    /// Decodes `value` as the account data of `gateway`.
    ///
    /// Missing required fields and unknown fields are both errors.
    pub fn decode(gateway: GatewayType, value: serde_json::Value) -> Result<Self> {
        let data = match gateway {
            GatewayType::BankUs => Self::BankUs(serde_json::from_value(value)?),
            GatewayType::BankUk => Self::BankUk(serde_json::from_value(value)?),
            GatewayType::Sepa => Self::Sepa(serde_json::from_value(value)?),
            GatewayType::Swift => Self::Swift(serde_json::from_value(value)?),
            GatewayType::Stripe => Self::Stripe(serde_json::from_value(value)?),
            GatewayType::Paypal => Self::Paypal(serde_json::from_value(value)?),
            GatewayType::Wise => Self::Wise(serde_json::from_value(value)?),
            GatewayType::Other => Self::Other(serde_json::from_value(value)?),
        };
        Ok(data)
    }

    /// Decodes the JSON column of a stored account.
    pub fn decode_str(gateway: GatewayType, json: &str) -> Result<Self> {
        Self::decode(gateway, serde_json::from_str(json)?)
    }

    /// Encodes the data for the JSON column.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns the gateway this data belongs to.
    pub fn gateway(&self) -> GatewayType {
        match self {
            Self::BankUs(_) => GatewayType::BankUs,
            Self::BankUk(_) => GatewayType::BankUk,
            Self::Sepa(_) => GatewayType::Sepa,
            Self::Swift(_) => GatewayType::Swift,
            Self::Stripe(_) => GatewayType::Stripe,
            Self::Paypal(_) => GatewayType::Paypal,
            Self::Wise(_) => GatewayType::Wise,
            Self::Other(_) => GatewayType::Other,
        }
    }

    /// Returns the lines printed under "Payment details" on a document.
    pub fn instructions(&self) -> Vec<InstructionLine> {
        let mut lines = Lines::default();
        match self {
            Self::BankUs(d) => {
                lines.push("Account holder", &d.account_holder);
                lines.push("Bank", &d.bank_name);
                lines.push("Routing number", &d.routing_number);
                lines.push("Account number", &d.account_number);
                lines.push("Account type", d.account_type.label());
            }
            Self::BankUk(d) => {
                lines.push("Account holder", &d.account_holder);
                lines.push("Bank", &d.bank_name);
                lines.push("Sort code", &d.sort_code);
                lines.push("Account number", &d.account_number);
            }
            Self::Sepa(d) => {
                lines.push("Account holder", &d.account_holder);
                lines.push("IBAN", &group_iban(&d.iban));
                lines.push_opt("BIC", d.bic.as_deref());
                lines.push_opt("Bank", d.bank_name.as_deref());
            }
            Self::Swift(d) => {
                lines.push("Account holder", &d.account_holder);
                lines.push("Bank", &d.bank_name);
                lines.push("SWIFT/BIC", &d.swift_code);
                lines.push_opt("IBAN", d.iban.as_deref().map(group_iban).as_deref());
                lines.push_opt("Account number", d.account_number.as_deref());
                lines.push_opt("Bank address", d.bank_address.as_deref());
            }
            Self::Stripe(d) => {
                lines.push("Email", &d.account_email);
                lines.push_opt("Pay online", d.payment_link.as_deref());
            }
            Self::Paypal(d) => {
                lines.push("PayPal", &d.email);
                let link = d.paypal_me.as_ref().map(|handle| format!("paypal.me/{handle}"));
                lines.push_opt("PayPal.me", link.as_deref());
            }
            Self::Wise(d) => {
                lines.push("Wise", &d.email);
                lines.push_opt("Account ID", d.account_id.as_deref());
            }
            Self::Other(d) => lines.push("Instructions", &d.instructions),
        }
        lines.0
    }
}

#[derive(Default)]
struct Lines(Vec<InstructionLine>);

impl Lines {
    fn push(&mut self, label: &str, value: &str) {
        self.0.push(InstructionLine::new(label, value));
    }

    fn push_opt(&mut self, label: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.push(label, value);
        }
    }
}

/// Formats an IBAN in groups of four for printing.
pub fn group_iban(iban: &str) -> String {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).to_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A user's payment account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentAccount {
    /// Primary key.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Gateway tag.
    pub gateway: GatewayType,
    /// Name the user picks the account by.
    pub label: String,
    /// Gateway-specific data.
    pub data: AccountData,
    /// Whether new invoices preselect this account.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
