use std::sync::LazyLock;

use serde::Deserialize;
use tally_core::gateway::{
    BankUkData, BankUsData, OtherData, PaypalData, SepaData, StripeData, SwiftData, WiseData,
};
use tally_core::{AccountData, GatewayType};

use crate::banking::{
    compact, is_digits, is_valid_bic, is_valid_iban, is_valid_routing_number, is_valid_sort_code,
};
use crate::error::ValidationErrors;
use crate::form::{Fields, Form};
use crate::validation::{Email, MaxLength, Pattern, Required, Url};

static PAYPAL_ME: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new(
        r"^[A-Za-z0-9]{1,20}$",
        "Enter your PayPal.me handle without the link.",
    )
    .expect("paypal.me pattern compiles")
});

/// Payment account form.
///
/// `data` is checked against the schema of `gateway`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentAccountInput {
    pub gateway: GatewayType,
    pub label: String,
    pub data: serde_json::Value,
    #[serde(default)]
    pub is_default: bool,
}

/// A validated payment account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedAccount {
    pub gateway: GatewayType,
    pub label: String,
    pub data: AccountData,
    pub is_default: bool,
}

impl Form for PaymentAccountInput {
    type Cleaned = CleanedAccount;

    fn clean(self) -> Result<CleanedAccount, ValidationErrors> {
        let mut fields = Fields::new();
        let label = fields.text("label", &self.label, &[&Required::new("Label"), &MaxLength::new("Label", 100)]);

        let data = match AccountData::decode(self.gateway, self.data) {
            Ok(data) => {
                let (data, errors) = validate_account_data(data);
                fields.merge("data.", errors);
                data
            }
            Err(e) => {
                let mut errors = fields.finish(()).err().unwrap_or_default();
                errors.add(
                    "data",
                    format!("Account details do not match {}: {}", self.gateway.name(), e),
                );
                return Err(errors);
            }
        };

        fields.finish(CleanedAccount {
            gateway: self.gateway,
            label,
            data,
            is_default: self.is_default,
        })
    }
}

fn holder(f: &mut Fields, value: &str) -> String {
    f.text(
        "account_holder",
        value,
        &[&Required::new("Account holder"), &MaxLength::new("Account holder", 200)],
    )
}

fn bank(f: &mut Fields, value: &str) -> String {
    f.text("bank_name", value, &[&Required::new("Bank name"), &MaxLength::new("Bank name", 200)])
}

/// Normalizes gateway data and checks its content.
///
/// Returns the normalized data along with any field errors, keyed by the
/// gateway field name.
pub fn validate_account_data(data: AccountData) -> (AccountData, ValidationErrors) {
    let mut f = Fields::new();

    let data = match data {
        AccountData::BankUs(d) => {
            let account_holder = holder(&mut f, &d.account_holder);
            let bank_name = bank(&mut f, &d.bank_name);
            let routing_number = compact(&d.routing_number);
            f.check(
                "routing_number",
                is_valid_routing_number(&routing_number),
                "Enter a valid 9-digit ABA routing number.",
            );
            let account_number = compact(&d.account_number);
            f.check(
                "account_number",
                is_digits(&account_number, 4, 17),
                "Account number must be 4 to 17 digits.",
            );
            AccountData::BankUs(BankUsData {
                account_holder,
                bank_name,
                routing_number,
                account_number,
                account_type: d.account_type,
            })
        }
        AccountData::BankUk(d) => {
            let account_holder = holder(&mut f, &d.account_holder);
            let bank_name = bank(&mut f, &d.bank_name);
            let sort_code = d.sort_code.trim().to_string();
            f.check("sort_code", is_valid_sort_code(&sort_code), "Enter a sort code like 12-34-56.");
            let account_number = compact(&d.account_number);
            f.check(
                "account_number",
                is_digits(&account_number, 8, 8),
                "Account number must be 8 digits.",
            );
            AccountData::BankUk(BankUkData {
                account_holder,
                bank_name,
                sort_code,
                account_number,
            })
        }
        AccountData::Sepa(d) => {
            let account_holder = holder(&mut f, &d.account_holder);
            let iban = compact(&d.iban).to_ascii_uppercase();
            f.check("iban", is_valid_iban(&iban), "Enter a valid IBAN.");
            AccountData::Sepa(SepaData {
                account_holder,
                iban,
                bic: normalize_bic(&mut f, "bic", d.bic.as_deref()),
                bank_name: f.optional(
                    "bank_name",
                    d.bank_name.as_deref(),
                    &[&MaxLength::new("Bank name", 200)],
                ),
            })
        }
        AccountData::Swift(d) => {
            let account_holder = holder(&mut f, &d.account_holder);
            let bank_name = bank(&mut f, &d.bank_name);
            let swift_code = normalize_bic(&mut f, "swift_code", Some(&d.swift_code));
            if swift_code.is_none() {
                f.add("swift_code", "SWIFT code is required.");
            }
            let iban = d
                .iban
                .as_deref()
                .map(|v| compact(v).to_ascii_uppercase())
                .filter(|v| !v.is_empty());
            if let Some(iban) = &iban {
                f.check("iban", is_valid_iban(iban), "Enter a valid IBAN.");
            }
            let account_number = f.optional(
                "account_number",
                d.account_number.as_deref(),
                &[&MaxLength::new("Account number", 34)],
            );
            f.check(
                "account_number",
                iban.is_some() || account_number.is_some(),
                "Provide an account number or an IBAN.",
            );
            AccountData::Swift(SwiftData {
                account_holder,
                bank_name,
                swift_code: swift_code.unwrap_or_default(),
                account_number,
                iban,
                bank_address: f.optional(
                    "bank_address",
                    d.bank_address.as_deref(),
                    &[&MaxLength::new("Bank address", 500)],
                ),
            })
        }
        AccountData::Stripe(d) => AccountData::Stripe(StripeData {
            account_email: f.text(
                "account_email",
                &d.account_email,
                &[&Required::new("Account email"), &Email],
            ),
            payment_link: f.optional("payment_link", d.payment_link.as_deref(), &[&Url::https()]),
        }),
        AccountData::Paypal(d) => {
            let email = f.text("email", &d.email, &[&Required::new("PayPal email"), &Email]);
            let handle = d
                .paypal_me
                .as_deref()
                .map(|h| h.trim().trim_start_matches('@').to_string());
            let paypal_me = f.optional("paypal_me", handle.as_deref(), &[&*PAYPAL_ME]);
            AccountData::Paypal(PaypalData { email, paypal_me })
        }
        AccountData::Wise(d) => AccountData::Wise(WiseData {
            email: f.text("email", &d.email, &[&Required::new("Wise email"), &Email]),
            account_id: f.optional(
                "account_id",
                d.account_id.as_deref(),
                &[&MaxLength::new("Account ID", 64)],
            ),
        }),
        AccountData::Other(d) => AccountData::Other(OtherData {
            instructions: f.text(
                "instructions",
                &d.instructions,
                &[&Required::new("Instructions"), &MaxLength::new("Instructions", 1000)],
            ),
        }),
    };

    let errors = f.finish(()).err().unwrap_or_default();
    (data, errors)
}

fn normalize_bic(f: &mut Fields, name: &str, value: Option<&str>) -> Option<String> {
    let bic = value.map(|v| compact(v).to_ascii_uppercase()).filter(|v| !v.is_empty())?;
    f.check(name, is_valid_bic(&bic), "Enter a valid 8 or 11 character BIC.");
    Some(bic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(gateway: GatewayType, data: serde_json::Value) -> PaymentAccountInput {
        PaymentAccountInput {
            gateway,
            label: "Main".to_string(),
            data,
            is_default: false,
        }
    }

    #[test]
    fn test_sepa_is_normalized() {
        let cleaned = input(
            GatewayType::Sepa,
            json!({ "account_holder": "Ada", "iban": "de89 3704 0044 0532 0130 00", "bic": "cobadeffxxx" }),
        )
        .clean()
        .unwrap();
        match cleaned.data {
            AccountData::Sepa(d) => {
                assert_eq!(d.iban, "DE89370400440532013000");
                assert_eq!(d.bic.as_deref(), Some("COBADEFFXXX"));
                assert_eq!(d.bank_name, None);
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_iban() {
        let errors = input(
            GatewayType::Sepa,
            json!({ "account_holder": "Ada", "iban": "DE89 3704 0044 0532 0130 01" }),
        )
        .clean()
        .unwrap_err();
        assert_eq!(errors.get("data.iban"), vec!["Enter a valid IBAN."]);
    }

    #[test]
    fn test_rejects_bad_routing_and_sort_codes() {
        let errors = input(
            GatewayType::BankUs,
            json!({
                "account_holder": "Acme LLC",
                "bank_name": "First Bank",
                "routing_number": "123456789",
                "account_number": "12",
                "account_type": "checking"
            }),
        )
        .clean()
        .unwrap_err();
        assert!(errors.has("data.routing_number"));
        assert!(errors.has("data.account_number"));

        let errors = input(
            GatewayType::BankUk,
            json!({
                "account_holder": "Acme Ltd",
                "bank_name": "Barclays",
                "sort_code": "12-345-6",
                "account_number": "12345678"
            }),
        )
        .clean()
        .unwrap_err();
        assert_eq!(errors.get("data.sort_code"), vec!["Enter a sort code like 12-34-56."]);
    }

    #[test]
    fn test_swift_needs_account_or_iban() {
        let errors = input(
            GatewayType::Swift,
            json!({ "account_holder": "Acme", "bank_name": "HSBC", "swift_code": "HSBCHKHH" }),
        )
        .clean()
        .unwrap_err();
        assert_eq!(errors.message(), "Provide an account number or an IBAN.");
    }

    #[test]
    fn test_schema_mismatch() {
        let errors = input(GatewayType::Paypal, json!({ "iban": "DE89370400440532013000" }))
            .clean()
            .unwrap_err();
        assert!(errors.has("data"));
    }

    #[test]
    fn test_paypal_handle() {
        let cleaned = input(
            GatewayType::Paypal,
            json!({ "email": "pay@acme.test", "paypal_me": "@acmestudio" }),
        )
        .clean()
        .unwrap();
        assert_eq!(
            cleaned.data,
            AccountData::Paypal(PaypalData {
                email: "pay@acme.test".to_string(),
                paypal_me: Some("acmestudio".to_string()),
            })
        );

        let errors = input(
            GatewayType::Paypal,
            json!({ "email": "pay@acme.test", "paypal_me": "https://paypal.me/acmestudio" }),
        )
        .clean()
        .unwrap_err();
        assert_eq!(
            errors.get("data.paypal_me"),
            vec!["Enter your PayPal.me handle without the link."]
        );
    }
}
