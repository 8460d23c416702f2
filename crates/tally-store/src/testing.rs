//! Fixtures shared by the repository tests.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tally_auth::User;
use tally_core::{Adjustment, Client, DocumentTemplate, GatewayType, LineItem, TaxBase};
use tally_forms::{BusinessInput, CleanedInvoice, ClientInput, Form, InvoiceInput, PaymentAccountInput};

use crate::{create_tables, Businesses, Clients};

pub(crate) async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    create_tables(&pool).await.unwrap();
    pool
}

/// Creates a user with a business profile and returns its id.
pub(crate) async fn user(pool: &SqlitePool, email: &str) -> i64 {
    let mut user = User::create("Owner", email, "correct horse").unwrap();
    user.save(pool).await.unwrap();

    let business = BusinessInput {
        name: "Studio North".to_string(),
        email: email.to_string(),
        phone: None,
        address: "1 Main St\nSpringfield".to_string(),
        tax_id: None,
        logo: None,
        signature: None,
        default_currency: "usd".to_string(),
        invoice_prefix: None,
    }
    .clean()
    .unwrap();
    Businesses::save(pool, user.id, &business).await.unwrap();
    user.id
}

pub(crate) async fn client(pool: &SqlitePool, user_id: i64, name: &str) -> Client {
    let input = ClientInput {
        business_name: name.to_string(),
        contact_name: "Jo Bloggs".to_string(),
        email: "billing@example.com".to_string(),
        phone: None,
        address: String::new(),
        tax_id: None,
        notes: None,
    };
    Clients::create(pool, user_id, &input.clean().unwrap()).await.unwrap()
}

pub(crate) fn invoice_input(client_id: i64, number: &str) -> CleanedInvoice {
    InvoiceInput {
        client_id: Some(client_id),
        invoice_number: number.to_string(),
        issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        currency: "USD".to_string(),
        line_items: vec![LineItem::new("Design", dec!(10), dec!(50))],
        discount: Adjustment::percentage(dec!(10)),
        tax: Adjustment::percentage(dec!(5)),
        tax_base: TaxBase::AfterDiscount,
        notes: None,
        terms: Some("Net 14".to_string()),
        payment_account_id: None,
        template: DocumentTemplate::Modern,
    }
    .clean()
    .unwrap()
}

pub(crate) fn sepa_account(label: &str, is_default: bool) -> tally_forms::CleanedAccount {
    PaymentAccountInput {
        gateway: GatewayType::Sepa,
        label: label.to_string(),
        data: json!({
            "account_holder": "Studio North",
            "iban": "DE89 3704 0044 0532 0130 00",
        }),
        is_default,
    }
    .clean()
    .unwrap()
}
