//! Aggregation of an invoice and its related records into a printable document.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::business::Business;
use crate::client::Client;
use crate::error::{CoreError, Result};
use crate::gateway::{InstructionLine, PaymentAccount};
use crate::invoice::{DocumentTemplate, Invoice};
use crate::money::{format_money, format_percentage, Adjustment, AdjustmentKind};

/// Date format used on documents, e.g. `March 1, 2024`.
pub const DATE_FORMAT: &str = "%B %-d, %Y";

/// Formats a date for printing.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A name followed by contact lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyBlock {
    pub name: String,
    pub lines: Vec<String>,
}

/// One formatted line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRow {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub amount: String,
}

/// One row of the totals block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsRow {
    pub label: String,
    pub amount: String,
}

/// How to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentBlock {
    pub label: String,
    pub gateway: String,
    pub lines: Vec<InstructionLine>,
}

/// Everything a template needs to lay out an invoice, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDocument {
    pub template: DocumentTemplate,
    pub title: String,
    pub invoice_number: String,
    pub status: String,
    pub issue_date: String,
    pub due_date: String,
    pub currency: String,
    pub logo: Option<String>,
    pub signature: Option<String>,
    pub from: PartyBlock,
    pub bill_to: PartyBlock,
    pub rows: Vec<DocumentRow>,
    pub totals: Vec<TotalsRow>,
    pub amount_due: String,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub payment: Option<PaymentBlock>,
}

impl InvoiceDocument {
    /// Builds the document for `invoice`.
    ///
    /// Fails when a record does not belong to the invoice.
    pub fn assemble(
        invoice: &Invoice,
        business: &Business,
        client: &Client,
        account: Option<&PaymentAccount>,
    ) -> Result<Self> {
        if business.id != invoice.business_id || business.user_id != invoice.user_id {
            return Err(CoreError::Mismatch(format!(
                "business {} does not issue invoice {}",
                business.id, invoice.invoice_number
            )));
        }
        if client.id != invoice.client_id || client.user_id != invoice.user_id {
            return Err(CoreError::Mismatch(format!(
                "client {} is not billed by invoice {}",
                client.id, invoice.invoice_number
            )));
        }
        if let Some(account) = account {
            if Some(account.id) != invoice.payment_account_id || account.user_id != invoice.user_id {
                return Err(CoreError::Mismatch(format!(
                    "payment account {} is not attached to invoice {}",
                    account.id, invoice.invoice_number
                )));
            }
        }

        let currency = invoice.currency.as_str();
        let money = |amount: Decimal| format_money(amount, currency);

        let rows = invoice
            .line_items
            .iter()
            .map(|item| -> Result<DocumentRow> {
                Ok(DocumentRow {
                    description: item.description.clone(),
                    quantity: item.quantity.normalize().to_string(),
                    unit_price: money(item.unit_price),
                    amount: money(item.total()?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let stored = invoice.totals();
        let mut totals = vec![TotalsRow {
            label: "Subtotal".to_string(),
            amount: money(stored.subtotal),
        }];
        if !stored.discount.is_zero() {
            totals.push(TotalsRow {
                label: adjustment_label("Discount", &invoice.discount),
                amount: format!("-{}", money(stored.discount)),
            });
        }
        if !stored.tax.is_zero() {
            totals.push(TotalsRow {
                label: adjustment_label("Tax", &invoice.tax),
                amount: money(stored.tax),
            });
        }
        totals.push(TotalsRow {
            label: "Total".to_string(),
            amount: money(stored.total),
        });

        Ok(Self {
            template: invoice.template,
            title: "Invoice".to_string(),
            invoice_number: invoice.invoice_number.clone(),
            status: invoice.status.label().to_string(),
            issue_date: format_date(invoice.issue_date),
            due_date: format_date(invoice.due_date),
            currency: invoice.currency.clone(),
            logo: business.logo.clone(),
            signature: business.signature.clone(),
            from: business_block(business),
            bill_to: client_block(client),
            rows,
            totals,
            amount_due: money(stored.total),
            notes: invoice.notes.clone().filter(|n| !n.trim().is_empty()),
            terms: invoice.terms.clone().filter(|t| !t.trim().is_empty()),
            payment: account.map(|account| PaymentBlock {
                label: account.label.clone(),
                gateway: account.gateway.name().to_string(),
                lines: account.data.instructions(),
            }),
        })
    }
}

fn adjustment_label(name: &str, adjustment: &Adjustment) -> String {
    match adjustment.kind {
        AdjustmentKind::Percentage => format!("{name} ({})", format_percentage(adjustment.value)),
        AdjustmentKind::Flat => name.to_string(),
    }
}

fn business_block(business: &Business) -> PartyBlock {
    let mut lines: Vec<String> = business.address_lines().into_iter().map(String::from).collect();
    lines.push(business.email.clone());
    lines.extend(business.phone.clone());
    lines.extend(business.tax_id.as_ref().map(|id| format!("Tax ID: {id}")));
    PartyBlock {
        name: business.name.clone(),
        lines,
    }
}

fn client_block(client: &Client) -> PartyBlock {
    let mut lines = Vec::new();
    if !client.contact_name.trim().is_empty() {
        lines.push(format!("Attn: {}", client.contact_name));
    }
    lines.extend(client.address_lines().into_iter().map(String::from));
    lines.push(client.email.clone());
    lines.extend(client.phone.clone());
    lines.extend(client.tax_id.as_ref().map(|id| format!("Tax ID: {id}")));
    PartyBlock {
        name: client.business_name.clone(),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{AccountData, GatewayType, OtherData};
    use crate::invoice::InvoiceStatus;
    use crate::line_item::LineItem;
    use crate::money::TaxBase;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn records() -> (Invoice, Business, Client, PaymentAccount) {
        let now = Utc::now();
        let business = Business {
            id: 2,
            user_id: 1,
            name: "Acme Studio".to_string(),
            email: "billing@acme.test".to_string(),
            phone: None,
            address: "1 Main St\n\nSpringfield".to_string(),
            tax_id: Some("US123".to_string()),
            logo: None,
            signature: None,
            default_currency: "USD".to_string(),
            invoice_prefix: "INV-".to_string(),
            created_at: now,
            updated_at: now,
        };
        let client = Client {
            id: 3,
            user_id: 1,
            business_name: "Globex".to_string(),
            contact_name: "Hank Scorpio".to_string(),
            email: "ap@globex.test".to_string(),
            phone: Some("555-0100".to_string()),
            address: "Cypress Creek".to_string(),
            tax_id: None,
            notes: Some("never printed".to_string()),
            created_at: now,
            updated_at: now,
        };
        let account = PaymentAccount {
            id: 4,
            user_id: 1,
            gateway: GatewayType::Other,
            label: "Cheque".to_string(),
            data: AccountData::Other(OtherData {
                instructions: "Mail a cheque".to_string(),
            }),
            is_default: true,
            created_at: now,
            updated_at: now,
        };
        let line_items = vec![
            LineItem::new("Design", dec!(10), dec!(50)),
            LineItem::new("Hosting", dec!(1.50), dec!(1000)),
        ];
        let discount = Adjustment::percentage(dec!(10));
        let tax = Adjustment::flat(dec!(20));
        let totals =
            crate::money::calculate_totals(&line_items, &discount, &tax, TaxBase::Subtotal).unwrap();
        let invoice = Invoice {
            id: 9,
            user_id: 1,
            business_id: 2,
            client_id: 3,
            invoice_number: "INV-0009".to_string(),
            status: InvoiceStatus::Sent,
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            currency: "USD".to_string(),
            line_items,
            discount,
            tax,
            tax_base: TaxBase::Subtotal,
            subtotal: totals.subtotal,
            discount_amount: totals.discount,
            tax_amount: totals.tax,
            total: totals.total,
            notes: Some(" ".to_string()),
            terms: Some("Net 30".to_string()),
            payment_account_id: Some(4),
            template: DocumentTemplate::Modern,
            sent_at: Some(now),
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        (invoice, business, client, account)
    }

    #[test]
    fn test_assemble() {
        let (invoice, business, client, account) = records();
        let doc = InvoiceDocument::assemble(&invoice, &business, &client, Some(&account)).unwrap();

        assert_eq!(doc.issue_date, "March 1, 2024");
        assert_eq!(doc.status, "Sent");
        assert_eq!(doc.from.lines, vec!["1 Main St", "Springfield", "billing@acme.test", "Tax ID: US123"]);
        assert_eq!(doc.bill_to.lines[0], "Attn: Hank Scorpio");
        assert!(!doc.bill_to.lines.iter().any(|l| l.contains("never printed")));

        assert_eq!(doc.rows[1].quantity, "1.5");
        assert_eq!(doc.rows[1].amount, "$1,500.00");

        let labels: Vec<_> = doc.totals.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, vec!["Subtotal", "Discount (10%)", "Tax", "Total"]);
        assert_eq!(doc.totals[1].amount, "-$200.00");
        assert_eq!(doc.amount_due, "$1,820.00");

        assert_eq!(doc.notes, None);
        let payment = doc.payment.unwrap();
        assert_eq!(payment.gateway, "Other");
        assert_eq!(payment.lines[0].value, "Mail a cheque");
    }

    #[test]
    fn test_assemble_rejects_foreign_records() {
        let (invoice, business, mut client, account) = records();
        client.user_id = 2;
        assert!(matches!(
            InvoiceDocument::assemble(&invoice, &business, &client, Some(&account)),
            Err(CoreError::Mismatch(_))
        ));

        let (mut invoice, business, client, account) = records();
        invoice.payment_account_id = None;
        assert!(InvoiceDocument::assemble(&invoice, &business, &client, Some(&account)).is_err());
        assert!(InvoiceDocument::assemble(&invoice, &business, &client, None).is_ok());
    }
}
