//! Dashboard summary.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tally_core::InvoiceStatus;

use crate::clients::Clients;
use crate::columns;
use crate::error::Result;
use crate::invoices::{InvoiceSummary, Invoices};

/// Number of invoices shown in the recent list.
pub const RECENT_INVOICES: i64 = 5;

/// A sum of invoice totals in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyTotal {
    pub currency: String,
    pub amount: Decimal,
}

/// Overview of a user's invoicing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Invoice count per status, every status present.
    pub status_counts: BTreeMap<&'static str, i64>,
    /// Sum of sent and overdue invoices, per currency.
    pub outstanding: Vec<CurrencyTotal>,
    /// Sum of paid invoices, per currency.
    pub paid: Vec<CurrencyTotal>,
    pub draft_count: i64,
    pub client_count: i64,
    pub recent: Vec<InvoiceSummary>,
}

#[derive(FromRow)]
struct TotalRow {
    id: i64,
    status: String,
    currency: String,
    total: String,
}

impl Dashboard {
    /// Computes the dashboard for `user_id`.
    pub async fn load(pool: &SqlitePool, user_id: i64) -> Result<Self> {
        let rows = sqlx::query_as::<_, TotalRow>(
            "SELECT id, status, currency, total FROM invoices WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut status_counts: BTreeMap<&'static str, i64> =
            InvoiceStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        let mut outstanding: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut paid: BTreeMap<String, Decimal> = BTreeMap::new();

        for row in rows {
            let status: InvoiceStatus = columns::tag("invoice", row.id, &row.status)?;
            let total = columns::amount("invoice", row.id, "total", &row.total)?;
            *status_counts.entry(status.as_str()).or_default() += 1;

            let bucket = if status.is_outstanding() {
                &mut outstanding
            } else if status == InvoiceStatus::Paid {
                &mut paid
            } else {
                continue;
            };
            *bucket.entry(row.currency).or_default() += total;
        }

        Ok(Self {
            draft_count: status_counts
                .get(InvoiceStatus::Draft.as_str())
                .copied()
                .unwrap_or_default(),
            status_counts,
            outstanding: into_totals(outstanding),
            paid: into_totals(paid),
            client_count: Clients::count(pool, user_id).await?,
            recent: Invoices::recent(pool, user_id, RECENT_INVOICES).await?,
        })
    }
}

fn into_totals(sums: BTreeMap<String, Decimal>) -> Vec<CurrencyTotal> {
    sums.into_iter()
        .map(|(currency, amount)| CurrencyTotal { currency, amount })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_totals_grouped_by_status_and_currency() {
        let pool = testing::pool().await;
        let user_id = testing::user(&pool, "owner@example.com").await;
        let client = testing::client(&pool, user_id, "Acme Corp").await;

        let mut ids = Vec::new();
        for (number, currency) in [("INV-0001", "USD"), ("INV-0002", "EUR"), ("INV-0003", "USD"), ("INV-0004", "USD")] {
            let mut input = testing::invoice_input(client.id, number);
            input.currency = currency.to_string();
            ids.push(Invoices::create(&pool, user_id, &input).await.unwrap().id);
        }
        Invoices::set_status(&pool, user_id, ids[0], InvoiceStatus::Sent).await.unwrap();
        Invoices::set_status(&pool, user_id, ids[1], InvoiceStatus::Sent).await.unwrap();
        Invoices::set_status(&pool, user_id, ids[2], InvoiceStatus::Paid).await.unwrap();

        let dashboard = Dashboard::load(&pool, user_id).await.unwrap();
        assert_eq!(dashboard.status_counts["sent"], 2);
        assert_eq!(dashboard.status_counts["paid"], 1);
        assert_eq!(dashboard.status_counts["overdue"], 0);
        assert_eq!(dashboard.draft_count, 1);
        assert_eq!(dashboard.client_count, 1);
        assert_eq!(
            dashboard.outstanding,
            vec![
                CurrencyTotal { currency: "EUR".to_string(), amount: dec!(472.50) },
                CurrencyTotal { currency: "USD".to_string(), amount: dec!(472.50) },
            ]
        );
        assert_eq!(
            dashboard.paid,
            vec![CurrencyTotal { currency: "USD".to_string(), amount: dec!(472.50) }]
        );
        assert_eq!(dashboard.recent.len(), 4);
    }

    #[tokio::test]
    async fn test_recent_is_capped() {
        let pool = testing::pool().await;
        let user_id = testing::user(&pool, "owner@example.com").await;
        let client = testing::client(&pool, user_id, "Acme Corp").await;
        for n in 1..=7 {
            let input = testing::invoice_input(client.id, &format!("INV-{n:04}"));
            Invoices::create(&pool, user_id, &input).await.unwrap();
        }

        let dashboard = Dashboard::load(&pool, user_id).await.unwrap();
        assert_eq!(dashboard.recent.len(), 5);
        assert_eq!(dashboard.recent[0].invoice_number, "INV-0007");
        assert!(dashboard.outstanding.is_empty());
    }
}
