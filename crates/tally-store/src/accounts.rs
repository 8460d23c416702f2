//! Payment accounts.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Row, Sqlite, SqlitePool, Transaction};
use tally_core::{AccountData, GatewayType, PaymentAccount};
use tally_forms::{validate_account_data, CleanedAccount};
use tracing::{info, warn};

use crate::columns;
use crate::error::{Result, StoreError};

#[derive(FromRow)]
struct AccountRow {
    id: i64,
    user_id: i64,
    gateway: String,
    label: String,
    account_data: String,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for PaymentAccount {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self> {
        let gateway: GatewayType = columns::tag("payment account", row.id, &row.gateway)?;
        let data = AccountData::decode_str(gateway, &row.account_data)
            .map_err(|e| StoreError::corrupt("payment account", row.id, e))?;
        let (_, errors) = validate_account_data(data.clone());
        if !errors.is_empty() {
            warn!(account_id = row.id, "stored account data fails validation: {}", errors);
            return Err(StoreError::corrupt("payment account", row.id, errors));
        }

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            gateway,
            label: row.label,
            data,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Access to the `payment_accounts` table, scoped to one owner.
pub struct PaymentAccounts;

impl PaymentAccounts {
    /// Lists accounts, the default first.
    pub async fn list(pool: &SqlitePool, user_id: i64) -> Result<Vec<PaymentAccount>> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM payment_accounts WHERE user_id = ? ORDER BY is_default DESC, label COLLATE NOCASE, id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(PaymentAccount::try_from)
        .collect()
    }

    /// Finds an account owned by `user_id`.
    pub async fn get(pool: &SqlitePool, user_id: i64, id: i64) -> Result<PaymentAccount> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM payment_accounts WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("payment account"))?
        .try_into()
    }

    /// Returns the user's default account, if any.
    pub async fn find_default(pool: &SqlitePool, user_id: i64) -> Result<Option<PaymentAccount>> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM payment_accounts WHERE user_id = ? AND is_default",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(PaymentAccount::try_from)
        .transpose()
    }

    /// Inserts an account. A default account replaces the previous default.
    pub async fn create(pool: &SqlitePool, user_id: i64, input: &CleanedAccount) -> Result<PaymentAccount> {
        let now = Utc::now();
        let data = input.data.encode()?;

        let mut tx = pool.begin().await?;
        if input.is_default {
            clear_default(&mut tx, user_id).await?;
        }
        let result = sqlx::query(
            r"
            INSERT INTO payment_accounts (user_id, gateway, label, account_data, is_default,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(user_id)
        .bind(input.gateway.as_str())
        .bind(&input.label)
        .bind(&data)
        .bind(input.is_default)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let id = result.last_insert_rowid();
        info!(user_id, account_id = id, gateway = %input.gateway, "payment account created");
        Self::get(pool, user_id, id).await
    }

    /// Replaces an account's gateway, label and data.
    pub async fn update(
        pool: &SqlitePool,
        user_id: i64,
        id: i64,
        input: &CleanedAccount,
    ) -> Result<PaymentAccount> {
        let data = input.data.encode()?;

        let mut tx = pool.begin().await?;
        if input.is_default {
            clear_default(&mut tx, user_id).await?;
        }
        let result = sqlx::query(
            r"
            UPDATE payment_accounts
            SET gateway = ?, label = ?, account_data = ?, is_default = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            ",
        )
        .bind(input.gateway.as_str())
        .bind(&input.label)
        .bind(&data)
        .bind(input.is_default)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound("payment account"));
        }
        tx.commit().await?;

        Self::get(pool, user_id, id).await
    }

    /// Makes an account the default, unsetting any other default of the user.
    pub async fn set_default(pool: &SqlitePool, user_id: i64, id: i64) -> Result<PaymentAccount> {
        let mut tx = pool.begin().await?;
        clear_default(&mut tx, user_id).await?;
        let result = sqlx::query(
            "UPDATE payment_accounts SET is_default = TRUE, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound("payment account"));
        }
        tx.commit().await?;

        info!(user_id, account_id = id, "default payment account changed");
        Self::get(pool, user_id, id).await
    }

    /// Deletes an account that no invoice refers to.
    pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> Result<()> {
        let account = Self::get(pool, user_id, id).await?;
        let invoices: i64 = sqlx::query("SELECT COUNT(*) FROM invoices WHERE payment_account_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?
            .get(0);
        if invoices > 0 {
            return Err(StoreError::Conflict(format!(
                "{} is used by {} invoice(s) and cannot be deleted.",
                account.label, invoices
            )));
        }

        sqlx::query("DELETE FROM payment_accounts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

async fn clear_default(tx: &mut Transaction<'_, Sqlite>, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE payment_accounts SET is_default = FALSE WHERE user_id = ? AND is_default")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use crate::Invoices;

    #[tokio::test]
    async fn test_setting_default_unsets_previous() {
        let pool = testing::pool().await;
        let user_id = testing::user(&pool, "owner@example.com").await;

        let first = PaymentAccounts::create(&pool, user_id, &testing::sepa_account("Main", true))
            .await
            .unwrap();
        let second = PaymentAccounts::create(&pool, user_id, &testing::sepa_account("Backup", false))
            .await
            .unwrap();
        assert!(first.is_default);
        assert!(!second.is_default);

        PaymentAccounts::set_default(&pool, user_id, second.id).await.unwrap();
        let accounts = PaymentAccounts::list(&pool, user_id).await.unwrap();
        let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).map(|a| a.id).collect();
        assert_eq!(defaults, vec![second.id]);
        assert_eq!(accounts[0].id, second.id);

        let third = PaymentAccounts::create(&pool, user_id, &testing::sepa_account("New", true))
            .await
            .unwrap();
        let default = PaymentAccounts::find_default(&pool, user_id).await.unwrap().unwrap();
        assert_eq!(default.id, third.id);
    }

    #[tokio::test]
    async fn test_defaults_are_per_user() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "owner@example.com").await;
        let other = testing::user(&pool, "other@example.com").await;

        let mine = PaymentAccounts::create(&pool, owner, &testing::sepa_account("Main", true))
            .await
            .unwrap();
        PaymentAccounts::create(&pool, other, &testing::sepa_account("Theirs", true))
            .await
            .unwrap();

        assert!(PaymentAccounts::get(&pool, owner, mine.id).await.unwrap().is_default);
        assert!(matches!(
            PaymentAccounts::set_default(&pool, other, mine.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(PaymentAccounts::get(&pool, owner, mine.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn test_account_used_by_invoice_cannot_be_deleted() {
        let pool = testing::pool().await;
        let user_id = testing::user(&pool, "owner@example.com").await;
        let client = testing::client(&pool, user_id, "Acme Corp").await;
        let account = PaymentAccounts::create(&pool, user_id, &testing::sepa_account("Main", false))
            .await
            .unwrap();

        let mut input = testing::invoice_input(client.id, "INV-0001");
        input.payment_account_id = Some(account.id);
        Invoices::create(&pool, user_id, &input).await.unwrap();

        let err = PaymentAccounts::delete(&pool, user_id, account.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let unused = PaymentAccounts::create(&pool, user_id, &testing::sepa_account("Spare", false))
            .await
            .unwrap();
        PaymentAccounts::delete(&pool, user_id, unused.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_stored_data_is_corrupt() {
        let pool = testing::pool().await;
        let user_id = testing::user(&pool, "owner@example.com").await;
        let account = PaymentAccounts::create(&pool, user_id, &testing::sepa_account("Main", false))
            .await
            .unwrap();
        assert_eq!(account.data.gateway(), GatewayType::Sepa);

        sqlx::query("UPDATE payment_accounts SET account_data = ? WHERE id = ?")
            .bind(r#"{"account_holder":"Studio North","iban":"DE00 0000 0000 0000 0000 00"}"#)
            .bind(account.id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(
            PaymentAccounts::get(&pool, user_id, account.id).await,
            Err(StoreError::Corrupt { .. })
        ));

        sqlx::query("UPDATE payment_accounts SET account_data = ? WHERE id = ?")
            .bind(r#"{"account_holder":"Studio North","iban":"DE89370400440532013000","colour":"red"}"#)
            .bind(account.id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(
            PaymentAccounts::list(&pool, user_id).await,
            Err(StoreError::Corrupt { .. })
        ));
    }
}
