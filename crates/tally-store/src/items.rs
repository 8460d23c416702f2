//! Catalog items.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tally_core::Item;
use tally_forms::ItemInput;
use tracing::info;

use crate::columns;
use crate::error::{Result, StoreError};

#[derive(FromRow)]
struct ItemRow {
    id: i64,
    user_id: i64,
    name: String,
    description: Option<String>,
    unit_price: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(Self {
            unit_price: columns::amount("item", row.id, "unit_price", &row.unit_price)?,
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Access to the `items` table, scoped to one owner.
pub struct Items;

impl Items {
    /// Lists items by name, optionally filtered by name or description.
    pub async fn list(pool: &SqlitePool, user_id: i64, search: Option<&str>) -> Result<Vec<Item>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        sqlx::query_as::<_, ItemRow>(
            r"
            SELECT * FROM items
            WHERE user_id = ?1
              AND (?2 IS NULL
                   OR instr(lower(name), lower(?2)) > 0
                   OR instr(lower(coalesce(description, '')), lower(?2)) > 0)
            ORDER BY name COLLATE NOCASE, id
            ",
        )
        .bind(user_id)
        .bind(search)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Item::try_from)
        .collect()
    }

    /// Finds an item owned by `user_id`.
    pub async fn get(pool: &SqlitePool, user_id: i64, id: i64) -> Result<Item> {
        sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("item"))?
            .try_into()
    }

    /// Inserts an item.
    pub async fn create(pool: &SqlitePool, user_id: i64, input: &ItemInput) -> Result<Item> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO items (user_id, name, description, unit_price, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.unit_price.to_string())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(user_id, item_id = id, "item created");
        Self::get(pool, user_id, id).await
    }

    /// Updates an item. Invoices keep the line items they were built with.
    pub async fn update(pool: &SqlitePool, user_id: i64, id: i64, input: &ItemInput) -> Result<Item> {
        let result = sqlx::query(
            r"
            UPDATE items SET name = ?, description = ?, unit_price = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.unit_price.to_string())
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("item"));
        }
        Self::get(pool, user_id, id).await
    }

    /// Deletes an item.
    pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("item"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use rust_decimal_macros::dec;

    fn input(name: &str, price: rust_decimal::Decimal) -> ItemInput {
        ItemInput {
            name: name.to_string(),
            description: Some("Per hour".to_string()),
            unit_price: price,
        }
    }

    #[tokio::test]
    async fn test_price_survives_storage() {
        let pool = testing::pool().await;
        let user_id = testing::user(&pool, "owner@example.com").await;

        let item = Items::create(&pool, user_id, &input("Consulting", dec!(120.50)))
            .await
            .unwrap();
        assert_eq!(item.unit_price, dec!(120.50));

        let updated = Items::update(&pool, user_id, item.id, &input("Consulting", dec!(0.1)))
            .await
            .unwrap();
        assert_eq!(updated.unit_price, dec!(0.1));
    }

    #[tokio::test]
    async fn test_search_and_delete() {
        let pool = testing::pool().await;
        let user_id = testing::user(&pool, "owner@example.com").await;
        let other = testing::user(&pool, "other@example.com").await;
        let logo = Items::create(&pool, user_id, &input("Logo design", dec!(300))).await.unwrap();
        Items::create(&pool, user_id, &input("Hosting", dec!(20))).await.unwrap();

        let found = Items::list(&pool, user_id, Some("logo")).await.unwrap();
        assert_eq!(found, vec![logo.clone()]);

        assert!(matches!(
            Items::delete(&pool, other, logo.id).await,
            Err(StoreError::NotFound("item"))
        ));
        Items::delete(&pool, user_id, logo.id).await.unwrap();
        assert_eq!(Items::list(&pool, user_id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_price_is_reported() {
        let pool = testing::pool().await;
        let user_id = testing::user(&pool, "owner@example.com").await;
        let item = Items::create(&pool, user_id, &input("Hosting", dec!(20))).await.unwrap();
        sqlx::query("UPDATE items SET unit_price = 'twenty' WHERE id = ?")
            .bind(item.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = Items::get(&pool, user_id, item.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { entity: "item", .. }));
    }
}
