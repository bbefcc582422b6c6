use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use metrobot_core::domain::order::{Order, OrderData, OrderId};

use super::{OrderStore, RepositoryError};
use crate::DbPool;

pub struct SqlOrderStore {
    pool: DbPool,
}

impl SqlOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for SqlOrderStore {
    async fn add(&self, order: OrderData) -> Result<OrderId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (full_name, email, phone, address, product_interest, quantity, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING id",
        )
        .bind(&order.full_name)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(&order.product_interest)
        .bind(order.quantity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderId(id))
    }

    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, full_name, email, phone, address, product_interest, quantity, created_at \
             FROM orders ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(decode_order).collect()
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, full_name, email, phone, address, product_interest, quantity, created_at \
             FROM orders WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode_order).transpose()
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(&self.pool).await?;
        Ok(count)
    }
}

fn decode_order(row: SqliteRow) -> Result<Order, RepositoryError> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Order {
        id: OrderId(row.try_get("id")?),
        data: OrderData {
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            product_interest: row.try_get("product_interest")?,
            quantity: row.try_get("quantity")?,
        },
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use metrobot_core::domain::order::{OrderData, OrderId};

    use super::SqlOrderStore;
    use crate::repositories::OrderStore;
    use crate::{connect_with_settings, migrations};

    fn order_fixture(name: &str) -> OrderData {
        OrderData {
            full_name: name.to_string(),
            email: "alice@example.com".to_string(),
            phone: "555-123-4567".to_string(),
            address: "12345 Main Street".to_string(),
            product_interest: "The Cloud Sofa".to_string(),
            quantity: 1,
        }
    }

    async fn store() -> SqlOrderStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        SqlOrderStore::new(pool)
    }

    #[tokio::test]
    async fn sequential_adds_assign_dense_one_indexed_ids() {
        let store = store().await;

        for expected in 1..=3 {
            let id = store.add(order_fixture("Alice Carter")).await.expect("add order");
            assert_eq!(id, OrderId(expected));
        }
        assert_eq!(store.count().await.expect("count"), 3);
    }

    #[tokio::test]
    async fn stored_orders_round_trip_verbatim() {
        let store = store().await;
        store.add(order_fixture("Alice Carter")).await.expect("add order");

        let order = store
            .find_by_id(OrderId(1))
            .await
            .expect("lookup")
            .expect("order 1 should exist");
        assert_eq!(order.data.full_name, "Alice Carter");
        assert_eq!(order.data.phone, "555-123-4567");
        assert_eq!(order.data.quantity, 1);
    }

    #[tokio::test]
    async fn out_of_range_ids_are_not_found() {
        let store = store().await;
        store.add(order_fixture("Alice Carter")).await.expect("add order");

        assert!(store.find_by_id(OrderId(0)).await.expect("lookup").is_none());
        assert!(store.find_by_id(OrderId(2)).await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn list_all_returns_orders_in_insertion_order() {
        let store = store().await;
        store.add(order_fixture("First Customer")).await.expect("add order");
        store.add(order_fixture("Second Customer")).await.expect("add order");

        let orders = store.list_all().await.expect("list");
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].data.full_name, "First Customer");
        assert_eq!(orders[1].data.full_name, "Second Customer");
    }
}
