//! # Order Repository
//!
//! Orders are written once, inside the placement transaction, and read back
//! newest first. Lines live in `order_items` keyed by (order, position) and
//! carry the unit price captured at placement.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use rapidtech_core::{Order, OrderLine, OrderStatus};

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    total_cents: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    order_id: String,
    product_id: String,
    quantity: i64,
    unit_price_cents: i64,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts the order header and every line.
    pub async fn insert_in(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(order_id = %order.id, user_id = %order.user_id, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, total_cents, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.total_cents)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&mut *conn)
        .await?;

        for (position, line) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, quantity, unit_price_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Lists a user's orders, newest first (ties by id, descending).
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let headers: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, total_cents, status, created_at
            FROM orders
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let items: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT oi.order_id, oi.product_id, oi.quantity, oi.unit_price_cents
            FROM order_items oi
            INNER JOIN orders o ON o.id = oi.order_id
            WHERE o.user_id = ?1
            ORDER BY oi.order_id, oi.position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for item in items {
            lines.entry(item.order_id).or_default().push(OrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
            });
        }

        let orders = headers
            .into_iter()
            .map(|row| Order {
                items: lines.remove(&row.id).unwrap_or_default(),
                id: row.id,
                user_id: row.user_id,
                total_cents: row.total_cents,
                status: row.status,
                created_at: row.created_at,
            })
            .collect::<Vec<_>>();

        debug!(user_id = %user_id, count = orders.len(), "Listed orders");
        Ok(orders)
    }
}
