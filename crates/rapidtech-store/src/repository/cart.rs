//! # Cart Repository
//!
//! One `carts` row per user plus ordered `cart_items`. Carts are always
//! written whole: the lines are replaced in one go inside the caller's
//! transaction, which keeps `position` dense and insertion-ordered.
//!
//! Writes take an open connection: the store only mutates a cart inside a
//! transaction that also reads products.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use rapidtech_core::{Cart, CartLine};

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Read-only cart lookup outside any transaction.
    pub async fn get(&self, user_id: &str) -> DbResult<Option<Cart>> {
        let mut conn = self.pool.acquire().await?;
        Self::load_in(&mut conn, user_id).await
    }

    /// Loads a user's cart, or `None` when none is stored.
    pub async fn load_in(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Option<Cart>> {
        let updated_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT updated_at FROM carts WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&mut *conn)
                .await?;

        let Some(updated_at) = updated_at else {
            return Ok(None);
        };

        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT product_id, quantity FROM cart_items WHERE user_id = ?1 ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        let items = rows
            .into_iter()
            .map(|(product_id, quantity)| CartLine {
                product_id,
                quantity,
            })
            .collect();

        Ok(Some(Cart {
            user_id: user_id.to_string(),
            items,
            updated_at: Some(updated_at),
        }))
    }

    /// Upserts the cart row and replaces all of its lines.
    pub async fn save_in(conn: &mut SqliteConnection, cart: &Cart) -> DbResult<()> {
        debug!(user_id = %cart.user_id, lines = cart.items.len(), "Saving cart");

        let updated_at = cart.updated_at.unwrap_or_else(Utc::now);

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, updated_at) VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET updated_at = excluded.updated_at
            "#,
        )
        .bind(&cart.user_id)
        .bind(updated_at)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(&cart.user_id)
            .execute(&mut *conn)
            .await?;

        for (position, line) in cart.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (user_id, product_id, quantity, position)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&cart.user_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Deletes the cart and (by cascade) its lines.
    pub async fn delete_in(conn: &mut SqliteConnection, user_id: &str) -> DbResult<bool> {
        debug!(user_id = %user_id, "Deleting cart");

        let result = sqlx::query("DELETE FROM carts WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Takes the database write lock for the current transaction.
    ///
    /// SQLite transactions begin deferred; issuing a write first means a
    /// concurrent checkout waits on `busy_timeout` here instead of failing
    /// later when it tries to upgrade a read lock.
    pub async fn lock_in(conn: &mut SqliteConnection, user_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE carts SET updated_at = updated_at WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
