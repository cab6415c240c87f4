//! # Product Repository
//!
//! Database operations for the laptop catalog.
//!
//! ## Key Operations
//! - Filtered/sorted listing (same rules as [`ProductFilter::apply`])
//! - CRUD operations
//! - Conditional stock decrement for order placement
//!
//! ## Filter Translation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductFilter                         SQL                              │
//! │  ─────────────                         ───                              │
//! │  include_inactive = false        ──►   AND is_active = 1                │
//! │  brand_id = Some("dell")         ──►   AND brand_id = ?                 │
//! │  cpu / ram / gpu / storage_type  ──►   AND <column> = ?                 │
//! │  price_min_cents / max           ──►   AND price_cents >= ? / <= ?      │
//! │  None or ""                      ──►   (no clause)                      │
//! │                                                                         │
//! │  sort None        ORDER BY created_at ASC,  id ASC                      │
//! │  sort PriceAsc    ORDER BY price_cents ASC, created_at ASC, id ASC      │
//! │  sort PriceDesc   ORDER BY price_cents DESC, created_at ASC, id ASC     │
//! │  sort Newest      ORDER BY created_at DESC, id DESC                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`ProductFilter::apply`]: rapidtech_core::ProductFilter::apply

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use rapidtech_core::catalog::non_empty;
use rapidtech_core::{Product, ProductFilter, ProductSort};

const PRODUCT_COLUMNS: &str = "id, model_name, brand_id, category_id, price_cents, stock, \
     description, is_active, cpu, ram, storage, storage_type, gpu, screen_size, \
     screen_resolution, created_at, updated_at";

fn order_clause(sort: Option<ProductSort>) -> &'static str {
    match sort {
        Some(ProductSort::PriceAsc) => " ORDER BY price_cents ASC, created_at ASC, id ASC",
        Some(ProductSort::PriceDesc) => " ORDER BY price_cents DESC, created_at ASC, id ASC",
        Some(ProductSort::Newest) => " ORDER BY created_at DESC, id DESC",
        None => " ORDER BY created_at ASC, id ASC",
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let gaming = repo.list(&ProductFilter {
///     category_id: Some("gaming".into()),
///     ..Default::default()
/// }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products matching `filter`, in the filter's sort order.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if !filter.include_inactive {
            qb.push(" AND is_active = 1");
        }

        let exact = [
            ("brand_id", &filter.brand_id),
            ("category_id", &filter.category_id),
            ("cpu", &filter.cpu),
            ("ram", &filter.ram),
            ("gpu", &filter.gpu),
            ("storage_type", &filter.storage_type),
        ];
        for (column, wanted) in exact {
            if let Some(value) = non_empty(wanted) {
                qb.push(format!(" AND {column} = "))
                    .push_bind(value.to_string());
            }
        }

        if let Some(min) = filter.price_min_cents {
            qb.push(" AND price_cents >= ").push_bind(min);
        }
        if let Some(max) = filter.price_max_cents {
            qb.push(" AND price_cents <= ").push_bind(max);
        }

        qb.push(order_clause(filter.sort));

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    /// Same as [`get_by_id`](Self::get_by_id) on an open connection or
    /// transaction.
    pub async fn get_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(product_id = %product.id, model = %product.model_name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, model_name, brand_id, category_id, price_cents, stock,
                description, is_active, cpu, ram, storage, storage_type, gpu,
                screen_size, screen_resolution, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.model_name)
        .bind(&product.brand_id)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.description)
        .bind(product.is_active)
        .bind(&product.specs.cpu)
        .bind(&product.specs.ram)
        .bind(&product.specs.storage)
        .bind(&product.specs.storage_type)
        .bind(&product.specs.gpu)
        .bind(&product.specs.screen_size)
        .bind(&product.specs.screen_resolution)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Writes every mutable field of `product` back to its row.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - No such product
    pub async fn update_in(conn: &mut SqliteConnection, product: &Product) -> DbResult<bool> {
        debug!(product_id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                model_name = ?2,
                brand_id = ?3,
                category_id = ?4,
                price_cents = ?5,
                stock = ?6,
                description = ?7,
                is_active = ?8,
                cpu = ?9,
                ram = ?10,
                storage = ?11,
                storage_type = ?12,
                gpu = ?13,
                screen_size = ?14,
                screen_resolution = ?15,
                updated_at = ?16
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.model_name)
        .bind(&product.brand_id)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.description)
        .bind(product.is_active)
        .bind(&product.specs.cpu)
        .bind(&product.specs.ram)
        .bind(&product.specs.storage)
        .bind(&product.specs.storage_type)
        .bind(&product.specs.gpu)
        .bind(&product.specs.screen_size)
        .bind(&product.specs.screen_resolution)
        .bind(product.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Takes `quantity` units from an active product's stock.
    ///
    /// ## Compensating Check
    /// ```text
    /// UPDATE products SET stock = stock - qty
    /// WHERE id = ? AND is_active = 1 AND stock >= qty
    /// ```
    /// The guard lives in the statement itself, so even if the earlier read
    /// were stale the row can never go negative. `Ok(false)` means the guard
    /// refused and the caller must roll back.
    pub async fn decrement_stock_in(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        debug!(product_id = %id, quantity, "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND is_active = 1 AND stock >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Hard-deletes a product. Orders and reviews keep their references.
    ///
    /// Returns true if a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(product_id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rapidtech_core::catalog::new_product;
    use rapidtech_core::{LaptopSpec, ProductInput};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn laptop(name: &str, gpu: &str, price: i64, stock: i64) -> Product {
        new_product(
            ProductInput {
                model_name: name.to_string(),
                brand_id: "msi".to_string(),
                category_id: "gaming".to_string(),
                price_cents: price,
                stock,
                description: Some("test".to_string()),
                specs: LaptopSpec {
                    gpu: gpu.to_string(),
                    ram: "32GB".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_round_trip_keeps_specs() {
        let db = db().await;
        let repo = db.products();
        let p = laptop("Raider", "rtx4080", 250_000, 2);
        repo.insert(&p).await.unwrap();

        let loaded = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded, p);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_like_core() {
        let db = db().await;
        let repo = db.products();

        let mut inactive = laptop("Old", "gtx1060", 50_000, 1);
        inactive.is_active = false;
        let items = vec![
            laptop("A", "rtx4060", 120_000, 1),
            laptop("B", "rtx4080", 220_000, 1),
            inactive,
        ];
        for p in &items {
            repo.insert(p).await.unwrap();
        }

        let filters = vec![
            ProductFilter::default(),
            ProductFilter {
                include_inactive: true,
                ..Default::default()
            },
            ProductFilter {
                gpu: Some("rtx4080".into()),
                ..Default::default()
            },
            ProductFilter {
                price_min_cents: Some(100_000),
                price_max_cents: Some(150_000),
                ..Default::default()
            },
            ProductFilter {
                sort: Some(ProductSort::PriceDesc),
                include_inactive: true,
                ..Default::default()
            },
            ProductFilter {
                sort: Some(ProductSort::Newest),
                brand_id: Some(String::new()),
                ..Default::default()
            },
        ];

        for filter in filters {
            let from_db = repo.list(&filter).await.unwrap();
            let expected = filter.apply(&items);
            assert_eq!(from_db, expected, "filter {filter:?}");
        }
    }

    #[tokio::test]
    async fn test_conditional_decrement() {
        let db = db().await;
        let repo = db.products();
        let p = laptop("Stealth", "rtx4070", 180_000, 2);
        repo.insert(&p).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(!ProductRepository::decrement_stock_in(&mut conn, &p.id, 3, Utc::now())
            .await
            .unwrap());
        assert!(ProductRepository::decrement_stock_in(&mut conn, &p.id, 2, Utc::now())
            .await
            .unwrap());
        assert!(!ProductRepository::decrement_stock_in(&mut conn, &p.id, 1, Utc::now())
            .await
            .unwrap());
        drop(conn);

        assert_eq!(repo.get_by_id(&p.id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let db = db().await;
        let repo = db.products();
        let p = laptop("Bad", "", 1, -1);

        let err = repo.insert(&p).await.unwrap_err();
        assert_eq!(err.kind(), rapidtech_core::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let repo = db.products();
        let p = laptop("Gone", "", 1, 1);
        repo.insert(&p).await.unwrap();

        assert!(repo.delete(&p.id).await.unwrap());
        assert!(!repo.delete(&p.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
