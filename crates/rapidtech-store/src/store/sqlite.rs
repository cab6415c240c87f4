//! SQLite-backed Store.
//!
//! Multi-step writes (cart edits, checkout, product updates) run in one
//! transaction. Any early return drops the transaction, which rolls it back.
//! Stock is taken with a conditional `UPDATE` so it never goes negative even
//! if two checkouts race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use crate::error::{DbError, StoreResult};
use crate::pool::{Database, DbConfig};
use crate::repository::{CartRepository, OrderRepository, ProductRepository, ReviewRepository};
use crate::store::Store;
use rapidtech_core::cart::add_line;
use rapidtech_core::catalog::{apply_update, new_product};
use rapidtech_core::checkout::{plan_order, select_lines};
use rapidtech_core::review::new_review;
use rapidtech_core::validation::validate_product_input;
use rapidtech_core::{
    Cart, CoreError, Order, OrderLine, Product, ProductFilter, ProductInput, Review, ReviewStatus, Role,
    Session, User,
};

/// Store persisted in SQLite through the repositories.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    /// Opens (and migrates) the database described by `config`.
    pub async fn connect(config: DbConfig) -> StoreResult<Self> {
        let db = Database::new(config).await?;
        info!("SQLite store ready");
        Ok(SqliteStore { db })
    }

    /// A private, migrated in-memory database.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect(DbConfig::in_memory()).await
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        match self.db.users().insert(&user).await {
            Ok(user) => Ok(user),
            Err(e) if e.is_unique_violation() => Err(CoreError::EmailTaken(user.email).into()),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.db.users().get_by_email(email).await?)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.db.users().get_by_id(id).await?)
    }

    async fn has_admin(&self) -> StoreResult<bool> {
        Ok(self.db.users().has_role(Role::Admin).await?)
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        Ok(self.db.products().list(filter).await?)
    }

    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.db.products().get_by_id(id).await?)
    }

    async fn insert_product(&self, input: ProductInput) -> StoreResult<Product> {
        validate_product_input(&input)?;
        let product = new_product(input, Utc::now());
        Ok(self.db.products().insert(&product).await?)
    }

    async fn update_product(&self, id: &str, input: ProductInput) -> StoreResult<Product> {
        validate_product_input(&input)?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let mut product = ProductRepository::get_in(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        apply_update(&mut product, input, Utc::now());

        if !ProductRepository::update_in(&mut tx, &product).await? {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(product)
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        Ok(self.db.products().delete(id).await?)
    }

    async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Cart> {
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        CartRepository::lock_in(&mut tx, user_id).await?;

        let product = ProductRepository::get_in(&mut tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let mut cart = CartRepository::load_in(&mut tx, user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(user_id));
        let quantity = add_line(&mut cart, &product, quantity, Utc::now())?;

        CartRepository::save_in(&mut tx, &cart).await?;
        tx.commit().await.map_err(DbError::from)?;

        debug!(user_id = %user_id, product_id = %product_id, quantity, "Cart line updated");
        Ok(cart)
    }

    async fn get_cart(&self, user_id: &str) -> StoreResult<Cart> {
        Ok(self
            .db
            .carts()
            .get(user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(user_id)))
    }

    /// ## Transaction
    /// ```text
    /// BEGIN
    ///   lock cart row          (take the write lock up front)
    ///   load cart, select lines
    ///   read each product      (validation pass, no writes)
    ///   UPDATE stock ... WHERE stock >= qty   per line
    ///   INSERT order + lines
    ///   DELETE cart | rewrite remaining lines
    /// COMMIT
    /// ```
    async fn place_order(
        &self,
        user_id: &str,
        product_ids: Option<&[String]>,
    ) -> StoreResult<Order> {
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        CartRepository::lock_in(&mut tx, user_id).await?;

        let cart = CartRepository::load_in(&mut tx, user_id).await?;
        let selection = select_lines(cart.as_ref(), product_ids)?;

        let mut products = Vec::with_capacity(selection.selected.len());
        for line in &selection.selected {
            if let Some(product) = ProductRepository::get_in(&mut tx, &line.product_id).await? {
                products.push(product);
            }
        }
        let plan = plan_order(user_id, &selection.selected, |id| {
            products.iter().find(|p| p.id == id).cloned()
        })?;

        let now = Utc::now();
        take_stock_in(&mut tx, &plan.lines, now).await?;

        let order = plan.into_order(now);
        OrderRepository::insert_in(&mut tx, &order).await?;

        if selection.consumes_cart() {
            CartRepository::delete_in(&mut tx, user_id).await?;
        } else {
            let remaining = Cart {
                user_id: user_id.to_string(),
                items: selection.remaining,
                updated_at: Some(now),
            };
            CartRepository::save_in(&mut tx, &remaining).await?;
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(order)
    }

    async fn list_orders(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        Ok(self.db.orders().list_for_user(user_id).await?)
    }

    async fn insert_review(
        &self,
        user_id: &str,
        product_id: &str,
        rating: i64,
        comment: &str,
    ) -> StoreResult<Review> {
        let review = new_review(user_id, product_id, rating, comment, Utc::now())?;

        // Write first so a concurrent delete_product cannot slip in between
        // the existence check and the commit.
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        ReviewRepository::insert_in(&mut tx, &review).await?;

        if ProductRepository::get_in(&mut tx, product_id).await?.is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(review)
    }

    async fn list_reviews(
        &self,
        product_id: &str,
        include_pending: bool,
    ) -> StoreResult<Vec<Review>> {
        Ok(self
            .db
            .reviews()
            .list_for_product(product_id, include_pending)
            .await?)
    }

    async fn set_review_status(&self, id: &str, status: ReviewStatus) -> StoreResult<Review> {
        self.db
            .reviews()
            .set_status(id, status)
            .await?
            .ok_or_else(|| CoreError::ReviewNotFound(id.to_string()).into())
    }

    async fn create_session(&self, session: Session) -> StoreResult<()> {
        Ok(self.db.sessions().insert(&session).await?)
    }

    async fn session_valid(&self, token: &str) -> StoreResult<bool> {
        let now = Utc::now();
        let sessions = self.db.sessions();

        match sessions.get(token).await? {
            None => Ok(false),
            Some(session) if session.is_expired_at(now) => {
                sessions.delete_if_expired(token, now).await?;
                Ok(false)
            }
            Some(_) => Ok(true),
        }
    }

    async fn revoke_session(&self, token: &str) -> StoreResult<bool> {
        Ok(self.db.sessions().delete(token).await?)
    }

    async fn purge_expired_sessions(&self) -> StoreResult<u64> {
        Ok(self.db.sessions().delete_expired(Utc::now()).await?)
    }
}

/// Decrements stock for every planned line.
///
/// A line the conditional `UPDATE` refuses fails the whole call with
/// `InsufficientStock`; the caller's transaction then rolls back any lines
/// already taken.
async fn take_stock_in(
    conn: &mut SqliteConnection,
    lines: &[OrderLine],
    now: DateTime<Utc>,
) -> StoreResult<()> {
    for line in lines {
        let taken =
            ProductRepository::decrement_stock_in(conn, &line.product_id, line.quantity, now)
                .await?;
        if !taken {
            let available = ProductRepository::get_in(conn, &line.product_id)
                .await?
                .map(|p| p.stock)
                .unwrap_or(0);
            warn!(product_id = %line.product_id, available, requested = line.quantity, "Stock guard refused decrement");
            return Err(CoreError::InsufficientStock {
                product_id: line.product_id.clone(),
                available,
                requested: line.quantity,
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    crate::store::store_contract_tests!(super::SqliteStore::in_memory().await.unwrap());
}

#[cfg(test)]
mod transaction_tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rapidtech_core::{CoreError, OrderLine, ProductInput};

    use super::{take_stock_in, SqliteStore};
    use crate::error::StoreError;
    use crate::pool::DbConfig;
    use crate::store::Store;

    fn laptop(stock: i64) -> ProductInput {
        ProductInput {
            model_name: "ThinkPad T14".to_string(),
            brand_id: "lenovo".to_string(),
            category_id: "business".to_string(),
            price_cents: 1000,
            stock,
            ..Default::default()
        }
    }

    fn line(product_id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents: 1000,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn checkouts_race_across_pooled_connections() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("race.db")).max_connections(8);
        let store = Arc::new(SqliteStore::connect(config).await.unwrap());
        let p = store.insert_product(laptop(5)).await.unwrap();

        let shoppers: Vec<String> = (0..12).map(|i| format!("shopper-{i}")).collect();
        for (i, user) in shoppers.iter().enumerate() {
            let quantity = if i % 3 == 0 { 2 } else { 1 };
            store.add_to_cart(user, &p.id, quantity).await.unwrap();
        }

        let mut handles = Vec::new();
        for user in shoppers.clone() {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let cart = store.get_cart(&user).await.unwrap();
                let placed = store.place_order(&user, None).await;
                (user, cart, placed)
            }));
        }

        let mut sold = 0;
        let mut failed = 0;
        for h in handles {
            let (user, cart_before, placed) = h.await.unwrap();
            let cart_after = store.get_cart(&user).await.unwrap();
            match placed {
                Ok(order) => {
                    sold += order.items[0].quantity;
                    assert!(cart_after.items.is_empty());
                }
                Err(StoreError::Core(CoreError::InsufficientStock { .. })) => {
                    failed += 1;
                    assert_eq!(cart_after.items, cart_before.items);
                }
                Err(other) => panic!("unexpected checkout failure: {other:?}"),
            }
        }

        let stock = store.get_product(&p.id).await.unwrap().unwrap().stock;
        assert!(stock >= 0);
        assert_eq!(sold + stock, 5);
        assert!(failed > 0);

        store.database().close().await;
    }

    #[tokio::test]
    async fn refused_decrement_rolls_back_earlier_lines() {
        let store = SqliteStore::in_memory().await.unwrap();
        let plenty = store.insert_product(laptop(5)).await.unwrap();
        let scarce = store.insert_product(laptop(1)).await.unwrap();

        let mut tx = store.database().pool().begin().await.unwrap();
        let err = take_stock_in(
            &mut tx,
            &[line(&plenty.id, 2), line(&scarce.id, 3)],
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InsufficientStock { available: 1, requested: 3, .. })
        ));
        drop(tx);

        assert_eq!(store.get_product(&plenty.id).await.unwrap().unwrap().stock, 5);
        assert_eq!(store.get_product(&scarce.id).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn review_of_deleted_product_leaves_no_row() {
        let store = SqliteStore::in_memory().await.unwrap();
        let p = store.insert_product(laptop(5)).await.unwrap();
        assert!(store.delete_product(&p.id).await.unwrap());

        let err = store.insert_review("u1", &p.id, 5, "great").await.unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::ProductNotFound(_))));
        assert!(store.list_reviews(&p.id, true).await.unwrap().is_empty());
    }
}
