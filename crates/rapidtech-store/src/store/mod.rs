//! # Store Contract
//!
//! The backend-level interface that owns every piece of mutable storefront
//! state. Two implementations share one behavioural contract:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         trait Store                                     │
//! │                                                                         │
//! │   ┌──────────────────────────┐       ┌──────────────────────────┐      │
//! │   │       MemoryStore        │       │       SqliteStore        │      │
//! │   │  RwLock<State>           │       │  SqlitePool              │      │
//! │   │  reads: shared guard     │       │  reads: pool             │      │
//! │   │  writes: exclusive guard │       │  writes: one transaction │      │
//! │   │  for the whole critical  │       │  + conditional stock     │      │
//! │   │  section, no .await held │       │    UPDATE, rollback on   │      │
//! │   │                          │       │    any failure           │      │
//! │   └────────────┬─────────────┘       └─────────────┬────────────┘      │
//! │                └──────────────┬────────────────────┘                    │
//! │                               ▼                                         │
//! │             rapidtech-core rules (filter, cart, checkout, review)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No authorization happens here; callers pass identities that the
//! [`crate::Storefront`] has already checked. Stock decrement is private to
//! each backend's `place_order`.

use async_trait::async_trait;

use crate::error::StoreResult;
use rapidtech_core::{
    Cart, Order, Product, ProductFilter, ProductInput, Review, ReviewStatus, Session, User,
};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage backend contract.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Stores a new user. Fails with `EmailTaken` when the exact email is
    /// already registered, whatever the interleaving.
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;

    async fn has_admin(&self) -> StoreResult<bool>;

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;

    /// Any product by id, active or not.
    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Validates and stores a new product (negative price/stock rejected).
    async fn insert_product(&self, input: ProductInput) -> StoreResult<Product>;

    /// Full replacement of the mutable fields. `ProductNotFound` if absent.
    async fn update_product(&self, id: &str, input: ProductInput) -> StoreResult<Product>;

    /// Returns true if a product existed and was removed.
    async fn delete_product(&self, id: &str) -> StoreResult<bool>;

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// Adds to (or merges into) the user's cart, creating it lazily.
    async fn add_to_cart(&self, user_id: &str, product_id: &str, quantity: i64)
        -> StoreResult<Cart>;

    /// The user's cart; an empty one when none exists.
    async fn get_cart(&self, user_id: &str) -> StoreResult<Cart>;

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Converts the cart (or the lines for `product_ids`) into an order,
    /// all-or-nothing.
    async fn place_order(&self, user_id: &str, product_ids: Option<&[String]>)
        -> StoreResult<Order>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user_id: &str) -> StoreResult<Vec<Order>>;

    // -------------------------------------------------------------------------
    // Reviews
    // -------------------------------------------------------------------------

    /// Creates a pending review. `InvalidRating` is checked before the
    /// product lookup.
    async fn insert_review(
        &self,
        user_id: &str,
        product_id: &str,
        rating: i64,
        comment: &str,
    ) -> StoreResult<Review>;

    /// Reviews of a product, newest first; approved only unless
    /// `include_pending`.
    async fn list_reviews(&self, product_id: &str, include_pending: bool)
        -> StoreResult<Vec<Review>>;

    /// Overwrites a review's status. `ReviewNotFound` if absent.
    async fn set_review_status(&self, id: &str, status: ReviewStatus) -> StoreResult<Review>;

    // -------------------------------------------------------------------------
    // Sessions
    // -------------------------------------------------------------------------

    async fn create_session(&self, session: Session) -> StoreResult<()>;

    /// True when the token is on record and unexpired. An expired record is
    /// removed by the check.
    async fn session_valid(&self, token: &str) -> StoreResult<bool>;

    /// Removes a session record. Returns true if one existed.
    async fn revoke_session(&self, token: &str) -> StoreResult<bool>;

    /// Removes every expired session. Returns how many were removed.
    async fn purge_expired_sessions(&self) -> StoreResult<u64>;
}

// =============================================================================
// Shared contract suite
// =============================================================================

/// Instantiates the behavioural contract tests for a backend.
///
/// `$make` is an async expression producing the store under test.
#[cfg(test)]
macro_rules! store_contract_tests {
    ($make:expr) => {
        use std::sync::Arc;

        use chrono::{Duration, Utc};
        use rapidtech_core::{
            CoreError, LaptopSpec, ProductFilter, ProductInput, ProductSort, ReviewStatus, Role,
            Session, User,
        };

        use crate::error::StoreError;
        use crate::store::Store;

        fn laptop(name: &str, price: i64, stock: i64) -> ProductInput {
            ProductInput {
                model_name: name.to_string(),
                brand_id: "lenovo".to_string(),
                category_id: "business".to_string(),
                price_cents: price,
                stock,
                description: None,
                is_active: None,
                specs: LaptopSpec {
                    cpu: "i5".to_string(),
                    ram: "16GB".to_string(),
                    storage_type: "ssd".to_string(),
                    ..Default::default()
                },
            }
        }

        fn customer(email: &str) -> User {
            User::new(email, "Shopper", "hash", Role::Customer, Utc::now())
        }

        fn business(err: StoreError) -> CoreError {
            match err {
                StoreError::Core(e) => e,
                other => panic!("expected a business error, got {other:?}"),
            }
        }

        // ---------------------------------------------------------------------
        // Users
        // ---------------------------------------------------------------------

        #[tokio::test]
        async fn users_unique_email() {
            let store = $make;
            store.insert_user(customer("a@example.com")).await.unwrap();

            let err = store.insert_user(customer("a@example.com")).await.unwrap_err();
            assert!(matches!(business(err), CoreError::EmailTaken(_)));

            // Exact match only.
            store.insert_user(customer("A@example.com")).await.unwrap();
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
        async fn users_unique_email_under_concurrency() {
            let store = Arc::new($make);
            let mut handles = Vec::new();
            for _ in 0..8 {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    store.insert_user(customer("race@example.com")).await
                }));
            }

            let mut ok = 0;
            let mut taken = 0;
            for h in handles {
                match h.await.unwrap() {
                    Ok(_) => ok += 1,
                    Err(e) => {
                        assert!(matches!(business(e), CoreError::EmailTaken(_)));
                        taken += 1;
                    }
                }
            }
            assert_eq!(ok, 1);
            assert_eq!(taken, 7);
        }

        #[tokio::test]
        async fn users_lookup_and_admin_flag() {
            let store = $make;
            assert!(!store.has_admin().await.unwrap());

            let user = store.insert_user(customer("b@example.com")).await.unwrap();
            assert_eq!(
                store.find_user(&user.id).await.unwrap().unwrap().email,
                "b@example.com"
            );
            assert!(store.find_user_by_email("nobody@example.com").await.unwrap().is_none());

            store
                .insert_user(User::new("root@example.com", "Root", "h", Role::Admin, Utc::now()))
                .await
                .unwrap();
            assert!(store.has_admin().await.unwrap());
        }

        // ---------------------------------------------------------------------
        // Catalog
        // ---------------------------------------------------------------------

        #[tokio::test]
        async fn catalog_crud() {
            let store = $make;
            let p = store.insert_product(laptop("T14", 90_000, 3)).await.unwrap();
            assert!(p.is_active);
            assert_eq!(store.get_product(&p.id).await.unwrap(), Some(p.clone()));

            let mut changed = laptop("T14 Gen 4", 95_000, 7);
            changed.is_active = Some(false);
            let updated = store.update_product(&p.id, changed).await.unwrap();
            assert_eq!(updated.id, p.id);
            assert_eq!(updated.created_at, p.created_at);
            assert!(updated.updated_at >= p.updated_at);
            assert_eq!(updated.model_name, "T14 Gen 4");
            assert!(!updated.is_active);

            let err = store
                .update_product("missing", laptop("x", 1, 1))
                .await
                .unwrap_err();
            assert!(matches!(business(err), CoreError::ProductNotFound(_)));

            assert!(store.delete_product(&p.id).await.unwrap());
            assert!(!store.delete_product(&p.id).await.unwrap());
            assert!(store.get_product(&p.id).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn catalog_rejects_negative_values() {
            let store = $make;
            for bad in [laptop("x", -1, 1), laptop("x", 1, -1), laptop(" ", 1, 1)] {
                let err = store.insert_product(bad).await.unwrap_err();
                assert!(matches!(business(err), CoreError::Validation(_)));
            }

            let p = store.insert_product(laptop("ok", 1, 1)).await.unwrap();
            let err = store.update_product(&p.id, laptop("ok", -5, 1)).await.unwrap_err();
            assert!(matches!(business(err), CoreError::Validation(_)));
            assert_eq!(store.get_product(&p.id).await.unwrap().unwrap().price_cents, 1);
        }

        #[tokio::test]
        async fn catalog_filter_and_sort() {
            let store = $make;
            let cheap = store.insert_product(laptop("cheap", 50_000, 1)).await.unwrap();
            let mid = store.insert_product(laptop("mid", 100_000, 1)).await.unwrap();
            let mut hidden_input = laptop("hidden", 75_000, 1);
            hidden_input.is_active = Some(false);
            let hidden = store.insert_product(hidden_input).await.unwrap();
            let mut gaming = laptop("gaming", 200_000, 1);
            gaming.category_id = "gaming".to_string();
            let gaming = store.insert_product(gaming).await.unwrap();

            let ids = |ps: Vec<rapidtech_core::Product>| -> Vec<String> {
                ps.into_iter().map(|p| p.id).collect()
            };

            let all = store.list_products(&ProductFilter::default()).await.unwrap();
            assert_eq!(ids(all), vec![cheap.id.clone(), mid.id.clone(), gaming.id.clone()]);

            let with_inactive = store
                .list_products(&ProductFilter {
                    include_inactive: true,
                    sort: Some(ProductSort::PriceAsc),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(
                ids(with_inactive),
                vec![cheap.id.clone(), hidden.id.clone(), mid.id.clone(), gaming.id.clone()]
            );

            let ranged = store
                .list_products(&ProductFilter {
                    price_min_cents: Some(50_000),
                    price_max_cents: Some(100_000),
                    sort: Some(ProductSort::PriceDesc),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(ids(ranged), vec![mid.id.clone(), cheap.id.clone()]);

            let by_category = store
                .list_products(&ProductFilter {
                    category_id: Some("gaming".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(ids(by_category), vec![gaming.id.clone()]);

            let newest = store
                .list_products(&ProductFilter {
                    sort: Some(ProductSort::Newest),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(ids(newest), vec![gaming.id, mid.id, cheap.id]);
        }

        // ---------------------------------------------------------------------
        // Cart
        // ---------------------------------------------------------------------

        #[tokio::test]
        async fn cart_merges_lines() {
            let store = $make;
            let p = store.insert_product(laptop("X1", 1000, 10)).await.unwrap();

            assert!(store.get_cart("u1").await.unwrap().items.is_empty());

            store.add_to_cart("u1", &p.id, 2).await.unwrap();
            let cart = store.add_to_cart("u1", &p.id, 3).await.unwrap();

            assert_eq!(cart.items.len(), 1);
            assert_eq!(cart.items[0].quantity, 5);
            assert_eq!(store.get_cart("u1").await.unwrap(), cart);
        }

        #[tokio::test]
        async fn cart_rejects_missing_inactive_and_short_stock() {
            let store = $make;
            let err = store.add_to_cart("u1", "missing", 1).await.unwrap_err();
            assert!(matches!(business(err), CoreError::ProductNotFound(_)));

            let mut inactive = laptop("old", 1000, 5);
            inactive.is_active = Some(false);
            let inactive = store.insert_product(inactive).await.unwrap();
            let err = store.add_to_cart("u1", &inactive.id, 1).await.unwrap_err();
            assert!(matches!(business(err), CoreError::ProductNotFound(_)));

            let sold_out = store.insert_product(laptop("none", 1000, 0)).await.unwrap();
            let err = store.add_to_cart("u1", &sold_out.id, 0).await.unwrap_err();
            assert!(matches!(business(err), CoreError::OutOfStock { .. }));

            assert!(store.get_cart("u1").await.unwrap().items.is_empty());
        }

        #[tokio::test]
        async fn cart_rejects_quantity_overflow() {
            let store = $make;
            let p = store.insert_product(laptop("X1", 1000, 10)).await.unwrap();
            store.add_to_cart("u1", &p.id, 1).await.unwrap();

            let err = store.add_to_cart("u1", &p.id, i64::MAX).await.unwrap_err();
            assert!(matches!(
                business(err),
                CoreError::OutOfStock { available: 10, requested: i64::MAX, .. }
            ));

            let cart = store.get_cart("u1").await.unwrap();
            assert_eq!(cart.items.len(), 1);
            assert_eq!(cart.items[0].quantity, 1);
        }

        // ---------------------------------------------------------------------
        // Orders
        // ---------------------------------------------------------------------

        #[tokio::test]
        async fn order_scenario_stock_two() {
            let store = $make;
            let p = store.insert_product(laptop("P", 1000, 2)).await.unwrap();

            let err = store.add_to_cart("u1", &p.id, 3).await.unwrap_err();
            assert!(matches!(business(err), CoreError::OutOfStock { .. }));

            store.add_to_cart("u1", &p.id, 2).await.unwrap();
            let order = store.place_order("u1", None).await.unwrap();

            assert_eq!(order.total_cents, 2000);
            assert_eq!(order.items.len(), 1);
            assert_eq!(order.items[0].unit_price_cents, 1000);
            assert_eq!(store.get_product(&p.id).await.unwrap().unwrap().stock, 0);
            assert!(store.get_cart("u1").await.unwrap().items.is_empty());

            let err = store.add_to_cart("u1", &p.id, 1).await.unwrap_err();
            assert!(matches!(business(err), CoreError::OutOfStock { .. }));
        }

        #[tokio::test]
        async fn order_empty_cart_and_selection() {
            let store = $make;
            let err = store.place_order("u1", None).await.unwrap_err();
            assert!(matches!(business(err), CoreError::CartEmpty));

            let p = store.insert_product(laptop("P", 1000, 2)).await.unwrap();
            store.add_to_cart("u1", &p.id, 1).await.unwrap();

            let none = vec!["not-in-cart".to_string()];
            let err = store.place_order("u1", Some(&none)).await.unwrap_err();
            assert!(matches!(business(err), CoreError::NoSelectedItems));
            assert_eq!(store.get_cart("u1").await.unwrap().items.len(), 1);
        }

        #[tokio::test]
        async fn order_partial_checkout_keeps_rest() {
            let store = $make;
            let a = store.insert_product(laptop("A", 1000, 5)).await.unwrap();
            let b = store.insert_product(laptop("B", 2500, 5)).await.unwrap();
            store.add_to_cart("u1", &a.id, 1).await.unwrap();
            store.add_to_cart("u1", &b.id, 2).await.unwrap();

            let pick = vec![b.id.clone()];
            let order = store.place_order("u1", Some(&pick)).await.unwrap();
            assert_eq!(order.total_cents, 5000);

            let cart = store.get_cart("u1").await.unwrap();
            assert_eq!(cart.items.len(), 1);
            assert_eq!(cart.items[0].product_id, a.id);
            assert_eq!(store.get_product(&a.id).await.unwrap().unwrap().stock, 5);
            assert_eq!(store.get_product(&b.id).await.unwrap().unwrap().stock, 3);

            let rest = vec![a.id.clone()];
            store.place_order("u1", Some(&rest)).await.unwrap();
            assert!(store.get_cart("u1").await.unwrap().items.is_empty());
        }

        #[tokio::test]
        async fn order_all_or_nothing() {
            let store = $make;
            let plenty = store.insert_product(laptop("plenty", 1000, 10)).await.unwrap();
            let scarce = store.insert_product(laptop("scarce", 1000, 3)).await.unwrap();
            store.add_to_cart("u1", &plenty.id, 4).await.unwrap();
            store.add_to_cart("u1", &scarce.id, 3).await.unwrap();

            // Someone else drains the scarce product after it was carted.
            let drained = laptop("scarce", 1000, 1);
            store.update_product(&scarce.id, drained).await.unwrap();

            let cart_before = store.get_cart("u1").await.unwrap();
            let err = store.place_order("u1", None).await.unwrap_err();
            assert!(matches!(business(err), CoreError::InsufficientStock { .. }));

            assert_eq!(store.get_cart("u1").await.unwrap(), cart_before);
            assert_eq!(store.get_product(&plenty.id).await.unwrap().unwrap().stock, 10);
            assert_eq!(store.get_product(&scarce.id).await.unwrap().unwrap().stock, 1);
            assert!(store.list_orders("u1").await.unwrap().is_empty());

            // Deactivated product fails the same way.
            let mut off = laptop("scarce", 1000, 5);
            off.is_active = Some(false);
            store.update_product(&scarce.id, off).await.unwrap();
            let err = store.place_order("u1", None).await.unwrap_err();
            assert!(matches!(business(err), CoreError::ProductNotFound(_)));
            assert_eq!(store.get_product(&plenty.id).await.unwrap().unwrap().stock, 10);
        }

        #[tokio::test]
        async fn order_rejects_amount_overflow() {
            let store = $make;
            let p = store.insert_product(laptop("gold", i64::MAX / 2, 3)).await.unwrap();
            store.add_to_cart("u1", &p.id, 3).await.unwrap();
            let cart_before = store.get_cart("u1").await.unwrap();

            let err = store.place_order("u1", None).await.unwrap_err();
            assert!(matches!(business(err), CoreError::AmountOverflow { .. }));

            assert_eq!(store.get_product(&p.id).await.unwrap().unwrap().stock, 3);
            assert_eq!(store.get_cart("u1").await.unwrap(), cart_before);
            assert!(store.list_orders("u1").await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn order_price_snapshot() {
            let store = $make;
            let p = store.insert_product(laptop("P", 1000, 5)).await.unwrap();
            store.add_to_cart("u1", &p.id, 2).await.unwrap();
            let order = store.place_order("u1", None).await.unwrap();

            store.update_product(&p.id, laptop("P", 9999, 3)).await.unwrap();

            let listed = store.list_orders("u1").await.unwrap();
            assert_eq!(listed, vec![order]);
            assert_eq!(listed[0].items[0].unit_price_cents, 1000);
            assert_eq!(listed[0].total_cents, 2000);
        }

        #[tokio::test]
        async fn orders_newest_first() {
            let store = $make;
            let p = store.insert_product(laptop("P", 100, 10)).await.unwrap();

            store.add_to_cart("u1", &p.id, 1).await.unwrap();
            let first = store.place_order("u1", None).await.unwrap();
            store.add_to_cart("u1", &p.id, 2).await.unwrap();
            let second = store.place_order("u1", None).await.unwrap();

            let ids: Vec<_> = store
                .list_orders("u1")
                .await
                .unwrap()
                .into_iter()
                .map(|o| o.id)
                .collect();
            assert_eq!(ids, vec![second.id, first.id]);
            assert!(store.list_orders("u2").await.unwrap().is_empty());
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
        async fn orders_never_oversell() {
            let store = Arc::new($make);
            let p = store.insert_product(laptop("hot", 1000, 5)).await.unwrap();

            let shoppers: Vec<String> = (0..10).map(|i| format!("shopper-{i}")).collect();
            for user in &shoppers {
                store.add_to_cart(user, &p.id, 1).await.unwrap();
            }
            // Two shoppers want two units each.
            store.add_to_cart(&shoppers[0], &p.id, 1).await.unwrap();
            store.add_to_cart(&shoppers[1], &p.id, 1).await.unwrap();

            let mut handles = Vec::new();
            for user in shoppers.clone() {
                let store = store.clone();
                handles.push(tokio::spawn(async move { store.place_order(&user, None).await }));
            }

            let mut sold = 0;
            for h in handles {
                match h.await.unwrap() {
                    Ok(order) => sold += order.items[0].quantity,
                    Err(e) => assert!(matches!(business(e), CoreError::InsufficientStock { .. })),
                }
            }

            let stock = store.get_product(&p.id).await.unwrap().unwrap().stock;
            assert!(sold <= 5);
            assert!(stock >= 0);
            assert_eq!(sold + stock, 5);
        }

        // ---------------------------------------------------------------------
        // Reviews
        // ---------------------------------------------------------------------

        #[tokio::test]
        async fn review_scenario() {
            let store = $make;
            let p = store.insert_product(laptop("P", 1000, 1)).await.unwrap();

            let err = store.insert_review("u1", &p.id, 6, "great").await.unwrap_err();
            assert!(matches!(business(err), CoreError::InvalidRating { .. }));

            let err = store.insert_review("u1", "missing", 3, "ok").await.unwrap_err();
            assert!(matches!(business(err), CoreError::ProductNotFound(_)));

            let review = store.insert_review("u1", &p.id, 4, "good").await.unwrap();
            assert_eq!(review.status, ReviewStatus::Pending);
            assert!(store.list_reviews(&p.id, false).await.unwrap().is_empty());
            assert_eq!(store.list_reviews(&p.id, true).await.unwrap().len(), 1);

            let approved = store
                .set_review_status(&review.id, ReviewStatus::Approved)
                .await
                .unwrap();
            assert_eq!(approved.status, ReviewStatus::Approved);
            assert_eq!(store.list_reviews(&p.id, false).await.unwrap(), vec![approved]);

            // Re-moderation overwrites.
            store
                .set_review_status(&review.id, ReviewStatus::Rejected)
                .await
                .unwrap();
            assert!(store.list_reviews(&p.id, false).await.unwrap().is_empty());

            let err = store
                .set_review_status("missing", ReviewStatus::Approved)
                .await
                .unwrap_err();
            assert!(matches!(business(err), CoreError::ReviewNotFound(_)));
        }

        #[tokio::test]
        async fn reviews_newest_first() {
            let store = $make;
            let p = store.insert_product(laptop("P", 1000, 1)).await.unwrap();
            let first = store.insert_review("u1", &p.id, 3, "meh").await.unwrap();
            let second = store.insert_review("u2", &p.id, 5, "wow").await.unwrap();

            let listed = store.list_reviews(&p.id, true).await.unwrap();
            let ids: Vec<_> = listed.iter().map(|r| r.id.clone()).collect();
            assert_eq!(ids, vec![second.id, first.id]);
        }

        // ---------------------------------------------------------------------
        // Sessions
        // ---------------------------------------------------------------------

        #[tokio::test]
        async fn session_expiry_is_lazy_delete() {
            let store = $make;
            let now = Utc::now();

            store
                .create_session(Session::new("old", "u1", Role::Customer, now - Duration::seconds(5), now))
                .await
                .unwrap();
            assert!(!store.session_valid("old").await.unwrap());
            assert!(!store.revoke_session("old").await.unwrap());

            store
                .create_session(Session::new("live", "u1", Role::Customer, now + Duration::hours(1), now))
                .await
                .unwrap();
            assert!(store.session_valid("live").await.unwrap());
            assert!(!store.session_valid("never-issued").await.unwrap());

            assert!(store.revoke_session("live").await.unwrap());
            assert!(!store.session_valid("live").await.unwrap());
        }

        #[tokio::test]
        async fn session_purge() {
            let store = $make;
            let now = Utc::now();
            for (token, offset) in [("a", -10), ("b", -20), ("c", 3600)] {
                store
                    .create_session(Session::new(
                        token,
                        "u1",
                        Role::Customer,
                        now + Duration::seconds(offset),
                        now,
                    ))
                    .await
                    .unwrap();
            }

            assert_eq!(store.purge_expired_sessions().await.unwrap(), 2);
            assert!(store.session_valid("c").await.unwrap());
        }
    };
}

#[cfg(test)]
pub(crate) use store_contract_tests;
