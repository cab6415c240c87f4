//! # Storefront
//!
//! The orchestrator an HTTP layer talks to. It owns the Store, the
//! credential hasher and the token manager, and it is the only place that
//! checks who may do what.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront call                                  │
//! │                                                                         │
//! │  "Bearer eyJ..."                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  authorize(token) ── TokenManager::verify (signature, exp)             │
//! │       │           └─ Store::session_valid (not revoked, not expired)   │
//! │       ▼                                                                 │
//! │  Principal { user_id, role }                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  place_order(&principal, ..) ── require_admin? ── Store::place_order   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tokio::time::timeout(op_timeout, ..) ── Err(StoreError::Timeout)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Password hashing runs on the blocking pool so argon2 never stalls the
//! async workers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::auth::{extract_bearer_token, Argon2Hasher, CredentialHasher, TokenManager};
use crate::config::{BackendKind, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::store::{MemoryStore, SqliteStore, Store};
use rapidtech_core::review::moderation_status;
use rapidtech_core::validation::{validate_email, validate_password};
use rapidtech_core::{
    Cart, CoreError, Order, Principal, Product, ProductComparison, ProductFilter, ProductInput,
    Review, ReviewStatus, Role, Session, User,
};

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// Signed bearer token.
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// Authorization gate and orchestrator over a [`Store`].
#[derive(Clone)]
pub struct Storefront {
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: TokenManager,
    op_timeout: Duration,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("backend", &self.store.backend())
            .field("tokens", &self.tokens)
            .field("op_timeout", &self.op_timeout)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: TokenManager,
        op_timeout: Duration,
    ) -> Self {
        Storefront {
            store,
            hasher,
            tokens,
            op_timeout,
        }
    }

    /// Builds the configured backend and wires everything together.
    pub async fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let store: Arc<dyn Store> = match config.backend {
            BackendKind::Memory => Arc::new(MemoryStore::new()),
            BackendKind::Sqlite => Arc::new(SqliteStore::connect(config.db_config()).await?),
        };

        info!(
            backend = store.backend(),
            op_timeout_secs = config.op_timeout_secs,
            "Storefront initialized"
        );

        Ok(Storefront::new(
            store,
            Arc::new(Argon2Hasher::default()),
            TokenManager::new(&config.jwt_secret, config.jwt_lifetime_secs),
            config.op_timeout(),
        ))
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Runs `fut` under the per-operation deadline.
    ///
    /// Dropping the future on expiry drops any open SQLite transaction,
    /// which rolls it back.
    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, after = ?self.op_timeout, "Operation timed out");
                Err(StoreError::Timeout {
                    operation,
                    after: self.op_timeout,
                })
            }
        }
    }

    async fn hash_password(&self, password: &str) -> StoreResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = password.to_string();

        let hash = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| CoreError::HashFailure(e.to_string()))??;

        Ok(hash)
    }

    async fn verify_password(&self, hash: &str, password: &str) -> StoreResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let hash = hash.to_string();
        let plaintext = password.to_string();

        let ok = tokio::task::spawn_blocking(move || hasher.verify(&hash, &plaintext))
            .await
            .map_err(|e| CoreError::HashFailure(e.to_string()))?;

        Ok(ok)
    }

    // =========================================================================
    // Accounts & Sessions
    // =========================================================================

    /// Creates an account. `role` defaults to customer.
    pub async fn register(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
        role: Option<Role>,
    ) -> StoreResult<User> {
        self.with_deadline("register", async {
            validate_email(email)?;
            validate_password(password)?;

            // Cheap early exit; the store's own check stays authoritative.
            if self.store.find_user_by_email(email).await?.is_some() {
                return Err(CoreError::EmailTaken(email.to_string()).into());
            }

            let hash = self.hash_password(password).await?;
            let user = User::new(email, full_name, hash, role.unwrap_or_default(), Utc::now());
            let user = self.store.insert_user(user).await?;

            info!(user_id = %user.id, role = %user.role, "User registered");
            Ok(user)
        })
        .await
    }

    /// Checks credentials. Unknown email and wrong password fail the same way.
    pub async fn authenticate(&self, email: &str, password: &str) -> StoreResult<User> {
        self.with_deadline("authenticate", async {
            let Some(user) = self.store.find_user_by_email(email).await? else {
                warn!("Login rejected: unknown email");
                return Err(CoreError::InvalidCredentials.into());
            };

            if !self.verify_password(&user.password_hash, password).await? {
                warn!(user_id = %user.id, "Login rejected: wrong password");
                return Err(CoreError::InvalidCredentials.into());
            }

            Ok(user)
        })
        .await
    }

    /// Authenticates, issues a token and records its session.
    pub async fn login(&self, email: &str, password: &str) -> StoreResult<AuthSession> {
        let user = self.authenticate(email, password).await?;

        self.with_deadline("login", async {
            let issued = self.tokens.issue(&user.id, user.role)?;
            let expires_at = issued.claims.expires_at();

            self.store
                .create_session(Session::new(
                    issued.token.clone(),
                    user.id.clone(),
                    user.role,
                    expires_at,
                    Utc::now(),
                ))
                .await?;

            info!(user_id = %user.id, %expires_at, "Session created");
            Ok(AuthSession {
                token: issued.token,
                user,
                expires_at,
            })
        })
        .await
    }

    /// Revokes the session behind `token`. The token stops authorizing even
    /// though its signature is still valid.
    pub async fn logout(&self, token: &str) -> StoreResult<bool> {
        self.with_deadline("logout", async {
            let revoked = self.store.revoke_session(token).await?;
            if revoked {
                info!("Session revoked");
            }
            Ok(revoked)
        })
        .await
    }

    /// The gate in front of every protected call.
    ///
    /// ## Errors
    /// `Unauthorized` when the signature or expiry is bad, or when the
    /// session was revoked or swept.
    pub async fn authorize(&self, token: &str) -> StoreResult<Principal> {
        self.with_deadline("authorize", async {
            let claims = self.tokens.verify(token)?;

            if !self.store.session_valid(token).await? {
                warn!(user_id = %claims.sub, "Rejected token without a live session");
                return Err(
                    CoreError::Unauthorized("Session expired or revoked".to_string()).into(),
                );
            }

            Ok(claims.principal())
        })
        .await
    }

    /// [`authorize`](Self::authorize) from a raw `Authorization` header.
    pub async fn authorize_header(&self, header: &str) -> StoreResult<Principal> {
        let token = extract_bearer_token(header)
            .ok_or_else(|| CoreError::Unauthorized("Missing bearer token".to_string()))?;
        self.authorize(token).await
    }

    pub fn require_admin(&self, principal: &Principal) -> StoreResult<()> {
        if !principal.is_admin() {
            warn!(user_id = %principal.user_id, "Admin operation denied");
            return Err(CoreError::Forbidden("Admin role required".to_string()).into());
        }
        Ok(())
    }

    /// Creates the bootstrap administrator if no admin exists yet.
    ///
    /// Returns the new admin, or `None` when one was already present.
    pub async fn ensure_admin(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> StoreResult<Option<User>> {
        let has_admin = self
            .with_deadline("ensure_admin", self.store.has_admin())
            .await?;
        if has_admin {
            return Ok(None);
        }

        let admin = self
            .register(email, full_name, password, Some(Role::Admin))
            .await?;
        info!(user_id = %admin.id, email = %admin.email, "Bootstrap administrator created");
        Ok(Some(admin))
    }

    /// Removes every expired session record.
    pub async fn purge_expired_sessions(&self) -> StoreResult<u64> {
        let removed = self
            .with_deadline("purge_expired_sessions", self.store.purge_expired_sessions())
            .await?;
        if removed > 0 {
            info!(removed, "Expired sessions purged");
        }
        Ok(removed)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Lists products. Inactive ones are only included for admin viewers.
    pub async fn list_products(
        &self,
        viewer: Option<&Principal>,
        mut filter: ProductFilter,
    ) -> StoreResult<Vec<Product>> {
        if !viewer.is_some_and(Principal::is_admin) {
            filter.include_inactive = false;
        }

        self.with_deadline("list_products", self.store.list_products(&filter))
            .await
    }

    pub async fn get_product(&self, id: &str) -> StoreResult<Product> {
        self.with_deadline("get_product", async {
            self.store
                .get_product(id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
        })
        .await
    }

    /// Side-by-side view of two products.
    pub async fn compare_products(&self, first: &str, second: &str) -> StoreResult<ProductComparison> {
        let first = self.get_product(first).await?;
        let second = self.get_product(second).await?;
        Ok(ProductComparison::between(first, second))
    }

    pub async fn create_product(
        &self,
        principal: &Principal,
        input: ProductInput,
    ) -> StoreResult<Product> {
        self.require_admin(principal)?;

        let product = self
            .with_deadline("create_product", self.store.insert_product(input))
            .await?;
        info!(product_id = %product.id, model = %product.model_name, "Product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        principal: &Principal,
        id: &str,
        input: ProductInput,
    ) -> StoreResult<Product> {
        self.require_admin(principal)?;

        let product = self
            .with_deadline("update_product", self.store.update_product(id, input))
            .await?;
        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, principal: &Principal, id: &str) -> StoreResult<bool> {
        self.require_admin(principal)?;

        let removed = self
            .with_deadline("delete_product", self.store.delete_product(id))
            .await?;
        if removed {
            info!(product_id = %id, "Product deleted");
        }
        Ok(removed)
    }

    // =========================================================================
    // Cart & Orders
    // =========================================================================

    pub async fn add_to_cart(
        &self,
        principal: &Principal,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Cart> {
        self.with_deadline(
            "add_to_cart",
            self.store
                .add_to_cart(&principal.user_id, product_id, quantity),
        )
        .await
    }

    pub async fn get_cart(&self, principal: &Principal) -> StoreResult<Cart> {
        self.with_deadline("get_cart", self.store.get_cart(&principal.user_id))
            .await
    }

    /// Places an order from the principal's cart.
    ///
    /// `product_ids` selects a subset of lines; `None` orders everything.
    pub async fn place_order(
        &self,
        principal: &Principal,
        product_ids: Option<&[String]>,
    ) -> StoreResult<Order> {
        let order = self
            .with_deadline(
                "place_order",
                self.store.place_order(&principal.user_id, product_ids),
            )
            .await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total(),
            items = order.items.len(),
            "Order placed"
        );
        Ok(order)
    }

    pub async fn list_orders(&self, principal: &Principal) -> StoreResult<Vec<Order>> {
        self.with_deadline("list_orders", self.store.list_orders(&principal.user_id))
            .await
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    pub async fn submit_review(
        &self,
        principal: &Principal,
        product_id: &str,
        rating: i64,
        comment: &str,
    ) -> StoreResult<Review> {
        let review = self
            .with_deadline(
                "submit_review",
                self.store
                    .insert_review(&principal.user_id, product_id, rating, comment),
            )
            .await?;
        info!(review_id = %review.id, product_id = %product_id, rating, "Review submitted");
        Ok(review)
    }

    /// Reviews for a product, newest first. Pending and rejected reviews are
    /// only returned to admins that ask for them.
    pub async fn list_reviews(
        &self,
        viewer: Option<&Principal>,
        product_id: &str,
        include_pending: bool,
    ) -> StoreResult<Vec<Review>> {
        let include_pending = include_pending && viewer.is_some_and(Principal::is_admin);

        self.with_deadline(
            "list_reviews",
            self.store.list_reviews(product_id, include_pending),
        )
        .await
    }

    /// Moderates a review. No status means approve.
    pub async fn set_review_status(
        &self,
        principal: &Principal,
        id: &str,
        status: Option<ReviewStatus>,
    ) -> StoreResult<Review> {
        self.require_admin(principal)?;

        let status = moderation_status(status);
        let review = self
            .with_deadline("set_review_status", self.store.set_review_status(id, status))
            .await?;
        info!(review_id = %review.id, status = %review.status, "Review moderated");
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::test_hasher;
    use rapidtech_core::{ErrorKind, LaptopSpec, ProductSort};

    fn storefront_with(tokens: TokenManager) -> Storefront {
        Storefront::new(
            Arc::new(MemoryStore::new()),
            Arc::new(test_hasher()),
            tokens,
            Duration::from_secs(5),
        )
    }

    fn storefront() -> Storefront {
        storefront_with(TokenManager::new("test-secret", 3600))
    }

    fn laptop(name: &str, price: i64, stock: i64, active: bool) -> ProductInput {
        ProductInput {
            model_name: name.to_string(),
            brand_id: "dell".to_string(),
            category_id: "ultrabook".to_string(),
            price_cents: price,
            stock,
            description: Some("13-inch".to_string()),
            is_active: Some(active),
            specs: LaptopSpec::default(),
        }
    }

    async fn admin(sf: &Storefront) -> Principal {
        sf.ensure_admin("admin@rapidtech.local", "Admin", "Admin123!")
            .await
            .unwrap();
        sf.login("admin@rapidtech.local", "Admin123!")
            .await
            .unwrap()
            .user
            .principal()
    }

    async fn customer(sf: &Storefront, email: &str) -> Principal {
        sf.register(email, "Shopper", "pw", None).await.unwrap().principal()
    }

    #[tokio::test]
    async fn test_register_and_login_flow() {
        let sf = storefront();
        let user = sf
            .register("jane@example.com", "Jane", "s3cret", None)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_ne!(user.password_hash, "s3cret");

        let session = sf.login("jane@example.com", "s3cret").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert!(session.expires_at > Utc::now());

        let principal = sf.authorize(&session.token).await.unwrap();
        assert_eq!(principal, Principal::new(user.id.clone(), Role::Customer));

        let header = format!("Bearer {}", session.token);
        assert_eq!(sf.authorize_header(&header).await.unwrap(), principal);

        // The password hash never leaves through serialization.
        let json = serde_json::to_value(&session).unwrap();
        assert!(json["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_rejections() {
        let sf = storefront();
        sf.register("a@example.com", "A", "pw", None).await.unwrap();

        let err = sf.register("a@example.com", "A", "pw", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = sf.register("", "A", "pw", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = sf.register("b@example.com", "B", "", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_authenticate_is_generic() {
        let sf = storefront();
        sf.register("a@example.com", "A", "right", None).await.unwrap();

        let wrong = sf.authenticate("a@example.com", "wrong").await.unwrap_err();
        let unknown = sf.authenticate("z@example.com", "right").await.unwrap_err();

        assert!(matches!(wrong.as_core(), Some(CoreError::InvalidCredentials)));
        assert!(matches!(unknown.as_core(), Some(CoreError::InvalidCredentials)));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_logout_revokes_valid_token() {
        let sf = storefront();
        sf.register("a@example.com", "A", "pw", None).await.unwrap();
        let session = sf.login("a@example.com", "pw").await.unwrap();

        assert!(sf.logout(&session.token).await.unwrap());
        assert!(!sf.logout(&session.token).await.unwrap());

        let err = sf.authorize(&session.token).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_expired_token_unauthorized() {
        let sf = storefront_with(TokenManager::new("test-secret", -60));
        sf.register("a@example.com", "A", "pw", None).await.unwrap();
        let session = sf.login("a@example.com", "pw").await.unwrap();

        let err = sf.authorize(&session.token).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        // The session record was already past expiry.
        assert_eq!(sf.purge_expired_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_forged_token_unauthorized() {
        let sf = storefront();
        let forger = TokenManager::new("other-secret", 3600);
        let forged = forger.issue("someone", Role::Admin).unwrap();

        let err = sf.authorize(&forged.token).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = sf.authorize_header("Token abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_ensure_admin_once() {
        let sf = storefront();
        let created = sf
            .ensure_admin("root@example.com", "Root", "pw")
            .await
            .unwrap();
        assert_eq!(created.map(|u| u.role), Some(Role::Admin));

        assert!(sf
            .ensure_admin("other@example.com", "Other", "pw")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_catalog_admin_only() {
        let sf = storefront();
        let admin = admin(&sf).await;
        let shopper = customer(&sf, "c@example.com").await;

        let err = sf
            .create_product(&shopper, laptop("XPS", 1000, 1, true))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let p = sf
            .create_product(&admin, laptop("XPS", 1000, 1, true))
            .await
            .unwrap();

        let err = sf
            .update_product(&shopper, &p.id, laptop("XPS", 1, 1, true))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        let err = sf.delete_product(&shopper, &p.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = sf
            .create_product(&admin, laptop("Bad", -1, 1, true))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert!(sf.delete_product(&admin, &p.id).await.unwrap());
        let err = sf.get_product(&p.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_inactive_products_visible_to_admin_only() {
        let sf = storefront();
        let admin = admin(&sf).await;
        let shopper = customer(&sf, "c@example.com").await;

        sf.create_product(&admin, laptop("Live", 1000, 1, true))
            .await
            .unwrap();
        sf.create_product(&admin, laptop("Retired", 500, 1, false))
            .await
            .unwrap();

        let filter = ProductFilter {
            include_inactive: true,
            sort: Some(ProductSort::PriceAsc),
            ..Default::default()
        };

        let seen = sf
            .list_products(Some(&shopper), filter.clone())
            .await
            .unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(sf.list_products(None, filter.clone()).await.unwrap().len(), 1);

        let all = sf.list_products(Some(&admin), filter).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].model_name, "Retired");
    }

    #[tokio::test]
    async fn test_compare_products() {
        let sf = storefront();
        let admin = admin(&sf).await;
        let a = sf
            .create_product(&admin, laptop("A", 150_000, 1, true))
            .await
            .unwrap();
        let b = sf
            .create_product(&admin, laptop("B", 100_000, 1, true))
            .await
            .unwrap();

        let cmp = sf.compare_products(&a.id, &b.id).await.unwrap();
        assert_eq!(cmp.price_diff_cents, 50_000);

        let err = sf.compare_products(&a.id, "missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_checkout_through_storefront() {
        let sf = storefront();
        let admin = admin(&sf).await;
        let shopper = customer(&sf, "c@example.com").await;
        let p = sf
            .create_product(&admin, laptop("P", 1000, 2, true))
            .await
            .unwrap();

        let err = sf.add_to_cart(&shopper, &p.id, 3).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);

        sf.add_to_cart(&shopper, &p.id, 2).await.unwrap();
        let order = sf.place_order(&shopper, None).await.unwrap();
        assert_eq!(order.total_cents, 2000);
        assert_eq!(order.user_id, shopper.user_id);

        assert!(sf.get_cart(&shopper).await.unwrap().is_empty());
        assert_eq!(sf.get_product(&p.id).await.unwrap().stock, 0);
        assert_eq!(sf.list_orders(&shopper).await.unwrap(), vec![order]);
        assert!(sf.list_orders(&admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_moderation() {
        let sf = storefront();
        let admin = admin(&sf).await;
        let shopper = customer(&sf, "c@example.com").await;
        let p = sf
            .create_product(&admin, laptop("P", 1000, 2, true))
            .await
            .unwrap();

        let review = sf.submit_review(&shopper, &p.id, 4, "solid").await.unwrap();
        assert_eq!(review.status, ReviewStatus::Pending);
        assert_eq!(review.user_id, shopper.user_id);

        // Customers cannot see pending reviews even when asking.
        assert!(sf
            .list_reviews(Some(&shopper), &p.id, true)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            sf.list_reviews(Some(&admin), &p.id, true).await.unwrap().len(),
            1
        );

        let err = sf
            .set_review_status(&shopper, &review.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let approved = sf.set_review_status(&admin, &review.id, None).await.unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);
        assert_eq!(sf.list_reviews(None, &p.id, false).await.unwrap().len(), 1);

        let rejected = sf
            .set_review_status(&admin, &review.id, Some(ReviewStatus::Rejected))
            .await
            .unwrap();
        assert_eq!(rejected.status, ReviewStatus::Rejected);
        assert!(sf.list_reviews(None, &p.id, false).await.unwrap().is_empty());
    }

    struct SlowHasher;

    impl CredentialHasher for SlowHasher {
        fn hash(&self, plaintext: &str) -> rapidtech_core::CoreResult<String> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(format!("slow${plaintext}"))
        }

        fn verify(&self, hash: &str, plaintext: &str) -> bool {
            hash == format!("slow${plaintext}")
        }
    }

    #[tokio::test]
    async fn test_timeout_leaves_no_user_behind() {
        let sf = Storefront::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SlowHasher),
            TokenManager::new("test-secret", 3600),
            Duration::from_millis(20),
        );

        let err = sf
            .register("late@example.com", "Late", "pw", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Timeout {
                operation: "register",
                ..
            }
        ));

        // Let the abandoned hash finish; nothing may be stored afterwards.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(sf
            .store()
            .find_user_by_email("late@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_from_config_memory_backend() {
        let config = StoreConfig::from_lookup(|key| match key {
            "STORE_BACKEND" => Some("memory".to_string()),
            _ => None,
        })
        .unwrap();

        let sf = Storefront::from_config(&config).await.unwrap();
        assert_eq!(sf.store().backend(), "memory");
    }

    #[tokio::test]
    async fn test_sqlite_backed_session_flow() {
        let sf = Storefront::new(
            Arc::new(SqliteStore::in_memory().await.unwrap()),
            Arc::new(test_hasher()),
            TokenManager::new("test-secret", 3600),
            Duration::from_secs(5),
        );

        sf.register("a@example.com", "A", "pw", None).await.unwrap();
        let session = sf.login("a@example.com", "pw").await.unwrap();
        assert!(sf.authorize(&session.token).await.is_ok());

        assert!(sf.logout(&session.token).await.unwrap());
        assert!(sf.authorize(&session.token).await.is_err());
    }
}
