//! In-process Store.
//!
//! All state sits behind one `tokio::sync::RwLock`. Every write operation
//! takes the exclusive guard for its whole read-check-write sequence and
//! never awaits while holding it, so each operation is atomic with respect
//! to every other.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreResult;
use crate::store::Store;
use rapidtech_core::cart::add_line;
use rapidtech_core::catalog::{apply_update, new_product};
use rapidtech_core::checkout::{plan_order, select_lines};
use rapidtech_core::review::{is_listed, new_review, newest_first};
use rapidtech_core::validation::validate_product_input;
use rapidtech_core::{
    Cart, CoreError, Order, Product, ProductFilter, ProductInput, Review, ReviewStatus, Role,
    Session, User,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, User>,
    /// email → user id
    emails: HashMap<String, String>,
    products: HashMap<String, Product>,
    carts: HashMap<String, Cart>,
    /// Append order; listing sorts.
    orders: Vec<Order>,
    reviews: HashMap<String, Review>,
    sessions: HashMap<String, Session>,
}

/// Store kept entirely in memory. Lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.emails.contains_key(&user.email) {
            return Err(CoreError::EmailTaken(user.email).into());
        }

        state.emails.insert(user.email.clone(), user.id.clone());
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .emails
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn has_admin(&self) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|u| u.role == Role::Admin))
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(filter.apply(state.products.values()))
    }

    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.state.read().await.products.get(id).cloned())
    }

    async fn insert_product(&self, input: ProductInput) -> StoreResult<Product> {
        validate_product_input(&input)?;
        let product = new_product(input, Utc::now());

        let mut state = self.state.write().await;
        state.products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &str, input: ProductInput) -> StoreResult<Product> {
        validate_product_input(&input)?;

        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        apply_update(product, input, Utc::now());
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        Ok(self.state.write().await.products.remove(id).is_some())
    }

    async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Cart> {
        let mut state = self.state.write().await;
        let State {
            products, carts, ..
        } = &mut *state;

        let product = products
            .get(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        // Work on a copy so a rejected add leaves the stored cart untouched.
        let mut cart = carts
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id));
        let quantity = add_line(&mut cart, product, quantity, Utc::now())?;

        debug!(user_id = %user_id, product_id = %product_id, quantity, "Cart line updated");
        carts.insert(user_id.to_string(), cart.clone());
        Ok(cart)
    }

    async fn get_cart(&self, user_id: &str) -> StoreResult<Cart> {
        let state = self.state.read().await;
        Ok(state
            .carts
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id)))
    }

    async fn place_order(
        &self,
        user_id: &str,
        product_ids: Option<&[String]>,
    ) -> StoreResult<Order> {
        let mut state = self.state.write().await;
        let State {
            products,
            carts,
            orders,
            ..
        } = &mut *state;

        // Validation pass: nothing is mutated until every line checks out.
        let selection = select_lines(carts.get(user_id), product_ids)?;
        let plan = plan_order(user_id, &selection.selected, |id| products.get(id).cloned())?;

        let now = Utc::now();
        for line in &plan.lines {
            if let Some(product) = products.get_mut(&line.product_id) {
                product.stock -= line.quantity;
                product.updated_at = now;
            }
        }

        if selection.consumes_cart() {
            carts.remove(user_id);
        } else if let Some(cart) = carts.get_mut(user_id) {
            cart.items = selection.remaining;
            cart.updated_at = Some(now);
        }

        let order = plan.into_order(now);
        orders.push(order.clone());
        Ok(order)
    }

    async fn list_orders(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();

        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    async fn insert_review(
        &self,
        user_id: &str,
        product_id: &str,
        rating: i64,
        comment: &str,
    ) -> StoreResult<Review> {
        let review = new_review(user_id, product_id, rating, comment, Utc::now())?;

        let mut state = self.state.write().await;
        if !state.products.contains_key(product_id) {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        state.reviews.insert(review.id.clone(), review.clone());
        Ok(review)
    }

    async fn list_reviews(
        &self,
        product_id: &str,
        include_pending: bool,
    ) -> StoreResult<Vec<Review>> {
        let state = self.state.read().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| r.product_id == product_id && is_listed(r, include_pending))
            .cloned()
            .collect();

        reviews.sort_by(newest_first);
        Ok(reviews)
    }

    async fn set_review_status(&self, id: &str, status: ReviewStatus) -> StoreResult<Review> {
        let mut state = self.state.write().await;
        let review = state
            .reviews
            .get_mut(id)
            .ok_or_else(|| CoreError::ReviewNotFound(id.to_string()))?;

        review.status = status;
        Ok(review.clone())
    }

    async fn create_session(&self, session: Session) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn session_valid(&self, token: &str) -> StoreResult<bool> {
        let now = Utc::now();
        let mut state = self.state.write().await;

        match state.sessions.get(token) {
            None => Ok(false),
            Some(session) if session.is_expired_at(now) => {
                state.sessions.remove(token);
                Ok(false)
            }
            Some(_) => Ok(true),
        }
    }

    async fn revoke_session(&self, token: &str) -> StoreResult<bool> {
        Ok(self.state.write().await.sessions.remove(token).is_some())
    }

    async fn purge_expired_sessions(&self) -> StoreResult<u64> {
        let now = Utc::now();
        let mut state = self.state.write().await;

        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - state.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    crate::store::store_contract_tests!(super::MemoryStore::new());
}
