//! # Cart Rules
//!
//! Merge and stock rules for adding to a cart. Both backends call
//! [`add_line`] on a cart they loaded inside their critical section, then
//! persist the result.
//!
//! ```text
//! add_line(cart, product, qty)
//!      │
//!      ├── qty <= 0 ──────────────► qty = 1
//!      ├── product inactive ──────► ProductNotFound
//!      ├── existing + qty > stock ► OutOfStock
//!      │
//!      ├── line for product? ─yes─► quantity += qty   (merge, never duplicate)
//!      └──────────────────────no──► push new line     (insertion order kept)
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Cart, CartLine, Product};
use crate::validation::normalize_quantity;

impl Cart {
    /// The cart a user has before anything was added.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Cart {
            user_id: user_id.into(),
            items: Vec::new(),
            updated_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of `product_id` currently in the cart (0 when absent).
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }
}

/// Adds `quantity` of `product` to `cart`, merging with an existing line.
///
/// The cart is untouched when an error is returned. Returns the quantity the
/// line holds afterwards.
pub fn add_line(
    cart: &mut Cart,
    product: &Product,
    quantity: i64,
    now: DateTime<Utc>,
) -> CoreResult<i64> {
    if !product.is_active {
        return Err(CoreError::ProductNotFound(product.id.clone()));
    }

    let quantity = normalize_quantity(quantity);
    let held = cart.quantity_of(&product.id);
    let wanted = match held.checked_add(quantity) {
        Some(wanted) if product.has_stock_for(wanted) => wanted,
        _ => {
            return Err(CoreError::OutOfStock {
                product_id: product.id.clone(),
                available: product.stock,
                requested: held.saturating_add(quantity),
            })
        }
    };

    match cart
        .items
        .iter_mut()
        .find(|line| line.product_id == product.id)
    {
        Some(line) => line.quantity = wanted,
        None => cart.items.push(CartLine {
            product_id: product.id.clone(),
            quantity,
        }),
    }
    cart.updated_at = Some(now);

    Ok(wanted)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::new_product;
    use crate::types::ProductInput;

    fn product(stock: i64) -> Product {
        new_product(
            ProductInput {
                model_name: "XPS 13".to_string(),
                brand_id: "dell".to_string(),
                category_id: "ultrabook".to_string(),
                price_cents: 1000,
                stock,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_merge_same_product() {
        let p = product(10);
        let mut cart = Cart::empty("u1");

        add_line(&mut cart, &p, 2, Utc::now()).unwrap();
        add_line(&mut cart, &p, 3, Utc::now()).unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert!(cart.updated_at.is_some());
    }

    #[test]
    fn test_insertion_order_kept() {
        let a = product(10);
        let b = product(10);
        let mut cart = Cart::empty("u1");

        add_line(&mut cart, &a, 1, Utc::now()).unwrap();
        add_line(&mut cart, &b, 1, Utc::now()).unwrap();
        add_line(&mut cart, &a, 1, Utc::now()).unwrap();

        let ids: Vec<_> = cart.items.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), b.id.as_str()]);
    }

    #[test]
    fn test_non_positive_quantity_is_one() {
        let p = product(10);
        let mut cart = Cart::empty("u1");

        assert_eq!(add_line(&mut cart, &p, 0, Utc::now()).unwrap(), 1);
        assert_eq!(add_line(&mut cart, &p, -4, Utc::now()).unwrap(), 2);
    }

    #[test]
    fn test_stock_counts_existing_line() {
        let p = product(2);
        let mut cart = Cart::empty("u1");

        let err = add_line(&mut cart, &p, 3, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::OutOfStock { available: 2, requested: 3, .. }
        ));
        assert!(cart.is_empty());

        add_line(&mut cart, &p, 2, Utc::now()).unwrap();
        let err = add_line(&mut cart, &p, 1, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { requested: 3, .. }));
        assert_eq!(cart.quantity_of(&p.id), 2);
    }

    #[test]
    fn test_quantity_overflow_rejected() {
        for stock in [10, i64::MAX] {
            let p = product(stock);
            let mut cart = Cart::empty("u1");
            add_line(&mut cart, &p, 1, Utc::now()).unwrap();

            let err = add_line(&mut cart, &p, i64::MAX, Utc::now()).unwrap_err();
            assert!(matches!(
                err,
                CoreError::OutOfStock { requested: i64::MAX, .. }
            ));
            assert_eq!(cart.items.len(), 1);
            assert_eq!(cart.quantity_of(&p.id), 1);
        }
    }

    #[test]
    fn test_inactive_product_rejected() {
        let mut p = product(5);
        p.is_active = false;
        let mut cart = Cart::empty("u1");

        assert!(matches!(
            add_line(&mut cart, &p, 1, Utc::now()),
            Err(CoreError::ProductNotFound(_))
        ));
        assert!(cart.updated_at.is_none());
    }
}
