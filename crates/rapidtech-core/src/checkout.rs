//! # Checkout Planner
//!
//! Turns a cart (or part of it) into an order plan without touching any
//! state. Backends run the plan inside their critical section and only then
//! mutate stock, so every failure here leaves stock and cart unchanged.
//!
//! ## Placement Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. select_lines     cart + selection ─► (selected, remaining)          │
//! │                      CartEmpty / NoSelectedItems                        │
//! │                                                                         │
//! │  2. plan_order       every selected line re-resolved against live      │
//! │                      products (FULL pass, nothing mutated)             │
//! │                      ProductNotFound / InsufficientStock                │
//! │                      AmountOverflow                                     │
//! │                                                                         │
//! │  ── backend: decrement stock, insert order, prune cart ──              │
//! │                                                                         │
//! │  3. OrderPlan::into_order   price snapshot + total + fresh identity    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Cart, CartLine, Order, OrderLine, OrderStatus, Product};

/// The lines of a cart split by a checkout selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Lines to be ordered, in cart order.
    pub selected: Vec<CartLine>,
    /// Lines that stay in the cart for a later order.
    pub remaining: Vec<CartLine>,
}

impl Selection {
    /// True when the order consumes the whole cart.
    pub fn consumes_cart(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Splits `cart` into selected and remaining lines.
///
/// `product_ids` of `None` (or empty) selects every line. Ids that are not
/// in the cart are ignored.
pub fn select_lines(cart: Option<&Cart>, product_ids: Option<&[String]>) -> CoreResult<Selection> {
    let cart = match cart {
        Some(cart) if !cart.items.is_empty() => cart,
        _ => return Err(CoreError::CartEmpty),
    };

    let wanted = match product_ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => {
            return Ok(Selection {
                selected: cart.items.clone(),
                remaining: Vec::new(),
            })
        }
    };

    let (selected, remaining): (Vec<CartLine>, Vec<CartLine>) = cart
        .items
        .iter()
        .cloned()
        .partition(|line| wanted.iter().any(|id| *id == line.product_id));

    if selected.is_empty() {
        return Err(CoreError::NoSelectedItems);
    }

    Ok(Selection {
        selected,
        remaining,
    })
}

/// A validated order that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    pub user_id: String,
    /// Lines with the unit price captured during validation.
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

/// Validates every selected line against live products.
///
/// `lookup` resolves a product by id as it currently stands. The whole pass
/// completes before the caller decrements anything; the first failing line
/// aborts the plan.
pub fn plan_order<F>(user_id: &str, selected: &[CartLine], mut lookup: F) -> CoreResult<OrderPlan>
where
    F: FnMut(&str) -> Option<Product>,
{
    if selected.is_empty() {
        return Err(CoreError::CartEmpty);
    }

    let mut lines = Vec::with_capacity(selected.len());
    let mut total = Money::zero();
    for line in selected {
        let product = match lookup(&line.product_id) {
            Some(p) if p.is_active => p,
            _ => return Err(CoreError::ProductNotFound(line.product_id.clone())),
        };

        if !product.has_stock_for(line.quantity) {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: line.quantity,
            });
        }

        let order_line = OrderLine {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price_cents: product.price_cents,
        };
        total = order_line
            .line_total()
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or_else(|| CoreError::AmountOverflow {
                product_id: line.product_id.clone(),
            })?;
        lines.push(order_line);
    }

    Ok(OrderPlan {
        user_id: user_id.to_string(),
        lines,
        total,
    })
}

impl OrderPlan {
    /// Freezes the plan into an order with a fresh identity.
    pub fn into_order(self, now: DateTime<Utc>) -> Order {
        Order {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id,
            items: self.lines,
            total_cents: self.total.cents(),
            status: OrderStatus::Created,
            created_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::new_product;
    use crate::types::ProductInput;
    use std::collections::HashMap;

    fn product(price: i64, stock: i64) -> Product {
        new_product(
            ProductInput {
                model_name: "Legion 5".to_string(),
                brand_id: "lenovo".to_string(),
                category_id: "gaming".to_string(),
                price_cents: price,
                stock,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    fn cart(lines: &[(&str, i64)]) -> Cart {
        Cart {
            user_id: "u1".to_string(),
            items: lines
                .iter()
                .map(|(id, qty)| CartLine {
                    product_id: id.to_string(),
                    quantity: *qty,
                })
                .collect(),
            updated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_select_whole_cart() {
        let c = cart(&[("a", 1), ("b", 2)]);
        let sel = select_lines(Some(&c), None).unwrap();
        assert_eq!(sel.selected.len(), 2);
        assert!(sel.consumes_cart());

        let sel = select_lines(Some(&c), Some(&[])).unwrap();
        assert!(sel.consumes_cart());
    }

    #[test]
    fn test_select_subset() {
        let c = cart(&[("a", 1), ("b", 2), ("c", 3)]);
        let ids = vec!["c".to_string(), "a".to_string(), "zzz".to_string()];
        let sel = select_lines(Some(&c), Some(&ids)).unwrap();

        let picked: Vec<_> = sel.selected.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(picked, vec!["a", "c"]);
        assert_eq!(sel.remaining, vec![CartLine { product_id: "b".to_string(), quantity: 2 }]);
    }

    #[test]
    fn test_select_errors() {
        assert!(matches!(select_lines(None, None), Err(CoreError::CartEmpty)));
        assert!(matches!(
            select_lines(Some(&cart(&[])), None),
            Err(CoreError::CartEmpty)
        ));

        let ids = vec!["nope".to_string()];
        assert!(matches!(
            select_lines(Some(&cart(&[("a", 1)])), Some(&ids)),
            Err(CoreError::NoSelectedItems)
        ));
    }

    #[test]
    fn test_plan_snapshots_price_and_total() {
        let a = product(1000, 5);
        let b = product(250, 5);
        let catalog: HashMap<_, _> = [(a.id.clone(), a.clone()), (b.id.clone(), b.clone())].into();

        let lines = vec![
            CartLine { product_id: a.id.clone(), quantity: 2 },
            CartLine { product_id: b.id.clone(), quantity: 3 },
        ];
        let plan = plan_order("u1", &lines, |id| catalog.get(id).cloned()).unwrap();

        assert_eq!(plan.total.cents(), 2750);
        assert_eq!(plan.lines[0].unit_price_cents, 1000);

        let order = plan.into_order(Utc::now());
        assert_eq!(order.total_cents, 2750);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn test_plan_fails_on_any_line() {
        let ok = product(1000, 5);
        let short = product(500, 1);
        let mut inactive = product(500, 9);
        inactive.is_active = false;
        let catalog: HashMap<_, _> = [
            (ok.id.clone(), ok.clone()),
            (short.id.clone(), short.clone()),
            (inactive.id.clone(), inactive.clone()),
        ]
        .into();
        let lookup = |id: &str| catalog.get(id).cloned();

        let lines = vec![
            CartLine { product_id: ok.id.clone(), quantity: 1 },
            CartLine { product_id: short.id.clone(), quantity: 2 },
        ];
        assert!(matches!(
            plan_order("u1", &lines, lookup),
            Err(CoreError::InsufficientStock { available: 1, requested: 2, .. })
        ));

        let lines = vec![CartLine { product_id: inactive.id.clone(), quantity: 1 }];
        assert!(matches!(
            plan_order("u1", &lines, lookup),
            Err(CoreError::ProductNotFound(_))
        ));

        let lines = vec![CartLine { product_id: "gone".to_string(), quantity: 1 }];
        assert!(matches!(
            plan_order("u1", &lines, lookup),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_plan_rejects_amount_overflow() {
        let pricey = product(i64::MAX / 2, 3);
        let also = product(i64::MAX / 2, 3);
        let catalog: HashMap<_, _> = [
            (pricey.id.clone(), pricey.clone()),
            (also.id.clone(), also.clone()),
        ]
        .into();
        let lookup = |id: &str| catalog.get(id).cloned();

        let lines = vec![CartLine { product_id: pricey.id.clone(), quantity: 3 }];
        assert!(matches!(
            plan_order("u1", &lines, lookup),
            Err(CoreError::AmountOverflow { product_id }) if product_id == pricey.id
        ));

        // Each line fits; their sum does not.
        let lines = vec![
            CartLine { product_id: pricey.id.clone(), quantity: 2 },
            CartLine { product_id: also.id.clone(), quantity: 1 },
        ];
        assert!(matches!(
            plan_order("u1", &lines, lookup),
            Err(CoreError::AmountOverflow { product_id }) if product_id == also.id
        ));
    }
}
