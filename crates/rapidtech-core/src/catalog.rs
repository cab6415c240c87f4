//! # Catalog Rules
//!
//! Filter, sort and record-building semantics for the product catalog.
//!
//! ## Filter Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductFilter field      Match rule                                    │
//! │  ─────────────────────    ───────────────────────────────────────────   │
//! │  brand_id, category_id    exact                                         │
//! │  cpu, ram, gpu,           exact on the spec attribute                   │
//! │  storage_type                                                           │
//! │  price_min_cents          price >= min (inclusive)                      │
//! │  price_max_cents          price <= max (inclusive)                      │
//! │  include_inactive=false   only is_active products                       │
//! │                                                                         │
//! │  None or "" on any field → field ignored (never an error)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The SQLite backend translates the same rules into a WHERE/ORDER BY; the
//! in-memory backend calls [`ProductFilter::apply`]. The shared contract
//! tests hold both to the same results.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{Product, ProductInput};

// =============================================================================
// Sort
// =============================================================================

/// Sort key for catalog listings.
///
/// Without a sort key listings are oldest-first (creation time, then id),
/// which both backends reproduce exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Newest,
}

impl std::str::FromStr for ProductSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price_asc" => Ok(ProductSort::PriceAsc),
            "price_desc" => Ok(ProductSort::PriceDesc),
            "newest" => Ok(ProductSort::Newest),
            _ => Err(ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: vec![
                    "price_asc".to_string(),
                    "price_desc".to_string(),
                    "newest".to_string(),
                ],
            }),
        }
    }
}

/// Insertion-order tiebreak shared by every sort.
fn oldest_first(a: &Product, b: &Product) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Orders products by the given sort key (or oldest-first).
pub fn sort_products(products: &mut [Product], sort: Option<ProductSort>) {
    match sort {
        Some(ProductSort::PriceAsc) => products.sort_by(|a, b| {
            a.price_cents
                .cmp(&b.price_cents)
                .then_with(|| oldest_first(a, b))
        }),
        Some(ProductSort::PriceDesc) => products.sort_by(|a, b| {
            b.price_cents
                .cmp(&a.price_cents)
                .then_with(|| oldest_first(a, b))
        }),
        Some(ProductSort::Newest) => products.sort_by(|a, b| oldest_first(b, a)),
        None => products.sort_by(oldest_first),
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Catalog listing filter. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductFilter {
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub ram: Option<String>,
    #[serde(default)]
    pub gpu: Option<String>,
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub price_min_cents: Option<i64>,
    #[serde(default)]
    pub price_max_cents: Option<i64>,
    #[serde(default)]
    pub sort: Option<ProductSort>,
    /// Include inactive products (honoured for administrators only).
    #[serde(default)]
    pub include_inactive: bool,
}

/// Returns the value when it is set and not blank.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn field_matches(wanted: &Option<String>, actual: &str) -> bool {
    match non_empty(wanted) {
        Some(w) => w == actual,
        None => true,
    }
}

impl ProductFilter {
    /// Checks a single product against every set field.
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active {
            return false;
        }

        if let Some(min) = self.price_min_cents {
            if product.price_cents < min {
                return false;
            }
        }
        if let Some(max) = self.price_max_cents {
            if product.price_cents > max {
                return false;
            }
        }

        field_matches(&self.brand_id, &product.brand_id)
            && field_matches(&self.category_id, &product.category_id)
            && field_matches(&self.cpu, &product.specs.cpu)
            && field_matches(&self.ram, &product.specs.ram)
            && field_matches(&self.gpu, &product.specs.gpu)
            && field_matches(&self.storage_type, &product.specs.storage_type)
    }

    /// Filters and sorts an in-process product collection.
    pub fn apply<'a, I>(&self, products: I) -> Vec<Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut out: Vec<Product> = products
            .into_iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        sort_products(&mut out, self.sort);
        out
    }
}

// =============================================================================
// Record Building
// =============================================================================

/// Builds a new product from a validated input.
///
/// Assigns a fresh identity and stamps created/updated with `now`. An unset
/// active flag means active.
pub fn new_product(input: ProductInput, now: DateTime<Utc>) -> Product {
    Product {
        id: Uuid::new_v4().to_string(),
        model_name: input.model_name,
        brand_id: input.brand_id,
        category_id: input.category_id,
        price_cents: input.price_cents,
        stock: input.stock,
        description: input.description,
        is_active: input.is_active.unwrap_or(true),
        specs: input.specs,
        created_at: now,
        updated_at: now,
    }
}

/// Full replacement of the mutable fields; identity and creation time stay.
///
/// An unset active flag keeps the current value.
pub fn apply_update(product: &mut Product, input: ProductInput, now: DateTime<Utc>) {
    product.model_name = input.model_name;
    product.brand_id = input.brand_id;
    product.category_id = input.category_id;
    product.price_cents = input.price_cents;
    product.stock = input.stock;
    product.description = input.description;
    product.is_active = input.is_active.unwrap_or(product.is_active);
    product.specs = input.specs;
    product.updated_at = now;
}

// =============================================================================
// Comparison
// =============================================================================

/// Side-by-side view of two products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductComparison {
    pub first: Product,
    pub second: Product,
    /// first.price - second.price, in cents (may be negative).
    pub price_diff_cents: i64,
}

impl ProductComparison {
    pub fn between(first: Product, second: Product) -> Self {
        let price_diff_cents = (first.price() - second.price()).cents();
        ProductComparison {
            first,
            second,
            price_diff_cents,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LaptopSpec;
    use chrono::Duration;

    fn product(name: &str, brand: &str, price: i64, active: bool, age_secs: i64) -> Product {
        let mut p = new_product(
            ProductInput {
                model_name: name.to_string(),
                brand_id: brand.to_string(),
                category_id: "laptop".to_string(),
                price_cents: price,
                stock: 1,
                is_active: Some(active),
                specs: LaptopSpec {
                    cpu: "i7".to_string(),
                    ram: "16GB".to_string(),
                    storage_type: "ssd".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            Utc::now(),
        );
        p.created_at = p.created_at - Duration::seconds(age_secs);
        p
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.model_name.as_str()).collect()
    }

    #[test]
    fn test_default_filter_hides_inactive() {
        let items = vec![
            product("a", "dell", 100, true, 30),
            product("b", "dell", 200, false, 20),
            product("c", "hp", 300, true, 10),
        ];

        let visible = ProductFilter::default().apply(&items);
        assert_eq!(names(&visible), vec!["a", "c"]);

        let all = ProductFilter {
            include_inactive: true,
            ..Default::default()
        }
        .apply(&items);
        assert_eq!(names(&all), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_field_and_price_filters() {
        let items = vec![
            product("a", "dell", 100, true, 30),
            product("b", "dell", 250, true, 20),
            product("c", "hp", 300, true, 10),
        ];

        let filter = ProductFilter {
            brand_id: Some("dell".to_string()),
            price_min_cents: Some(150),
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(&items)), vec!["b"]);

        let filter = ProductFilter {
            price_max_cents: Some(250),
            cpu: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(&items)), vec!["a", "b"]);

        let filter = ProductFilter {
            gpu: Some("rtx4090".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(&items).is_empty());
    }

    #[test]
    fn test_sorting() {
        let items = vec![
            product("mid", "x", 200, true, 20),
            product("cheap", "x", 100, true, 30),
            product("dear", "x", 300, true, 10),
        ];

        let mut f = ProductFilter {
            sort: Some(ProductSort::PriceAsc),
            ..Default::default()
        };
        assert_eq!(names(&f.apply(&items)), vec!["cheap", "mid", "dear"]);

        f.sort = Some(ProductSort::PriceDesc);
        assert_eq!(names(&f.apply(&items)), vec!["dear", "mid", "cheap"]);

        f.sort = Some(ProductSort::Newest);
        assert_eq!(names(&f.apply(&items)), vec!["dear", "mid", "cheap"]);

        f.sort = None;
        assert_eq!(names(&f.apply(&items)), vec!["cheap", "mid", "dear"]);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("price_asc".parse::<ProductSort>().unwrap(), ProductSort::PriceAsc);
        assert_eq!("newest".parse::<ProductSort>().unwrap(), ProductSort::Newest);
        assert!("popular".parse::<ProductSort>().is_err());
    }

    #[test]
    fn test_update_keeps_identity() {
        let mut p = product("old", "dell", 100, true, 60);
        let id = p.id.clone();
        let created = p.created_at;

        apply_update(
            &mut p,
            ProductInput {
                model_name: "new".to_string(),
                brand_id: "hp".to_string(),
                category_id: "gaming".to_string(),
                price_cents: 500,
                stock: 9,
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(p.id, id);
        assert_eq!(p.created_at, created);
        assert!(p.updated_at > created);
        assert_eq!(p.model_name, "new");
        assert_eq!(p.stock, 9);
        assert!(p.is_active);
    }

    #[test]
    fn test_comparison() {
        let a = product("a", "x", 150_000, true, 0);
        let b = product("b", "x", 120_000, true, 0);
        let cmp = ProductComparison::between(a, b);
        assert_eq!(cmp.price_diff_cents, 30_000);
    }
}
