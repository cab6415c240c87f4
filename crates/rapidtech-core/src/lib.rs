//! # rapidtech-core: Pure Business Logic for the RapidTech Storefront
//!
//! Every storefront rule that does not need I/O lives here: the catalog
//! filter, cart merging, the checkout planner, validation and the error
//! taxonomy. Both store backends call into this crate, which is what keeps
//! their observable behaviour identical.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RapidTech Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               HTTP API (outside this workspace)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            rapidtech-store: Storefront + Store backends         │   │
//! │  │     auth gate, deadlines, MemoryStore / SqliteStore             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ rapidtech-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │ catalog  │ │   cart   │ │ checkout │          │   │
//! │  │   │ Product  │ │  Filter  │ │ add_line │ │   plan   │          │   │
//! │  │   │  Order   │ │   Sort   │ │  merge   │ │ snapshot │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (User, Product, Cart, Order, Review, Session)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types and the [`ErrorKind`] taxonomy
//! - [`validation`] - Input validation
//! - [`catalog`] - Filter/sort semantics and product record building
//! - [`cart`] - Cart merge and stock rules
//! - [`checkout`] - Order placement planner
//! - [`review`] - Review submission and moderation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use rapidtech_core::catalog::{new_product, ProductFilter, ProductSort};
//! use rapidtech_core::ProductInput;
//!
//! let laptop = new_product(
//!     ProductInput {
//!         model_name: "MacBook Air".to_string(),
//!         brand_id: "apple".to_string(),
//!         category_id: "ultrabook".to_string(),
//!         price_cents: 109_900,
//!         stock: 3,
//!         ..Default::default()
//!     },
//!     chrono::Utc::now(),
//! );
//!
//! let filter = ProductFilter {
//!     price_max_cents: Some(120_000),
//!     sort: Some(ProductSort::PriceAsc),
//!     ..Default::default()
//! };
//! assert_eq!(filter.apply([&laptop]).len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod money;
pub mod review;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{ProductComparison, ProductFilter, ProductSort};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Lowest accepted review rating.
pub const MIN_RATING: i64 = 1;

/// Highest accepted review rating.
pub const MAX_RATING: i64 = 5;

/// Bootstrap administrator email used when none is configured.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@rapidtech.local";

/// Bootstrap administrator display name used when none is configured.
pub const DEFAULT_ADMIN_FULL_NAME: &str = "Admin";

/// Bootstrap administrator password used when none is configured.
///
/// Development only; deployments set `ADMIN_PASSWORD`.
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin123!";
