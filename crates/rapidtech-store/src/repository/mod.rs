//! # Repository Module
//!
//! SQLite repositories behind [`crate::SqliteStore`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteStore::place_order                                              │
//! │       │                                                                 │
//! │       │  let mut tx = pool.begin()                                     │
//! │       ▼                                                                 │
//! │  CartRepository::load_in(&mut tx, ..)                                  │
//! │  ProductRepository::get_in / decrement_stock_in(&mut tx, ..)           │
//! │  OrderRepository::insert_in(&mut tx, ..)                               │
//! │  CartRepository::save_in / delete_in(&mut tx, ..)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tx.commit()   (dropping tx instead rolls everything back)             │
//! │                                                                         │
//! │  `*_in` functions take an open connection so one transaction can span  │
//! │  several repositories; `&self` methods run on the pool.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`] - Accounts, email lookup
//! - [`ProductRepository`] - Catalog CRUD, filtered listing, stock decrement
//! - [`CartRepository`] - Per-user cart lines
//! - [`OrderRepository`] - Orders and their price-snapshot lines
//! - [`ReviewRepository`] - Reviews and moderation status
//! - [`SessionRepository`] - Token records and expiry sweeps

pub mod cart;
pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod user;

pub use cart::CartRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use review::ReviewRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
