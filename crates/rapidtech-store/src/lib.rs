//! # rapidtech-store: State Owner for the Laptop Storefront
//!
//! This crate owns every piece of mutable storefront state (users, catalog,
//! carts, orders, reviews, sessions) and the gate in front of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RapidTech Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /orders)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 rapidtech-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   Storefront ── authorize ── TokenManager / CredentialHasher   │   │
//! │  │       │                                                         │   │
//! │  │       ▼                                                         │   │
//! │  │   dyn Store                                                     │   │
//! │  │   ├── MemoryStore   (RwLock<State>)                            │   │
//! │  │   └── SqliteStore   (Database → Repositories → Migrations)     │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./rapidtech.db  (or sqlite::memory: in tests)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`storefront`] - Authorization gate and per-operation deadlines
//! - [`store`] - The `Store` contract and its two backends
//! - [`auth`] - Password hashing and JWT tokens
//! - [`config`] - Environment-driven configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQLite repositories (product, cart, order, ...)
//! - [`error`] - Database and store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rapidtech_store::{StoreConfig, Storefront};
//!
//! let config = StoreConfig::load()?;
//! let storefront = Storefront::from_config(&config).await?;
//!
//! let session = storefront.login("jane@example.com", "s3cret").await?;
//! let principal = storefront.authorize(&session.token).await?;
//! let order = storefront.place_order(&principal, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;
pub mod storefront;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{Argon2Hasher, CredentialHasher, TokenManager};
pub use config::{BackendKind, ConfigError, StoreConfig};
pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use store::{MemoryStore, SqliteStore, Store};
pub use storefront::{AuthSession, Storefront};

// Repository re-exports for convenience
pub use repository::{
    CartRepository, OrderRepository, ProductRepository, ReviewRepository, SessionRepository,
    UserRepository,
};
