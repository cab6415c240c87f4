//! # Error Types
//!
//! Domain-specific error types for rapidtech-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rapidtech-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Coarse taxonomy for callers (HTTP mapping)     │
//! │                                                                         │
//! │  rapidtech-store errors (separate crate)                               │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── StoreError       - What every Store/Storefront call returns       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product ID, email, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every error answers `kind()` so the HTTP layer can pick a status code

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse error taxonomy shared by every error type in the workspace.
///
/// ## HTTP Mapping (performed by the caller, not here)
/// ```text
/// InvalidInput  → 400     Unauthorized → 401     Forbidden → 403
/// NotFound      → 404     Conflict     → 409     StateConflict → 422
/// Internal      → 500
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or missing required field.
    InvalidInput,
    /// Entity absent.
    NotFound,
    /// Duplicate unique key (e.g. email).
    Conflict,
    /// Missing, invalid or expired credential or session.
    Unauthorized,
    /// Authenticated, but the role is insufficient.
    Forbidden,
    /// Business-rule violation: stock, empty cart, rating range.
    StateConflict,
    /// Unexpected collaborator failure (hashing, persistence).
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are returned to the caller untouched; the store never swallows them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (or is inactive where an active one is needed).
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist
    /// - Product was deleted after being added to a cart
    /// - Product was deactivated before checkout
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Review cannot be found.
    #[error("Review not found: {0}")]
    ReviewNotFound(String),

    /// User cannot be found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Email is already registered.
    #[error("User already exists: {0}")]
    EmailTaken(String),

    /// Generic login failure.
    ///
    /// Used for both "no such user" and "wrong password" so that a caller
    /// cannot probe which emails are registered.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, invalid, expired or revoked token/session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Adding to cart would exceed what is currently in stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 3)
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// OutOfStock { product_id, available: 2, requested: 3 }
    /// ```
    #[error("Out of stock for {product_id}: available {available}, requested {requested}")]
    OutOfStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Insufficient stock to place an order.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// A line total or the order total does not fit in i64 cents.
    #[error("Order amount too large at {product_id}")]
    AmountOverflow { product_id: String },

    /// The user has no cart, or the cart has no lines.
    #[error("Cart is empty")]
    CartEmpty,

    /// An explicit item selection matched no line in the cart.
    #[error("No selected items found in cart")]
    NoSelectedItems,

    /// Review rating outside 1..=5.
    #[error("Rating must be between {min} and {max}, got {rating}")]
    InvalidRating { rating: i64, min: i64, max: i64 },

    /// Password hashing collaborator failed.
    #[error("Password hashing failed: {0}")]
    HashFailure(String),

    /// A token could not be signed.
    #[error("Token signing failed: {0}")]
    TokenFailure(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_)
            | CoreError::ReviewNotFound(_)
            | CoreError::UserNotFound(_) => ErrorKind::NotFound,
            CoreError::EmailTaken(_) => ErrorKind::Conflict,
            CoreError::InvalidCredentials | CoreError::Unauthorized(_) => ErrorKind::Unauthorized,
            CoreError::Forbidden(_) => ErrorKind::Forbidden,
            CoreError::OutOfStock { .. }
            | CoreError::InsufficientStock { .. }
            | CoreError::AmountOverflow { .. }
            | CoreError::CartEmpty
            | CoreError::NoSelectedItems
            | CoreError::InvalidRating { .. } => ErrorKind::StateConflict,
            CoreError::HashFailure(_) | CoreError::TokenFailure(_) => ErrorKind::Internal,
            CoreError::Validation(_) => ErrorKind::InvalidInput,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any state is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed email, unknown sort key).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
