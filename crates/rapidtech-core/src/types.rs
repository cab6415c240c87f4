//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Product      │   │     Review      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  email (unique) │   │  model_name     │   │  product_id ──────► Product
//! │  │  role           │   │  price_cents    │   │  rating 1..=5   │       │
//! │  │  password_hash  │   │  stock          │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Cart       │   │     Order       │   │    Session      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  user_id (1:1)  │   │  id (UUID)      │   │  token (unique) │       │
//! │  │  items[]        │   │  items[] (snap) │   │  user_id, role  │       │
//! │  │   product_id    │   │  total_cents    │   │  expires_at     │       │
//! │  │   quantity      │   │  status         │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## References By Identity
//! Carts, orders, reviews and sessions point at products and users by ID
//! only. Deleting or deactivating a product never rewrites an order line,
//! which carries its own price snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// The role a user (and therefore a session) carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular shopper.
    #[default]
    Customer,
    /// Privileged operator: catalog management and review moderation.
    Admin,
}

impl Role {
    /// Returns true for the privileged role.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "user" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["customer".to_string(), "admin".to_string()],
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
///
/// `password_hash` is kept for verification inside the store and is never
/// serialized outward.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login email. Unique, compared exactly as stored.
    pub email: String,

    /// Display name.
    pub full_name: String,

    /// One-way salted hash of the password.
    #[serde(default, skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,

    pub role: Role,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a new account record with a fresh identity.
    ///
    /// `password_hash` must already be the output of the credential hasher.
    pub fn new(
        email: impl Into<String>,
        full_name: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            full_name: full_name.into(),
            password_hash: password_hash.into(),
            role,
            created_at: now,
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.id.clone(), self.role)
    }
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated caller of a store operation.
///
/// Produced by the authorization gate from a verified token + live session,
/// then passed explicitly into every call that needs identity or role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Principal {
            user_id: user_id.into(),
            role,
        }
    }

    /// Returns true when the principal may perform admin-only operations.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// =============================================================================
// Product
// =============================================================================

/// Free-form laptop specification attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LaptopSpec {
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub ram: String,
    #[serde(default)]
    pub storage: String,
    #[serde(default)]
    pub storage_type: String,
    #[serde(default)]
    pub gpu: String,
    #[serde(default)]
    pub screen_size: String,
    #[serde(default)]
    pub screen_resolution: String,
}

/// A laptop listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4). Immutable.
    pub id: String,

    pub model_name: String,

    /// Brand reference (by identity).
    pub brand_id: String,

    /// Category reference (by identity).
    pub category_id: String,

    /// Price in cents. Never negative.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    pub description: Option<String>,

    /// Inactive products are hidden from shoppers and cannot be ordered.
    pub is_active: bool,

    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub specs: LaptopSpec,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if `quantity` units can be taken from current stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// The caller-supplied, mutable fields of a product.
///
/// Used for both create and full-replacement update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub model_name: String,
    pub brand_id: String,
    pub category_id: String,
    pub price_cents: i64,
    pub stock: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// `None` on create means active.
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub specs: LaptopSpec,
}

// =============================================================================
// Cart
// =============================================================================

/// One (product, quantity) pair inside a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    /// Always >= 1.
    pub quantity: i64,
}

/// A user's cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product merges)
/// - Line order is insertion order
/// - "No cart" and "empty cart" look the same to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartLine>,
    /// `None` until the cart is first persisted.
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Order
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been placed and stock reserved.
    #[default]
    Created,
}

/// An immutable order line.
/// Uses snapshot pattern to freeze the price at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns unit price × quantity, or `None` if it does not fit in cents.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().checked_multiply_quantity(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderLine>,
    /// Sum of line totals, in cents.
    pub total_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Review
// =============================================================================

/// Moderation state of a review.
///
/// ```text
/// pending ──► approved
///    │
///    └──────► rejected
/// ```
/// Overwriting an approved/rejected status is allowed (re-moderation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Approved => write!(f, "approved"),
            ReviewStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    "pending".to_string(),
                    "approved".to_string(),
                    "rejected".to_string(),
                ],
            }),
        }
    }
}

/// A user-submitted product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    /// 1..=5
    pub rating: i64,
    pub comment: String,
    pub status: ReviewStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Session
// =============================================================================

/// Server-side record binding an issued token to an identity.
///
/// Independent of the token's own cryptographic expiry: removing the record
/// revokes the token early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    /// Role at issue time.
    pub role: Role,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        user_id: impl Into<String>,
        role: Role,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Session {
            token: token.into(),
            user_id: user_id.into(),
            role,
            expires_at,
            created_at: now,
        }
    }

    /// A session strictly past its expiry is treated as absent.
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Customer".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("user".parse::<Role>().unwrap(), Role::Customer);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::default(), Role::Customer);
    }

    #[test]
    fn test_review_status_parse() {
        assert_eq!(
            "approved".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::Approved
        );
        assert_eq!(
            " REJECTED ".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::Rejected
        );
        assert!("spam".parse::<ReviewStatus>().is_err());
        assert_eq!(ReviewStatus::default(), ReviewStatus::Pending);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: "u-1".to_string(),
            email: "a@example.com".to_string(),
            full_name: "A".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Customer,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"customer\""));
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            product_id: "p".to_string(),
            quantity: 3,
            unit_price_cents: 250,
        };
        assert_eq!(line.line_total(), Some(Money::from_cents(750)));

        let huge = OrderLine {
            unit_price_cents: i64::MAX / 2,
            ..line
        };
        assert_eq!(huge.line_total(), None);
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session {
            token: "t".to_string(),
            user_id: "u".to_string(),
            role: Role::Customer,
            expires_at: now,
            created_at: now - Duration::hours(1),
        };
        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::seconds(1)));
    }
}
