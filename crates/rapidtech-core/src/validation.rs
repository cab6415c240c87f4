//! # Validation Module
//!
//! Input validation utilities for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (outside this workspace)                       │
//! │  ├── JSON shape, required fields                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Storefront (Rust)                                            │
//! │  └── THIS MODULE: Business rule validation, before any lock is taken  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE constraints (email)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Negative prices and stock are rejected, never clamped: a negative value
//! is a caller bug and should surface as one.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::ProductInput;
use crate::{MAX_RATING, MIN_RATING};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a registration email.
///
/// ## Rules
/// - Must not be empty
/// - Must contain `@`
/// - At most 254 characters
///
/// The email is NOT normalized: uniqueness is checked against the exact
/// stored string.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    if !email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must contain '@'".to_string(),
        });
    }

    Ok(())
}

/// Validates a registration password (must not be empty).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product model name.
///
/// ## Example
/// ```rust
/// use rapidtech_core::validation::validate_model_name;
///
/// assert!(validate_model_name("ThinkPad X1 Carbon").is_ok());
/// assert!(validate_model_name("  ").is_err());
/// ```
pub fn validate_model_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "model_name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "model_name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a brand/category reference (must not be blank).
pub fn validate_reference(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Example
/// ```rust
/// use rapidtech_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(129_900).is_ok());
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Rejected, not clamped
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock count (must be >= 0).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates every field of a product create/update payload.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_model_name(&input.model_name)?;
    validate_reference("brand_id", &input.brand_id)?;
    validate_reference("category_id", &input.category_id)?;
    validate_price_cents(input.price_cents)?;
    validate_stock(input.stock)?;
    Ok(())
}

// =============================================================================
// Cart / Review Rules
// =============================================================================

/// Normalizes a requested cart quantity: anything <= 0 becomes 1.
#[inline]
pub fn normalize_quantity(qty: i64) -> i64 {
    if qty <= 0 {
        1
    } else {
        qty
    }
}

/// Validates a review rating (1..=5).
///
/// Out-of-range ratings are a business-rule violation, not malformed input.
pub fn validate_rating(rating: i64) -> CoreResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::InvalidRating {
            rating,
            min: MIN_RATING,
            max: MAX_RATING,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            model_name: "Zenbook 14".to_string(),
            brand_id: "asus".to_string(),
            category_id: "ultrabook".to_string(),
            price_cents: 99_900,
            stock: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("Alice@Example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email(&format!("{}@x.io", "a".repeat(300))).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_product_input() {
        assert!(validate_product_input(&input()).is_ok());

        let mut bad = input();
        bad.price_cents = -1;
        assert!(validate_product_input(&bad).is_err());

        let mut bad = input();
        bad.stock = -5;
        assert!(validate_product_input(&bad).is_err());

        let mut bad = input();
        bad.model_name = " ".to_string();
        assert!(validate_product_input(&bad).is_err());

        let mut bad = input();
        bad.brand_id.clear();
        assert!(validate_product_input(&bad).is_err());
    }

    #[test]
    fn test_normalize_quantity() {
        assert_eq!(normalize_quantity(0), 1);
        assert_eq!(normalize_quantity(-3), 1);
        assert_eq!(normalize_quantity(4), 4);
    }

    #[test]
    fn test_validate_rating() {
        for ok in 1..=5 {
            assert!(validate_rating(ok).is_ok());
        }
        assert!(matches!(
            validate_rating(0),
            Err(CoreError::InvalidRating { rating: 0, .. })
        ));
        assert!(matches!(
            validate_rating(6),
            Err(CoreError::InvalidRating { rating: 6, .. })
        ));
    }
}
