//! # Authentication Collaborators
//!
//! ```text
//! login:      password ──► CredentialHasher::verify ──► TokenManager::issue
//!                                                            │
//!                                                            ▼
//!                                                 Store::create_session
//!
//! per call:   token ──► TokenManager::verify (signature + exp)
//!                  └──► Store::session_valid  (record present + unexpired)
//!                            │
//!                            ▼
//!                        Principal
//! ```
//!
//! A token can verify cryptographically and still be refused: logout removes
//! the session record before the token's own expiry.

pub mod password;
pub mod token;

pub use password::{Argon2Hasher, CredentialHasher};
pub use token::{Claims, IssuedToken, TokenManager};

/// Extract bearer token from an `Authorization` header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
