//! Password hashing.
//!
//! The store only ever sees the PHC string produced here
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`). Verification reads the
//! parameters back out of that string, so hashes made with different cost
//! settings keep verifying after the settings change.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use rapidtech_core::{CoreError, CoreResult};

/// One-way, salted credential hashing.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a plaintext password for storage.
    fn hash(&self, plaintext: &str) -> CoreResult<String>;

    /// Checks a plaintext password against a stored hash.
    ///
    /// A malformed stored hash verifies as false.
    fn verify(&self, hash: &str, plaintext: &str) -> bool;
}

/// Argon2id hasher.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Option<Params>,
}

impl Argon2Hasher {
    /// Uses explicit cost parameters instead of the argon2 defaults.
    pub fn with_params(params: Params) -> Self {
        Argon2Hasher {
            params: Some(params),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        match &self.params {
            Some(params) => Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone()),
            None => Argon2::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> CoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CoreError::HashFailure(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify(&self, hash: &str, plaintext: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2Hasher {
    // Minimum-cost parameters keep debug-build tests fast.
    Argon2Hasher::with_params(Params::new(1024, 1, 1, None).expect("valid argon2 params"))
}
