// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Argon2 password hashing.
//!
//! Unit tests use reduced Argon2 parameters; every other build uses the
//! library defaults (Argon2id, 19 MiB, 2 iterations).

use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
#[cfg(test)]
use argon2::{Algorithm, Params, Version};

/// Argon2id hash with the default cost parameters that matches no password.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$H0n/3pQo0KPf7y5klJJZqQ$LpGTibRPH26EZtkBh3AwETAeqcCEM0k65UloOYngrUk";

fn argon2_instance() -> Argon2<'static> {
    #[cfg(test)]
    {
        let params = Params::new(1024, 1, 1, None).expect("valid Argon2 params for tests");
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    #[cfg(not(test))]
    {
        Argon2::default()
    }
}

/// Hash a password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2_instance()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {}", e)))?;

    // Parameters come from the PHC string, so the default instance verifies
    // hashes produced with any cost settings.
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Run a full verification against a hash that never matches, so a login
/// for an unknown email costs the same as a wrong password.
pub fn verify_dummy_password(password: &str) {
    let _ = verify_password(password, DUMMY_HASH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let a = hash_password("password123").unwrap();
        let b = hash_password("password123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_dummy_hash_parses_and_never_matches() {
        assert!(!verify_password("", DUMMY_HASH).unwrap());
        assert!(!verify_password("password123", DUMMY_HASH).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
