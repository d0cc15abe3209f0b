//! Argon2id password hashing
//!
//! Hashing and verifying are CPU-bound; request handlers go through the
//! `*_blocking` variants so the work runs off the async executor.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{BackofficeError, Result};

/// Hash with the default parameters that never matches any password. Checked
/// when a login names an unknown account so both paths take the same time.
const UNKNOWN_ACCOUNT_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hash a password into a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BackofficeError::General(format!("password hashing failed: {e}")))
}

/// Check a password against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Check a password against `stored`, or burn the same work and fail when
/// there is no stored hash.
pub fn verify_password_or_dummy(password: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(stored) => verify_password(password, stored),
        None => {
            verify_password(password, UNKNOWN_ACCOUNT_HASH);
            false
        }
    }
}

pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| BackofficeError::General(format!("password hashing task failed: {e}")))?
}

pub async fn verify_password_blocking(password: String, stored: Option<String>) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password_or_dummy(&password, stored.as_deref()))
        .await
        .map_err(|e| BackofficeError::General(format!("password check task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_malformed_hash_does_not_match() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_unknown_account_hash_is_well_formed_and_never_matches() {
        let parsed = PasswordHash::new(UNKNOWN_ACCOUNT_HASH).unwrap();
        let ours = hash_password("x").unwrap();
        let default = PasswordHash::new(&ours).unwrap();
        assert_eq!(parsed.algorithm, default.algorithm);
        assert_eq!(parsed.params.to_string(), default.params.to_string());

        assert!(!verify_password_or_dummy("", None));
        assert!(!verify_password_or_dummy("correct horse", None));
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hash = hash_password_blocking("secret-pass".to_string()).await.unwrap();
        assert!(verify_password_blocking("secret-pass".to_string(), Some(hash.clone()))
            .await
            .unwrap());
        assert!(!verify_password_blocking("nope".to_string(), Some(hash)).await.unwrap());
        assert!(!verify_password_blocking("nope".to_string(), None).await.unwrap());
    }
}
