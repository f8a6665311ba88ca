/// Password hashing and verification using Argon2id
use crate::error::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id with a random per-password salt.
///
/// Returns a PHC-formatted hash string safe for database storage. Format
/// rules (length, character classes) are checked by the caller via
/// `validators::validate_password`, not here.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored hash.
///
/// Uses constant-time comparison; a mismatch is `Ok(false)`, only a
/// corrupt stored hash or an internal failure is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "Passw0rd1";
        let hash = hash_password(password).expect("should hash password");
        assert!(verify_password(password, &hash).expect("should verify"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("Passw0rd1").expect("should hash password");
        assert!(!verify_password("WrongPassword2", &hash).expect("verification should succeed"));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "Passw0rd1";
        let hash1 = hash_password(password).expect("should hash");
        let hash2 = hash_password(password).expect("should hash");
        // Different salts produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_corrupt_stored_hash_is_error() {
        assert!(verify_password("Passw0rd1", "not-a-phc-string").is_err());
    }
}
