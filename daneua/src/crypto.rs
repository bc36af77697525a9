//! PIN hashing for the local backend
//!
//! PINs are stored as Argon2id PHC strings with a random salt. Only the
//! backend side uses this; the client never sees a hash.

use crate::error::{AppError, Result};
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::RngCore;

const SALT_SIZE: usize = 16; // 128 bits
const MIN_PIN_LENGTH: usize = 4;
const MAX_PIN_LENGTH: usize = 8;

/// PINs are 4 to 8 ASCII digits
pub fn validate_pin(pin: &str) -> Result<()> {
    let valid = (MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&pin.len())
        && pin.chars().all(|c| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(AppError::Invalid(format!(
            "PIN must be {} to {} digits",
            MIN_PIN_LENGTH, MAX_PIN_LENGTH
        )))
    }
}

/// Hash a PIN with a fresh random salt
pub fn hash_pin(pin: &str) -> Result<String> {
    validate_pin(pin)?;

    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| AppError::Generic(format!("Salt encoding failed: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| AppError::Generic(format!("PIN hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a PIN against a stored hash
pub fn verify_pin(pin: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Generic(format!("Stored PIN hash is malformed: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok())
}
