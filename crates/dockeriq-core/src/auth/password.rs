use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::ApiError;

/// Every PHC string produced by [`hash_password`] starts with this marker.
pub const HASH_PREFIX: &str = "$argon2";

/// Hash a plaintext password using Argon2.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Whether `value` already looks like an Argon2 PHC hash.
pub fn is_hashed(value: &str) -> bool {
    value.starts_with(HASH_PREFIX)
}

/// Hash `value` unless it is already a hash.
pub fn encode_password(value: &str) -> Result<String, ApiError> {
    if is_hashed(value) {
        return Ok(value.to_string());
    }
    hash_password(value)
}
