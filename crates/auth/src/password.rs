//! bcrypt password hashing for the user login path.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// Hash a plaintext password for storage. Never log or persist the input.
pub fn hash_password(plaintext: &str) -> Result<String, BcryptError> {
    hash(plaintext, DEFAULT_COST)
}

/// Compare a plaintext password against a stored bcrypt hash.
pub fn verify_password(plaintext: &str, hashed: &str) -> Result<bool, BcryptError> {
    verify(plaintext, hashed)
}
