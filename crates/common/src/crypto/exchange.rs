//! X25519 key agreement
//!
//! Both sides of a note exchange arrive at the same [`SharedSecret`]:
//! the sender combines a fresh ephemeral secret with the recipient's public key,
//! the recipient combines its long-term secret with the ephemeral public key
//! carried in the record.

use x25519_dalek::SharedSecret as X25519SharedSecret;

use super::error::EncryptionError;
use super::keys::{PublicKey, SecretKey};

/// Size of the Diffie-Hellman output in bytes
pub const SHARED_SECRET_SIZE: usize = 32;

/// Output of one Diffie-Hellman exchange, zeroized on drop
pub struct SharedSecret(X25519SharedSecret);

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        self.0.as_bytes()
    }
}

/// Perform X25519 Diffie-Hellman between `secret` and `public`
///
/// # Errors
///
/// Returns [`EncryptionError::InvalidKey`] if `public` is a small-order point,
/// in which case the exchange would yield the all-zero output regardless of `secret`.
pub fn exchange(secret: &SecretKey, public: &PublicKey) -> Result<SharedSecret, EncryptionError> {
    let shared = secret.as_x25519().diffie_hellman(public.as_x25519());
    if !shared.was_contributory() {
        tracing::debug!("rejecting small-order public key {}", public);
        return Err(EncryptionError::InvalidKey);
    }
    Ok(SharedSecret(shared))
}
