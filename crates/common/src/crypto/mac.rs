//! Poly1305 one-time authenticator
//!
//! A Poly1305 key must authenticate at most one message. Note encryption
//! satisfies this by deriving a new MAC key next to every new symmetric key.

use poly1305::universal_hash::KeyInit;
use poly1305::{Key, Poly1305};
use subtle::ConstantTimeEq;

use super::error::EncryptionError;
use super::kdf::MAC_KEY_SIZE;

/// Size of a Poly1305 tag in bytes
pub const TAG_SIZE: usize = 16;

/// Proof that a ciphertext passed tag verification
///
/// Only [`authenticate`] can build one, and [`super::cipher::open`] requires one.
#[derive(Debug)]
pub struct Authenticated<'a> {
    ciphertext: &'a [u8],
}

impl<'a> Authenticated<'a> {
    pub fn ciphertext(&self) -> &'a [u8] {
        self.ciphertext
    }
}

/// Compute the Poly1305 tag of `data`
pub fn mac_compute(key: &[u8; MAC_KEY_SIZE], data: &[u8]) -> [u8; TAG_SIZE] {
    let tag = Poly1305::new(Key::from_slice(key)).compute_unpadded(data);
    let mut out = [0; TAG_SIZE];
    out.copy_from_slice(&tag);
    out
}

/// Check `tag` against the Poly1305 tag of `data` in constant time
pub fn mac_verify(key: &[u8; MAC_KEY_SIZE], data: &[u8], tag: &[u8; TAG_SIZE]) -> bool {
    let expected = mac_compute(key, data);
    expected[..].ct_eq(&tag[..]).into()
}

/// Verify `tag` over `ciphertext`, yielding the [`Authenticated`] ciphertext on success
///
/// # Errors
///
/// Returns [`EncryptionError::AuthenticationFailed`] on any mismatch.
pub fn authenticate<'a>(
    key: &[u8; MAC_KEY_SIZE],
    ciphertext: &'a [u8],
    tag: &[u8; TAG_SIZE],
) -> Result<Authenticated<'a>, EncryptionError> {
    if !mac_verify(key, ciphertext, tag) {
        return Err(EncryptionError::AuthenticationFailed);
    }
    Ok(Authenticated { ciphertext })
}
