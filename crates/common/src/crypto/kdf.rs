//! Key derivation for note encryption
//!
//! `BLAKE2b-512(tag || ephemeral_pk || shared_secret)`, split into a stream cipher
//! key and a one-time MAC key. Hashing the ephemeral public key binds both
//! subkeys to the exchange that produced them.

use blake2b_simd::Params;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::exchange::{SharedSecret, SHARED_SECRET_SIZE};
use super::keys::PUBLIC_KEY_SIZE;

/// Size of the ChaCha20 key in bytes
pub const SYMMETRIC_KEY_SIZE: usize = 32;
/// Size of the Poly1305 key in bytes
pub const MAC_KEY_SIZE: usize = 32;
/// Size of the KDF output in bytes
pub const KEY_MATERIAL_SIZE: usize = SYMMETRIC_KEY_SIZE + MAC_KEY_SIZE;

/// The two subkeys derived for a single encrypt or decrypt call
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    symmetric_key: [u8; SYMMETRIC_KEY_SIZE],
    mac_key: [u8; MAC_KEY_SIZE],
}

impl KeyMaterial {
    /// `output[0..32]`
    pub fn symmetric_key(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.symmetric_key
    }

    /// `output[32..64]`
    pub fn mac_key(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.mac_key
    }
}

/// Derive key material from a domain-separation tag, the ephemeral public key
/// bytes and the shared secret
///
/// Deterministic: identical inputs always yield identical key material.
pub fn derive(
    tag: &[u8],
    ephemeral_pk: &[u8; PUBLIC_KEY_SIZE],
    shared_secret: &[u8; SHARED_SECRET_SIZE],
) -> KeyMaterial {
    // blake2b_simd's Hash is Copy and cannot be wiped, so it lives only in
    // this block and every copy we own is zeroized
    let output: Zeroizing<[u8; KEY_MATERIAL_SIZE]> = {
        let digest = Params::new()
            .hash_length(KEY_MATERIAL_SIZE)
            .to_state()
            .update(tag)
            .update(ephemeral_pk)
            .update(shared_secret)
            .finalize();
        let mut bytes = Zeroizing::new([0u8; KEY_MATERIAL_SIZE]);
        bytes.copy_from_slice(digest.as_bytes());
        bytes
    };

    let mut material = KeyMaterial {
        symmetric_key: [0; SYMMETRIC_KEY_SIZE],
        mac_key: [0; MAC_KEY_SIZE],
    };
    material
        .symmetric_key
        .copy_from_slice(&output[..SYMMETRIC_KEY_SIZE]);
    material
        .mac_key
        .copy_from_slice(&output[SYMMETRIC_KEY_SIZE..KEY_MATERIAL_SIZE]);
    material
}

/// [`derive`] over a [`SharedSecret`] returned by [`super::exchange`]
pub(crate) fn derive_from_exchange(
    tag: &[u8],
    ephemeral_pk: &[u8; PUBLIC_KEY_SIZE],
    shared: &SharedSecret,
) -> KeyMaterial {
    derive(tag, ephemeral_pk, shared.as_bytes())
}
