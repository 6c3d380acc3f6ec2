//! ChaCha20 under a fixed, protocol-wide nonce
//!
//! # Nonce reuse
//!
//! Every note is encrypted with the *same* public nonce. This is only sound
//! because the key is never reused: each encryption derives a fresh symmetric
//! key from a fresh ephemeral Diffie-Hellman exchange. Encrypting two different
//! messages under one key with this module would leak their XOR. Callers must
//! never cache ephemeral keys or derived key material across messages.
//!
//! # Nonce layout
//!
//! The nonce is a 128-bit little-endian integer. Its first 32-bit word is the
//! initial block counter and the remaining 96 bits are the IETF ChaCha20 nonce,
//! the same split OpenSSL applies to a 16-byte ChaCha20 IV.

use chacha20::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use chacha20::{ChaCha20, Key};

use super::error::EncryptionError;
use super::kdf::SYMMETRIC_KEY_SIZE;
use super::mac::Authenticated;

/// Width of the encoded nonce in bytes
pub const NONCE_SIZE: usize = 16;
/// ChaCha20 block size in bytes
pub const BLOCK_SIZE: usize = 64;

const COUNTER_SIZE: usize = 4;
// the block counter stops one short of wrapping
const LAST_BLOCK: u64 = u32::MAX as u64;

/// The fixed public nonce shared by every note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Encode `value` as a little-endian integer of [`NONCE_SIZE`] bytes
    pub fn from_value(value: u64) -> Self {
        let mut bytes = [0; NONCE_SIZE];
        bytes[..8].copy_from_slice(&value.to_le_bytes());
        Nonce(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }

    fn initial_counter(&self) -> u32 {
        let mut counter = [0; COUNTER_SIZE];
        counter.copy_from_slice(&self.0[..COUNTER_SIZE]);
        u32::from_le_bytes(counter)
    }

    fn iv(&self) -> &[u8] {
        &self.0[COUNTER_SIZE..]
    }

    /// Number of keystream bytes ChaCha20 will produce from the initial counter
    /// before its 32-bit block counter runs out
    pub fn keystream_capacity(&self) -> u64 {
        (LAST_BLOCK - u64::from(self.initial_counter())) * BLOCK_SIZE as u64
    }
}

/// XOR `buf` in place with the ChaCha20 keystream for `key` and `nonce`
pub fn apply_keystream(
    key: &[u8; SYMMETRIC_KEY_SIZE],
    nonce: &Nonce,
    buf: &mut [u8],
) -> Result<(), EncryptionError> {
    let mut cipher = ChaCha20::new(Key::from_slice(key), chacha20::Nonce::from_slice(nonce.iv()));
    cipher
        .try_seek(u64::from(nonce.initial_counter()) * BLOCK_SIZE as u64)
        .map_err(|_| EncryptionError::KeystreamExhausted)?;
    cipher
        .try_apply_keystream(buf)
        .map_err(|_| EncryptionError::KeystreamExhausted)
}

/// Encrypt or decrypt `payload`; applying it twice with the same key and nonce
/// returns the original bytes
pub fn cipher_apply(
    key: &[u8; SYMMETRIC_KEY_SIZE],
    nonce: &Nonce,
    payload: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let mut out = payload.to_vec();
    apply_keystream(key, nonce, &mut out)?;
    Ok(out)
}

/// Decrypt a ciphertext whose tag has already been verified
///
/// Taking [`Authenticated`] by value makes the decryption step unreachable
/// without a successful [`super::mac::authenticate`] first.
pub fn open(
    key: &[u8; SYMMETRIC_KEY_SIZE],
    nonce: &Nonce,
    ciphertext: Authenticated<'_>,
) -> Result<Vec<u8>, EncryptionError> {
    cipher_apply(key, nonce, ciphertext.ciphertext())
}

#[cfg(test)]
mod test {
    use super::*;

    const KEY: [u8; SYMMETRIC_KEY_SIZE] = [0x42; SYMMETRIC_KEY_SIZE];

    #[test]
    fn test_cipher_is_an_involution() {
        let nonce = Nonce::from_value(0);
        let message = b"a fixed length note payload".to_vec();

        let ciphertext = cipher_apply(&KEY, &nonce, &message).unwrap();
        assert_ne!(ciphertext, message);
        assert_eq!(ciphertext.len(), message.len());

        let recovered = cipher_apply(&KEY, &nonce, &ciphertext).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn test_rfc8439_zero_key_keystream() {
        // RFC 8439 appendix A.1, test vector #1: all-zero key, nonce and counter
        let keystream = cipher_apply(&[0; SYMMETRIC_KEY_SIZE], &Nonce::from_value(0), &[0; 32]).unwrap();
        assert_eq!(
            hex::encode(keystream),
            "76b8e0ada0f13d90405d6ae55386bd28bdd219b8a08ded1aa836efcc8b770dc7"
        );
    }

    #[test]
    fn test_nonce_low_word_is_block_counter() {
        let from_zero = cipher_apply(&KEY, &Nonce::from_value(0), &[0; 2 * BLOCK_SIZE]).unwrap();
        let from_one = cipher_apply(&KEY, &Nonce::from_value(1), &[0; BLOCK_SIZE]).unwrap();
        assert_eq!(&from_zero[BLOCK_SIZE..], &from_one[..]);
    }

    #[test]
    fn test_nonce_high_words_change_keystream() {
        let low = cipher_apply(&KEY, &Nonce::from_value(0), &[0; 32]).unwrap();
        let high = cipher_apply(&KEY, &Nonce::from_value(1 << 32), &[0; 32]).unwrap();
        assert_ne!(low, high);
    }

    #[test]
    fn test_nonce_encoding_is_little_endian() {
        let nonce = Nonce::from_value(0x0102);
        let mut expected = [0u8; NONCE_SIZE];
        expected[0] = 0x02;
        expected[1] = 0x01;
        assert_eq!(nonce.as_bytes(), &expected);
    }

    #[test]
    fn test_keystream_capacity() {
        assert_eq!(
            Nonce::from_value(0).keystream_capacity(),
            LAST_BLOCK * BLOCK_SIZE as u64
        );
        assert_eq!(
            Nonce::from_value(u64::from(u32::MAX - 1)).keystream_capacity(),
            BLOCK_SIZE as u64
        );
        assert_eq!(Nonce::from_value(u64::from(u32::MAX)).keystream_capacity(), 0);
    }

    #[test]
    fn test_capacity_matches_cipher_limit() {
        let nonce = Nonce::from_value(u64::from(u32::MAX - 1));
        let capacity = nonce.keystream_capacity() as usize;

        assert!(cipher_apply(&KEY, &nonce, &vec![0; capacity]).is_ok());
        assert_eq!(
            cipher_apply(&KEY, &nonce, &vec![0; capacity + 1]),
            Err(EncryptionError::KeystreamExhausted)
        );

        let last = Nonce::from_value(u64::from(u32::MAX));
        assert_eq!(
            cipher_apply(&KEY, &last, &[0; 1]),
            Err(EncryptionError::KeystreamExhausted)
        );
    }
}
