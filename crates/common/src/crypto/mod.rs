//! Cryptographic core of note encryption
//!
//! Notes are encrypted to a recipient's X25519 public key with a hybrid scheme:
//!
//! - **Key Agreement**: X25519 between a fresh ephemeral key and the recipient's key
//! - **Key Derivation**: BLAKE2b-512 over a domain tag, the ephemeral public key and the shared secret
//! - **Encryption**: ChaCha20 under a fixed public nonce
//! - **Authentication**: Poly1305 over the ciphertext, verified before decryption
//!
//! # Fixed nonce
//!
//! ChaCha20 runs with the same nonce for every note. That is safe *only* because
//! every encryption derives its symmetric and MAC keys from a brand new ephemeral
//! keypair. Nothing in this module may be used to encrypt two messages under one
//! derived key, and ephemeral keys must never be cached or reused.
//!
//! # Record Layout
//!
//! ```text
//! [ ephemeral_pubkey: 32 ][ ciphertext: note_size ][ poly1305 tag: 16 ]
//! ```

mod cipher;
mod error;
mod exchange;
mod kdf;
mod keys;
mod mac;
mod note_cipher;
mod params;

pub use cipher::{apply_keystream, cipher_apply, open, Nonce, BLOCK_SIZE, NONCE_SIZE};
pub use error::EncryptionError;
pub use exchange::{exchange, SharedSecret, SHARED_SECRET_SIZE};
pub use kdf::{derive, KeyMaterial, KEY_MATERIAL_SIZE, MAC_KEY_SIZE, SYMMETRIC_KEY_SIZE};
pub use keys::{KeyError, KeyPair, PublicKey, SecretKey, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
pub use mac::{authenticate, mac_compute, mac_verify, Authenticated, TAG_SIZE};
pub use note_cipher::{decrypt, encrypt, EncryptedNote, NoteCipher};
pub use params::{EncryptionParams, DEFAULT_KDF_TAG, DEFAULT_NONCE_VALUE};
