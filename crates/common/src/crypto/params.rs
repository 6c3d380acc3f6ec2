use serde::{Deserialize, Serialize};

use super::cipher::Nonce;
use super::error::EncryptionError;
use super::keys::PUBLIC_KEY_SIZE;
use super::mac::TAG_SIZE;
use crate::note::NOTE_SIZE;

/// Default domain-separation tag for the key derivation hash
pub const DEFAULT_KDF_TAG: &str = "ZethEncryption";
/// Default value of the fixed symmetric nonce
pub const DEFAULT_NONCE_VALUE: u64 = 0;

/// Protocol constants consumed by the encryption engine
///
/// These are owned by the surrounding protocol; the engine only reads them.
/// Two parties can exchange notes only if they agree on every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParams {
    /// Domain-separation tag hashed ahead of the exchange output
    #[serde(default = "default_kdf_tag")]
    pub kdf_tag: String,
    /// Fixed plaintext length in bytes
    #[serde(default = "default_note_size")]
    pub note_size: usize,
    /// Integer encoded little-endian into the fixed symmetric nonce
    #[serde(default = "default_nonce_value")]
    pub nonce_value: u64,
}

fn default_kdf_tag() -> String {
    DEFAULT_KDF_TAG.to_string()
}

fn default_note_size() -> usize {
    NOTE_SIZE
}

fn default_nonce_value() -> u64 {
    DEFAULT_NONCE_VALUE
}

impl Default for EncryptionParams {
    fn default() -> Self {
        Self {
            kdf_tag: default_kdf_tag(),
            note_size: default_note_size(),
            nonce_value: default_nonce_value(),
        }
    }
}

impl EncryptionParams {
    /// Params for payloads of `note_size` bytes, other fields at their defaults
    pub fn with_note_size(note_size: usize) -> Self {
        Self {
            note_size,
            ..Self::default()
        }
    }

    pub fn kdf_tag(&self) -> &[u8] {
        self.kdf_tag.as_bytes()
    }

    pub fn nonce(&self) -> Nonce {
        Nonce::from_value(self.nonce_value)
    }

    /// Total length of an encrypted record: `ephemeral_pk || ciphertext || tag`
    pub fn ciphertext_size(&self) -> usize {
        PUBLIC_KEY_SIZE + self.note_size + TAG_SIZE
    }

    /// Check that these params can encrypt a note at all
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::InvalidParams`] if the tag is empty, the note
    /// size is zero, or the nonce's block counter leaves less keystream than a note needs.
    pub fn validate(&self) -> Result<(), EncryptionError> {
        if self.kdf_tag.is_empty() {
            return Err(EncryptionError::InvalidParams("kdf_tag must not be empty".into()));
        }
        if self.note_size == 0 {
            return Err(EncryptionError::InvalidParams("note_size must be non-zero".into()));
        }
        let capacity = self.nonce().keystream_capacity();
        if (self.note_size as u64) > capacity {
            return Err(EncryptionError::InvalidParams(format!(
                "nonce_value {:#x} leaves {} keystream bytes, note_size is {}",
                self.nonce_value, capacity, self.note_size
            )));
        }
        Ok(())
    }
}
