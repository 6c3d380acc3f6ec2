//! The default note payload
//!
//! A note is the plaintext the encryption engine is specialised for: the
//! recipient's paying key, the value and two random nullifier seeds.
//!
//! # Layout
//!
//! ```text
//! [ apk: 32 ][ value: 8, big-endian ][ rho: 32 ][ trap_r: 32 ]
//! ```

use serde::{Deserialize, Serialize};

/// Size of a 256-bit note field in bytes
pub const FIELD_SIZE: usize = 32;
/// Size of the note value in bytes
pub const VALUE_SIZE: usize = 8;
/// Size of a serialized note in bytes
pub const NOTE_SIZE: usize = FIELD_SIZE + VALUE_SIZE + FIELD_SIZE + FIELD_SIZE;

const VALUE_OFFSET: usize = FIELD_SIZE;
const RHO_OFFSET: usize = VALUE_OFFSET + VALUE_SIZE;
const TRAP_R_OFFSET: usize = RHO_OFFSET + FIELD_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("invalid note size, expected {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },
    #[error("note hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// A note in its structured form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub apk: [u8; FIELD_SIZE],
    pub value: u64,
    pub rho: [u8; FIELD_SIZE],
    pub trap_r: [u8; FIELD_SIZE],
}

impl From<[u8; NOTE_SIZE]> for Note {
    fn from(bytes: [u8; NOTE_SIZE]) -> Self {
        let mut apk = [0; FIELD_SIZE];
        let mut value = [0; VALUE_SIZE];
        let mut rho = [0; FIELD_SIZE];
        let mut trap_r = [0; FIELD_SIZE];
        apk.copy_from_slice(&bytes[..VALUE_OFFSET]);
        value.copy_from_slice(&bytes[VALUE_OFFSET..RHO_OFFSET]);
        rho.copy_from_slice(&bytes[RHO_OFFSET..TRAP_R_OFFSET]);
        trap_r.copy_from_slice(&bytes[TRAP_R_OFFSET..]);
        Note {
            apk,
            value: u64::from_be_bytes(value),
            rho,
            trap_r,
        }
    }
}

impl From<&Note> for [u8; NOTE_SIZE] {
    fn from(note: &Note) -> Self {
        note.to_bytes()
    }
}

impl Note {
    pub fn to_bytes(&self) -> [u8; NOTE_SIZE] {
        let mut bytes = [0; NOTE_SIZE];
        bytes[..VALUE_OFFSET].copy_from_slice(&self.apk);
        bytes[VALUE_OFFSET..RHO_OFFSET].copy_from_slice(&self.value.to_be_bytes());
        bytes[RHO_OFFSET..TRAP_R_OFFSET].copy_from_slice(&self.rho);
        bytes[TRAP_R_OFFSET..].copy_from_slice(&self.trap_r);
        bytes
    }

    /// Parse a note from exactly [`NOTE_SIZE`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NoteError> {
        if bytes.len() != NOTE_SIZE {
            return Err(NoteError::InvalidSize {
                expected: NOTE_SIZE,
                actual: bytes.len(),
            });
        }
        let mut buff = [0; NOTE_SIZE];
        buff.copy_from_slice(bytes);
        Ok(buff.into())
    }

    /// Parse a note from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, NoteError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        Self::from_bytes(&hex::decode(hex)?)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn is_zero_valued(&self) -> bool {
        self.value == 0
    }
}
