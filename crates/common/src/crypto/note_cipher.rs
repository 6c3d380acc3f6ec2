//! Hybrid public-key encryption of fixed-length notes
//!
//! Combines X25519, BLAKE2b key derivation, ChaCha20 and Poly1305 into a
//! DHAES-style scheme.
//!
//! # Protocol Overview
//!
//! To encrypt a note for a recipient:
//! 1. **Generate ephemeral keypair**: a fresh X25519 keypair for this note only
//! 2. **Exchange**: Diffie-Hellman between the ephemeral secret and the recipient's public key
//! 3. **Derive**: `BLAKE2b-512(tag || ephemeral_pk || shared)` split into a cipher key and a MAC key
//! 4. **Encrypt**: ChaCha20 over the note under the fixed nonce
//! 5. **Authenticate**: Poly1305 over the ciphertext
//! 6. **Package**: `ephemeral_pk || ciphertext || tag`
//!
//! The recipient reverses this, verifying the tag strictly before any plaintext is produced.
//!
//! # Security Properties
//!
//! - **Fresh keys per note**: the fixed nonce is safe only because steps 1-3 never repeat a key
//! - **Integrity**: any modification of the ciphertext or tag fails authentication
//! - **No oracle**: wrong recipient, tampering and corruption all surface as
//!   [`EncryptionError::AuthenticationFailed`]

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cipher::{self, Nonce};
use super::error::EncryptionError;
use super::exchange::exchange;
use super::kdf::derive_from_exchange;
use super::keys::{KeyError, KeyPair, PublicKey, SecretKey, PUBLIC_KEY_SIZE};
use super::mac::{self, TAG_SIZE};
use super::params::EncryptionParams;

/// An encrypted note record
///
/// # Wire Format
///
/// ```text
/// [ ephemeral_pubkey: 32 bytes ][ ciphertext: note_size bytes ][ tag: 16 bytes ]
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct EncryptedNote(Vec<u8>);

impl Serialize for EncryptedNote {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for EncryptedNote {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};

        struct EncryptedNoteVisitor;

        impl<'de> Visitor<'de> for EncryptedNoteVisitor {
            type Value = EncryptedNote;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a byte array or sequence holding an encrypted note")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: Error,
            {
                EncryptedNote::try_from(v).map_err(E::custom)
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
            where
                E: Error,
            {
                EncryptedNote::try_from(v).map_err(E::custom)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut bytes = Vec::new();
                while let Some(byte) = seq.next_element::<u8>()? {
                    bytes.push(byte);
                }
                EncryptedNote::try_from(bytes).map_err(A::Error::custom)
            }
        }

        // Try bytes first (for bincode), fallback to seq (for JSON)
        deserializer.deserialize_byte_buf(EncryptedNoteVisitor)
    }
}

impl TryFrom<Vec<u8>> for EncryptedNote {
    type Error = KeyError;
    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() <= PUBLIC_KEY_SIZE + TAG_SIZE {
            return Err(anyhow::anyhow!(
                "encrypted note too short, expected more than {} bytes, got {}",
                PUBLIC_KEY_SIZE + TAG_SIZE,
                bytes.len()
            )
            .into());
        }
        Ok(EncryptedNote(bytes))
    }
}

impl TryFrom<&[u8]> for EncryptedNote {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        EncryptedNote::try_from(bytes.to_vec())
    }
}

impl From<EncryptedNote> for Vec<u8> {
    fn from(note: EncryptedNote) -> Self {
        note.0
    }
}

impl AsRef<[u8]> for EncryptedNote {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl EncryptedNote {
    /// Parse an encrypted note from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex).map_err(|_| anyhow::anyhow!("encrypted note hex decode error"))?;
        EncryptedNote::try_from(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// The sender's ephemeral public key carried at the front of the record
    pub fn ephemeral_public_key(&self) -> Result<PublicKey, KeyError> {
        PublicKey::try_from(&self.0[..PUBLIC_KEY_SIZE])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The note encryption engine, bound to one set of [`EncryptionParams`]
///
/// Stateless between calls: encrypt and decrypt only read the params, so one
/// `NoteCipher` may be shared across threads freely.
///
/// # Examples
///
/// ```ignore
/// let cipher = NoteCipher::default();
/// let recipient = KeyPair::generate()?;
///
/// let note = [0u8; 104];
/// let encrypted = cipher.encrypt(&note, recipient.public())?;
/// let decrypted = cipher.decrypt(encrypted.bytes(), recipient.secret())?;
/// assert_eq!(decrypted, note);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NoteCipher {
    params: EncryptionParams,
}

impl NoteCipher {
    /// Build an engine after checking that `params` are usable
    pub fn new(params: EncryptionParams) -> Result<Self, EncryptionError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EncryptionParams {
        &self.params
    }

    fn nonce(&self) -> Nonce {
        self.params.nonce()
    }

    /// Encrypt a `note_size`-byte message to `receiver`
    ///
    /// A new ephemeral keypair is generated on every call; it is dropped (and
    /// zeroized) before this returns.
    ///
    /// # Errors
    ///
    /// - [`EncryptionError::InvalidInputLength`] if `message` is not exactly `note_size` bytes
    /// - [`EncryptionError::InvalidKey`] if `receiver` is a small-order point
    /// - [`EncryptionError::RandomnessUnavailable`] if no ephemeral key can be generated
    pub fn encrypt(
        &self,
        message: &[u8],
        receiver: &PublicKey,
    ) -> Result<EncryptedNote, EncryptionError> {
        if message.len() != self.params.note_size {
            return Err(EncryptionError::length(self.params.note_size, message.len()));
        }

        let ephemeral = KeyPair::generate()?;
        let ephemeral_pk = ephemeral.public().to_bytes();
        tracing::trace!(
            ephemeral_pk = %ephemeral.public(),
            receiver = %receiver,
            "encrypting note"
        );

        let shared = exchange(ephemeral.secret(), receiver)?;
        let material = derive_from_exchange(self.params.kdf_tag(), &ephemeral_pk, &shared);

        let ciphertext = cipher::cipher_apply(material.symmetric_key(), &self.nonce(), message)?;
        let tag = mac::mac_compute(material.mac_key(), &ciphertext);

        let mut record = Vec::with_capacity(self.params.ciphertext_size());
        record.extend_from_slice(&ephemeral_pk);
        record.extend_from_slice(&ciphertext);
        record.extend_from_slice(&tag);
        Ok(EncryptedNote(record))
    }

    /// Decrypt a record produced by [`NoteCipher::encrypt`] with the receiver's secret key
    ///
    /// The tag is checked before the stream cipher runs, so no plaintext is ever
    /// computed for a record that fails authentication.
    ///
    /// # Errors
    ///
    /// - [`EncryptionError::InvalidInputLength`] if `record` is not exactly `ciphertext_size` bytes
    /// - [`EncryptionError::InvalidKey`] if the embedded ephemeral key is a small-order point
    /// - [`EncryptionError::AuthenticationFailed`] if the tag does not verify
    pub fn decrypt(
        &self,
        record: &[u8],
        receiver: &SecretKey,
    ) -> Result<Vec<u8>, EncryptionError> {
        let expected = self.params.ciphertext_size();
        if record.len() != expected {
            return Err(EncryptionError::length(expected, record.len()));
        }

        let (sender_pk_bytes, rest) = record.split_at(PUBLIC_KEY_SIZE);
        let (ciphertext, tag_bytes) = rest.split_at(self.params.note_size);

        let mut ephemeral_pk = [0; PUBLIC_KEY_SIZE];
        ephemeral_pk.copy_from_slice(sender_pk_bytes);
        let sender = PublicKey::from(ephemeral_pk);
        tracing::trace!(ephemeral_pk = %sender, "decrypting note");

        let shared = exchange(receiver, &sender)?;
        let material = derive_from_exchange(self.params.kdf_tag(), &ephemeral_pk, &shared);

        let mut tag = [0; TAG_SIZE];
        tag.copy_from_slice(tag_bytes);
        let authenticated = mac::authenticate(material.mac_key(), ciphertext, &tag)
            .map_err(|e| {
                tracing::debug!("note authentication failed");
                e
            })?;

        cipher::open(material.symmetric_key(), &self.nonce(), authenticated)
    }
}

/// Encrypt a note to `receiver` under the default protocol params
pub fn encrypt(message: &[u8], receiver: &PublicKey) -> Result<EncryptedNote, EncryptionError> {
    NoteCipher::default().encrypt(message, receiver)
}

/// Decrypt a record under the default protocol params
pub fn decrypt(record: &[u8], receiver: &SecretKey) -> Result<Vec<u8>, EncryptionError> {
    NoteCipher::default().decrypt(record, receiver)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::note::NOTE_SIZE;

    #[test]
    fn test_encrypt_decrypt() {
        let recipient = KeyPair::generate().unwrap();
        let note = [42u8; NOTE_SIZE];

        let encrypted = encrypt(&note, recipient.public()).unwrap();
        assert_eq!(encrypted.len(), PUBLIC_KEY_SIZE + NOTE_SIZE + TAG_SIZE);

        let decrypted = decrypt(encrypted.bytes(), recipient.secret()).unwrap();
        assert_eq!(decrypted, note);
    }

    #[test]
    fn test_record_layout() {
        let cipher = NoteCipher::default();
        let recipient = KeyPair::generate().unwrap();
        let note = [0u8; NOTE_SIZE];

        let encrypted = cipher.encrypt(&note, recipient.public()).unwrap();
        let ephemeral = encrypted.ephemeral_public_key().unwrap();
        assert_ne!(ephemeral, *recipient.public());

        // The recipient can rebuild the keystream from the embedded ephemeral key
        let shared = exchange(recipient.secret(), &ephemeral).unwrap();
        let material = derive_from_exchange(
            cipher.params().kdf_tag(),
            &ephemeral.to_bytes(),
            &shared,
        );
        let body = &encrypted.bytes()[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + NOTE_SIZE];
        let expected_body =
            cipher::cipher_apply(material.symmetric_key(), &cipher.nonce(), &note).unwrap();
        assert_eq!(body, &expected_body[..]);

        let tag = &encrypted.bytes()[PUBLIC_KEY_SIZE + NOTE_SIZE..];
        assert_eq!(tag, &mac::mac_compute(material.mac_key(), body)[..]);
    }

    #[test]
    fn test_wrong_length_rejected_before_any_work() {
        let recipient = KeyPair::generate().unwrap();
        let cipher = NoteCipher::default();

        assert_eq!(
            cipher.encrypt(&[0u8; NOTE_SIZE - 1], recipient.public()).unwrap_err(),
            EncryptionError::InvalidInputLength {
                expected: NOTE_SIZE,
                actual: NOTE_SIZE - 1
            }
        );

        // Even a small-order recipient key reports the length problem first
        let bad_key = PublicKey::from([0u8; PUBLIC_KEY_SIZE]);
        assert!(matches!(
            cipher.encrypt(&[0u8; NOTE_SIZE + 1], &bad_key),
            Err(EncryptionError::InvalidInputLength { .. })
        ));

        let size = cipher.params().ciphertext_size();
        assert_eq!(
            cipher.decrypt(&vec![0u8; size + 1], recipient.secret()).unwrap_err(),
            EncryptionError::InvalidInputLength {
                expected: size,
                actual: size + 1
            }
        );
    }

    #[test]
    fn test_small_order_recipient_rejected() {
        let bad_key = PublicKey::from([0u8; PUBLIC_KEY_SIZE]);
        assert_eq!(
            encrypt(&[0u8; NOTE_SIZE], &bad_key).unwrap_err(),
            EncryptionError::InvalidKey
        );
    }

    #[test]
    fn test_small_order_ephemeral_rejected() {
        let recipient = KeyPair::generate().unwrap();
        let mut encrypted: Vec<u8> = encrypt(&[0u8; NOTE_SIZE], recipient.public())
            .unwrap()
            .into();
        encrypted[..PUBLIC_KEY_SIZE].fill(0);
        assert_eq!(
            decrypt(&encrypted, recipient.secret()).unwrap_err(),
            EncryptionError::InvalidKey
        );
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(matches!(
            NoteCipher::new(EncryptionParams::with_note_size(0)),
            Err(EncryptionError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_accepted_params_can_encrypt_at_counter_limit() {
        let recipient = KeyPair::generate().unwrap();
        let params = EncryptionParams {
            nonce_value: u64::from(u32::MAX - 1),
            ..EncryptionParams::with_note_size(cipher::BLOCK_SIZE)
        };
        let at_limit = NoteCipher::new(params).unwrap();

        let note = [5u8; cipher::BLOCK_SIZE];
        let encrypted = at_limit.encrypt(&note, recipient.public()).unwrap();
        assert_eq!(
            at_limit.decrypt(encrypted.bytes(), recipient.secret()).unwrap(),
            note
        );

        // one byte past the remaining keystream, or the last counter value, is refused up front
        for params in [
            EncryptionParams {
                nonce_value: u64::from(u32::MAX - 1),
                ..EncryptionParams::with_note_size(cipher::BLOCK_SIZE + 1)
            },
            EncryptionParams {
                nonce_value: u64::from(u32::MAX),
                ..EncryptionParams::with_note_size(cipher::BLOCK_SIZE)
            },
            EncryptionParams {
                nonce_value: 0xFFFF_FFFE,
                ..EncryptionParams::default()
            },
        ] {
            assert!(matches!(
                NoteCipher::new(params),
                Err(EncryptionError::InvalidParams(_))
            ));
        }
    }

    #[test]
    fn test_hex_roundtrip() {
        let recipient = KeyPair::generate().unwrap();
        let encrypted = encrypt(&[1u8; NOTE_SIZE], recipient.public()).unwrap();

        let recovered = EncryptedNote::from_hex(&encrypted.to_hex()).unwrap();
        assert_eq!(recovered, encrypted);

        let prefixed = EncryptedNote::from_hex(&format!("0x{}", encrypted.to_hex())).unwrap();
        assert_eq!(prefixed, encrypted);
    }

    #[test]
    fn test_serde_json_roundtrip() {
        let recipient = KeyPair::generate().unwrap();
        let encrypted = encrypt(&[2u8; NOTE_SIZE], recipient.public()).unwrap();

        let json = serde_json::to_string(&encrypted).unwrap();
        let recovered: EncryptedNote = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, encrypted);
        assert_eq!(
            decrypt(recovered.bytes(), recipient.secret()).unwrap(),
            [2u8; NOTE_SIZE]
        );
    }

    #[test]
    fn test_serde_bincode_roundtrip() {
        let recipient = KeyPair::generate().unwrap();
        let encrypted = encrypt(&[3u8; NOTE_SIZE], recipient.public()).unwrap();

        let binary = bincode::serialize(&encrypted).unwrap();
        let recovered: EncryptedNote = bincode::deserialize(&binary).unwrap();
        assert_eq!(recovered, encrypted);
    }

    #[test]
    fn test_deserialize_too_short() {
        let short = vec![0u8; PUBLIC_KEY_SIZE + TAG_SIZE];
        let result: Result<EncryptedNote, _> =
            bincode::deserialize(&bincode::serialize(&short).unwrap());
        assert!(result.is_err());
    }
}
