use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use super::error::EncryptionError;

/// Size of an X25519 secret scalar in bytes
pub const SECRET_KEY_SIZE: usize = 32;
/// Size of an X25519 public key (Montgomery u-coordinate) in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

const PEM_TAG: &str = "X25519 PRIVATE KEY";

/// Errors that can occur while encoding or decoding keys
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Public encryption key of a note recipient
///
/// Wraps an X25519 public key. Any 32 bytes decode to a public key; points of
/// small order are only detected once they are used in [`super::exchange`],
/// which rejects them with [`EncryptionError::InvalidKey`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(X25519PublicKey);

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; PUBLIC_KEY_SIZE]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        PublicKey(X25519PublicKey::from(bytes))
    }
}

impl From<&SecretKey> for PublicKey {
    fn from(secret: &SecretKey) -> Self {
        secret.public()
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid public key size, expected {}, got {}",
                PUBLIC_KEY_SIZE,
                bytes.len()
            )
            .into());
        }
        let mut buff = [0; PUBLIC_KEY_SIZE];
        buff.copy_from_slice(bytes);
        Ok(buff.into())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        PublicKey::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl PublicKey {
    /// Parse a public key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; PUBLIC_KEY_SIZE];
        hex::decode_to_slice(hex, &mut buff)
            .map_err(|_| anyhow::anyhow!("public key hex decode error"))?;
        Ok(buff.into())
    }

    /// Raw curve point encoding
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub(crate) fn as_x25519(&self) -> &X25519PublicKey {
        &self.0
    }
}

/// Secret decryption key of a note recipient
///
/// Wraps an X25519 static secret, which is zeroized on drop. The type has no
/// equality and its `Debug` output is redacted, so the scalar never ends up in
/// logs or in a non-constant-time comparison by accident.
///
/// # Examples
///
/// ```ignore
/// let secret_key = SecretKey::generate()?;
/// let public_key = secret_key.public();
///
/// let pem = secret_key.to_pem();
/// let recovered = SecretKey::from_pem(&pem)?;
/// assert_eq!(recovered.public(), public_key);
/// ```
#[derive(Clone)]
pub struct SecretKey(StaticSecret);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl From<[u8; SECRET_KEY_SIZE]> for SecretKey {
    fn from(secret: [u8; SECRET_KEY_SIZE]) -> Self {
        Self(StaticSecret::from(secret))
    }
}

impl SecretKey {
    /// Generate a new clamped secret key from the operating system RNG
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError::RandomnessUnavailable`] if the RNG cannot be read.
    /// Key generation never falls back to a weaker source.
    pub fn generate() -> Result<Self, EncryptionError> {
        let mut bytes = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
        getrandom::getrandom(&mut *bytes).map_err(|e| {
            tracing::warn!("failed to read secure randomness: {}", e);
            EncryptionError::RandomnessUnavailable
        })?;
        clamp(&mut bytes);
        Ok(Self(StaticSecret::from(*bytes)))
    }

    /// Parse a secret key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = Zeroizing::new([0; SECRET_KEY_SIZE]);
        hex::decode_to_slice(hex, &mut *buff)
            .map_err(|_| anyhow::anyhow!("secret key hex decode error"))?;
        Ok(Self::from(*buff))
    }

    /// Derive the public key by scalar multiplication with the base point
    pub fn public(&self) -> PublicKey {
        PublicKey(X25519PublicKey::from(&self.0))
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_SIZE]> {
        Zeroizing::new(self.0.to_bytes())
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&*self.to_bytes()))
    }

    /// Encode the secret key in PEM format for storage on disk
    pub fn to_pem(&self) -> Zeroizing<String> {
        let pem = pem::Pem::new(PEM_TAG, self.to_bytes().to_vec());
        Zeroizing::new(pem::encode(&pem))
    }

    /// Parse a secret key from PEM format
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The PEM string is malformed
    /// - The PEM tag is not the X25519 private key tag
    /// - The key size is incorrect
    pub fn from_pem(pem_str: &str) -> Result<Self, KeyError> {
        let pem = pem::parse(pem_str).map_err(|e| anyhow::anyhow!("failed to parse PEM: {}", e))?;

        if pem.tag() != PEM_TAG {
            return Err(anyhow::anyhow!("invalid PEM tag, expected {}", PEM_TAG).into());
        }

        let contents = pem.contents();
        if contents.len() != SECRET_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid secret key size in PEM, expected {}, got {}",
                SECRET_KEY_SIZE,
                contents.len()
            )
            .into());
        }

        let mut bytes = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
        bytes.copy_from_slice(contents);
        Ok(Self::from(*bytes))
    }

    pub(crate) fn as_x25519(&self) -> &StaticSecret {
        &self.0
    }
}

/// A secret key together with its public projection
///
/// Constructors only ever derive `public` from `secret`, so the pair is always consistent.
#[derive(Debug, Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl From<SecretKey> for KeyPair {
    fn from(secret: SecretKey) -> Self {
        let public = secret.public();
        Self { secret, public }
    }
}

impl KeyPair {
    pub fn generate() -> Result<Self, EncryptionError> {
        SecretKey::generate().map(Self::from)
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

// Curve25519 clamping: clear the cofactor bits, clear bit 255 and set bit 254.
fn clamp(bytes: &mut [u8; SECRET_KEY_SIZE]) {
    bytes[0] &= 0b1111_1000;
    bytes[31] &= 0b0111_1111;
    bytes[31] |= 0b0100_0000;
}
