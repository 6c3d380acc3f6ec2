/**
 * Cryptographic types and operations.
 *  - Recipient key pairs and their encodings
 *  - Hybrid note encryption: X25519, BLAKE2b,
 *    ChaCha20 and Poly1305
 */
pub mod crypto;
/**
 * The structured note that the encryption
 *  engine is sized for by default.
 */
pub mod note;

pub mod prelude {
    pub use crate::crypto::{
        decrypt, encrypt, EncryptedNote, EncryptionError, EncryptionParams, KeyPair, NoteCipher,
        PublicKey, SecretKey,
    };
    pub use crate::note::{Note, NOTE_SIZE};
}
