pub mod decrypt;
pub mod encrypt;
pub mod init;
pub mod keygen;
pub mod pubkey;
pub mod version;

pub use decrypt::Decrypt;
pub use encrypt::Encrypt;
pub use init::Init;
pub use keygen::Keygen;
pub use pubkey::Pubkey;
pub use version::Version;

/// Decode a hex argument, accepting an optional "0x" prefix
pub(crate) fn decode_hex(hex: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(hex.trim().strip_prefix("0x").unwrap_or(hex.trim()))
}
