/// Errors surfaced by the note encryption engine
///
/// Every cryptographic failure is terminal for the call that produced it.
/// `AuthenticationFailed` deliberately carries no detail: a tampered record,
/// a record meant for another recipient and a corrupted record all look the same.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("invalid input length, expected {expected} bytes, got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },
    #[error("invalid key: not a usable curve point")]
    InvalidKey,
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("secure randomness unavailable")]
    RandomnessUnavailable,
    #[error("invalid encryption params: {0}")]
    InvalidParams(String),
    #[error("keystream exhausted for the configured nonce")]
    KeystreamExhausted,
}

impl EncryptionError {
    pub(crate) fn length(expected: usize, actual: usize) -> Self {
        Self::InvalidInputLength { expected, actual }
    }
}
