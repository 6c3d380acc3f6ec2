use clap::Args;
use common::crypto::{EncryptionError, KeyError, NoteCipher, PublicKey};
use common::note::{Note, NoteError};

use crate::state::{AppState, StateError};

/// Encrypt a note to a recipient public key
#[derive(Args, Debug, Clone)]
pub struct Encrypt {
    /// Recipient public key as hex (defaults to the stored key's own public key)
    #[arg(long)]
    pub recipient: Option<String>,

    /// Raw note bytes as hex
    #[arg(long, conflicts_with_all = ["apk", "value", "rho", "trap_r"])]
    pub note: Option<String>,

    /// Note paying key (32 bytes hex)
    #[arg(long, required_unless_present = "note", requires_all = ["value", "rho", "trap_r"])]
    pub apk: Option<String>,

    /// Note value
    #[arg(long)]
    pub value: Option<u64>,

    /// Note nullifier seed (32 bytes hex)
    #[arg(long)]
    pub rho: Option<String>,

    /// Note commitment trapdoor (32 bytes hex)
    #[arg(long)]
    pub trap_r: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
    #[error("encrypt failed: {0}")]
    State(#[from] StateError),
    #[error("invalid recipient: {0}")]
    Recipient(#[from] KeyError),
    #[error("invalid note: {0}")]
    Note(#[from] NoteError),
    #[error("invalid {0}: {1}")]
    Field(&'static str, String),
    #[error("no recipient given and no stored key to default to")]
    NoRecipient,
    #[error("encrypt failed: {0}")]
    Encryption(#[from] EncryptionError),
}

impl Encrypt {
    fn message(&self) -> Result<Vec<u8>, EncryptError> {
        if let Some(note) = &self.note {
            return super::decode_hex(note)
                .map_err(|e| EncryptError::Field("note", e.to_string()));
        }

        let note = Note {
            apk: field("apk", self.apk.as_deref())?,
            value: self.value.ok_or(EncryptError::Field("value", "missing".into()))?,
            rho: field("rho", self.rho.as_deref())?,
            trap_r: field("trap_r", self.trap_r.as_deref())?,
        };
        Ok(note.to_bytes().to_vec())
    }
}

fn field(name: &'static str, hex: Option<&str>) -> Result<[u8; 32], EncryptError> {
    let hex = hex.ok_or(EncryptError::Field(name, "missing".into()))?;
    let bytes = super::decode_hex(hex).map_err(|e| EncryptError::Field(name, e.to_string()))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| EncryptError::Field(name, format!("expected 32 bytes, got {}", b.len())))
}

#[async_trait::async_trait]
impl crate::op::Op for Encrypt {
    type Error = EncryptError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = if AppState::exists(ctx.config_path.clone())? {
            Some(AppState::load(ctx.config_path.clone())?)
        } else {
            None
        };

        let recipient = match (&self.recipient, &state) {
            (Some(hex), _) => PublicKey::from_hex(hex.trim())?,
            (None, Some(state)) => state.load_key()?.public(),
            (None, None) => return Err(EncryptError::NoRecipient),
        };

        let cipher = match &state {
            Some(state) => state.cipher()?,
            None => NoteCipher::default(),
        };

        let message = self.message()?;
        tracing::info!(
            recipient = %recipient,
            note_size = message.len(),
            "encrypting note"
        );
        Ok(cipher.encrypt(&message, &recipient)?.to_hex())
    }
}
