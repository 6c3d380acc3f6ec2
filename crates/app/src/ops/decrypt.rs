use clap::Args;
use common::crypto::EncryptionError;
use common::note::{Note, NOTE_SIZE};

use crate::state::{AppState, StateError};

/// Decrypt a note record with the stored recipient key
#[derive(Args, Debug, Clone)]
pub struct Decrypt {
    /// Ciphertext record as hex
    #[arg(long)]
    pub ciphertext: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    #[error("decrypt failed: {0}")]
    State(#[from] StateError),
    #[error("invalid ciphertext hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("decrypt failed: {0}")]
    Encryption(#[from] EncryptionError),
}

fn render(plaintext: &[u8]) -> String {
    let mut output = format!("note: {}", hex::encode(plaintext));
    if plaintext.len() == NOTE_SIZE {
        if let Ok(note) = Note::from_bytes(plaintext) {
            output.push_str(&format!(
                "\n- apk: {}\n- value: {}\n- rho: {}\n- trap_r: {}",
                hex::encode(note.apk),
                note.value,
                hex::encode(note.rho),
                hex::encode(note.trap_r)
            ));
        }
    }
    output
}

#[async_trait::async_trait]
impl crate::op::Op for Decrypt {
    type Error = DecryptError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let cipher = state.cipher()?;
        let key = state.load_key()?;

        let record = super::decode_hex(&self.ciphertext)?;
        let plaintext = cipher.decrypt(&record, &key)?;
        Ok(render(&plaintext))
    }
}
