use clap::Args;
use common::crypto::EncryptionParams;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Domain-separation tag for key derivation (default: ZethEncryption)
    #[arg(long)]
    pub kdf_tag: Option<String>,

    /// Note size in bytes (default: 104)
    #[arg(long)]
    pub note_size: Option<usize>,

    /// Value encoded into the fixed symmetric nonce (default: 0)
    #[arg(long)]
    pub nonce_value: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

impl Init {
    fn params(&self) -> EncryptionParams {
        let mut params = EncryptionParams::default();
        if let Some(kdf_tag) = &self.kdf_tag {
            params.kdf_tag = kdf_tag.clone();
        }
        if let Some(note_size) = self.note_size {
            params.note_size = note_size;
        }
        if let Some(nonce_value) = self.nonce_value {
            params.nonce_value = nonce_value;
        }
        params
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            encryption: self.params(),
        };
        let state = AppState::init(ctx.config_path.clone(), Some(config))?;
        let public = state.load_key()?.public();

        let output = format!(
            "Initialized notecrypt directory at: {}\n\
             - Key: {}\n\
             - Config: {}\n\
             - Note size: {}\n\
             - Ciphertext size: {}\n\
             Public key: {}",
            state.state_dir.display(),
            state.key_path.display(),
            state.config_path.display(),
            state.config.encryption.note_size,
            state.config.encryption.ciphertext_size(),
            public.to_hex()
        );

        Ok(output)
    }
}
