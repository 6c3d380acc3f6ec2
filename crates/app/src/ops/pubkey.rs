use clap::Args;

use crate::state::{AppState, StateError};

/// Print the public key of the stored recipient key
#[derive(Args, Debug, Clone)]
pub struct Pubkey;

#[derive(Debug, thiserror::Error)]
pub enum PubkeyError {
    #[error("pubkey failed: {0}")]
    State(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Pubkey {
    type Error = PubkeyError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        Ok(state.load_key()?.public().to_hex())
    }
}
