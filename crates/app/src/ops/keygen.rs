use clap::Args;
use common::crypto::{EncryptionError, KeyPair};

/// Generate a key pair without touching the state directory
#[derive(Args, Debug, Clone)]
pub struct Keygen {
    /// Print the secret key as PEM instead of hex
    #[arg(long)]
    pub pem: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum KeygenError {
    #[error("keygen failed: {0}")]
    Generate(#[from] EncryptionError),
}

#[async_trait::async_trait]
impl crate::op::Op for Keygen {
    type Error = KeygenError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pair = KeyPair::generate()?;
        let secret = if self.pem {
            pair.secret().to_pem().trim_end().to_string()
        } else {
            pair.secret().to_hex().to_string()
        };

        Ok(format!(
            "secret: {}\npublic: {}",
            secret,
            pair.public().to_hex()
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::op::{Op, OpContext};
    use common::crypto::SecretKey;

    #[tokio::test]
    async fn test_keygen_pair_matches() {
        let output = Keygen { pem: false }
            .execute(&OpContext::default())
            .await
            .unwrap();

        let mut lines = output.lines();
        let secret = lines.next().unwrap().strip_prefix("secret: ").unwrap();
        let public = lines.next().unwrap().strip_prefix("public: ").unwrap();
        assert_eq!(SecretKey::from_hex(secret).unwrap().public().to_hex(), public);
    }

    #[tokio::test]
    async fn test_keygen_pem() {
        let output = Keygen { pem: true }
            .execute(&OpContext::default())
            .await
            .unwrap();

        let (secret, public) = output.split_once("\npublic: ").unwrap();
        let secret = secret.strip_prefix("secret: ").unwrap();
        assert_eq!(SecretKey::from_pem(secret).unwrap().public().to_hex(), public);
    }
}
