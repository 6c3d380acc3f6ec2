use std::{
    fs,
    path::{Path, PathBuf},
};

use common::crypto::{EncryptionError, EncryptionParams, NoteCipher, SecretKey};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "notecrypt";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const KEY_FILE_NAME: &str = "key.pem";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Protocol parameters used by encrypt and decrypt
    #[serde(default)]
    pub encryption: EncryptionParams,
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the state directory (~/.notecrypt)
    pub state_dir: PathBuf,
    /// Path to the recipient secret key PEM file
    pub key_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the state directory path (custom or default ~/.notecrypt)
    pub fn state_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    pub fn exists(custom_path: Option<PathBuf>) -> Result<bool, StateError> {
        Ok(Self::state_dir(custom_path)?.exists())
    }

    /// Initialize a new state directory with a fresh recipient key
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let state_dir = Self::state_dir(custom_path)?;
        if state_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        // refuse to write a config that encrypt/decrypt would reject
        let config = config.unwrap_or_default();
        config.encryption.validate()?;

        create_private_dir(&state_dir)?;

        // a half-written directory would block both a retry and load
        let (key_path, config_path) = Self::write_initial_files(&state_dir, &config)
            .map_err(|e| {
                tracing::warn!(
                    path = %state_dir.display(),
                    "init failed, removing state directory: {}",
                    e
                );
                if let Err(rm) = fs::remove_dir_all(&state_dir) {
                    tracing::warn!("failed to remove partial state directory: {}", rm);
                }
                e
            })?;

        tracing::info!(path = %state_dir.display(), "initialized state directory");

        Ok(Self {
            state_dir,
            key_path,
            config_path,
            config,
        })
    }

    fn write_initial_files(
        state_dir: &Path,
        config: &AppConfig,
    ) -> Result<(PathBuf, PathBuf), StateError> {
        let key = SecretKey::generate()?;
        let key_path = state_dir.join(KEY_FILE_NAME);
        write_private(&key_path, &key.to_pem())?;

        let config_path = state_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(config)?)?;

        Ok((key_path, config_path))
    }

    /// Load existing state from the state directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let state_dir = Self::state_dir(custom_path)?;
        if !state_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let key_path = state_dir.join(KEY_FILE_NAME);
        let config_path = state_dir.join(CONFIG_FILE_NAME);

        if !key_path.exists() {
            return Err(StateError::MissingFile(KEY_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;
        tracing::debug!(
            note_size = config.encryption.note_size,
            nonce_value = config.encryption.nonce_value,
            "loaded config"
        );

        Ok(Self {
            state_dir,
            key_path,
            config_path,
            config,
        })
    }

    /// Load the recipient secret key from the key file
    pub fn load_key(&self) -> Result<SecretKey, StateError> {
        let pem = fs::read_to_string(&self.key_path)?;
        SecretKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))
    }

    /// Build the encryption engine from the configured params
    pub fn cipher(&self) -> Result<NoteCipher, StateError> {
        Ok(NoteCipher::new(self.config.encryption.clone())?)
    }
}

fn create_private_dir(dir: &Path) -> Result<(), StateError> {
    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

/// Write a file readable only by the owner (0600 on unix)
fn write_private(path: &Path, content: &str) -> Result<(), StateError> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    fs::write(path, content)?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("notecrypt directory not initialized. Run 'notecrypt init' first")]
    NotInitialized,

    #[error("notecrypt directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn state_path(temp: &TempDir) -> Option<PathBuf> {
        Some(temp.path().join("state"))
    }

    #[test]
    fn test_init_and_load() {
        let temp = TempDir::new().unwrap();
        let state = AppState::init(state_path(&temp), None).unwrap();

        assert!(state.key_path.exists());
        assert!(state.config_path.exists());
        assert_eq!(state.config, AppConfig::default());

        let loaded = AppState::load(state_path(&temp)).unwrap();
        assert_eq!(loaded.config, state.config);
        assert_eq!(
            loaded.load_key().unwrap().public(),
            state.load_key().unwrap().public()
        );
    }

    #[test]
    fn test_init_twice_fails() {
        let temp = TempDir::new().unwrap();
        AppState::init(state_path(&temp), None).unwrap();
        assert!(matches!(
            AppState::init(state_path(&temp), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_uninitialized() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            AppState::load(state_path(&temp)),
            Err(StateError::NotInitialized)
        ));
    }

    #[test]
    fn test_missing_key_file() {
        let temp = TempDir::new().unwrap();
        let state = AppState::init(state_path(&temp), None).unwrap();
        fs::remove_file(&state.key_path).unwrap();
        assert!(matches!(
            AppState::load(state_path(&temp)),
            Err(StateError::MissingFile(name)) if name == KEY_FILE_NAME
        ));
    }

    #[test]
    fn test_custom_params_persisted() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            encryption: EncryptionParams {
                kdf_tag: "CustomTag".to_string(),
                note_size: 64,
                nonce_value: 3,
            },
        };
        AppState::init(state_path(&temp), Some(config.clone())).unwrap();

        let loaded = AppState::load(state_path(&temp)).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.cipher().unwrap().params().note_size, 64);
    }

    #[test]
    fn test_invalid_params_not_written() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            encryption: EncryptionParams::with_note_size(0),
        };
        assert!(matches!(
            AppState::init(state_path(&temp), Some(config)),
            Err(StateError::Encryption(EncryptionError::InvalidParams(_)))
        ));
        assert!(!temp.path().join("state").exists());
    }

    #[test]
    fn test_failed_init_leaves_nothing_behind() {
        let temp = TempDir::new().unwrap();
        // valid params, but toml cannot hold a u64 above i64::MAX, so the
        // config write fails after the key file exists
        let config = AppConfig {
            encryption: EncryptionParams {
                nonce_value: 1 << 63,
                ..EncryptionParams::default()
            },
        };
        assert!(config.encryption.validate().is_ok());
        assert!(matches!(
            AppState::init(state_path(&temp), Some(config)),
            Err(StateError::TomlSer(_))
        ));
        assert!(!temp.path().join("state").exists());

        let state = AppState::init(state_path(&temp), None).unwrap();
        assert!(AppState::load(state_path(&temp)).is_ok());
        assert!(state.key_path.exists());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let state = AppState::init(state_path(&temp), None).unwrap();
        fs::write(&state.config_path, "").unwrap();

        let loaded = AppState::load(state_path(&temp)).unwrap();
        assert_eq!(loaded.config.encryption, EncryptionParams::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let state = AppState::init(state_path(&temp), None).unwrap();
        let mode = fs::metadata(&state.key_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
