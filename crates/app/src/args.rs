pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notecrypt")]
#[command(about = "Encrypt confidential notes to X25519 recipients")]
pub struct Args {
    /// Path to the notecrypt state directory (defaults to ~/.notecrypt)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: crate::Command,
}
