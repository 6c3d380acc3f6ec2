use std::fmt;

/// Build metadata captured by `build.rs`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub repo_version: &'static str,
    pub profile: &'static str,
    pub timestamp: &'static str,
    pub rust_version: &'static str,
    pub target: Option<&'static str>,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            repo_version: env!("REPO_VERSION"),
            profile: env!("BUILD_PROFILE"),
            timestamp: env!("BUILD_TIMESTAMP"),
            rust_version: env!("RUST_VERSION"),
            target: option_env!("BUILD_TARGET"),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {} build, {})",
            env!("CARGO_PKG_NAME"),
            self.version,
            self.repo_version,
            self.profile,
            self.timestamp
        )?;
        write!(f, "\n{}", self.rust_version)?;
        if let Some(target) = self.target {
            write!(f, " [{}]", target)?;
        }
        Ok(())
    }
}
