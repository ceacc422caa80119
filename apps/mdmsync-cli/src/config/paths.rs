//! Platform-specific configuration paths

use crate::error::{CliError, CliResult};
use std::path::{Path, PathBuf};

/// Environment variable that overrides every other config directory source.
pub const CONFIG_DIR_ENV: &str = "MDMSYNC_CONFIG_DIR";

/// Configuration paths for the mdmsync CLI
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Base configuration directory
    pub config_dir: PathBuf,
    /// Path to settings.json
    pub settings_file: PathBuf,
    /// Path to the MDM `{user, pass}` file
    pub mdm_credentials_file: PathBuf,
    /// Path to the asset directory `{user, pass}` file
    pub directory_credentials_file: PathBuf,
    /// Where reports are written
    pub results_dir: PathBuf,
}

impl ConfigPaths {
    /// Resolve the configuration directory
    ///
    /// Order: `MDMSYNC_CONFIG_DIR`, then `--config-dir`, then the platform
    /// config directory:
    /// - Linux: ~/.config/mdmsync/
    /// - macOS: ~/Library/Application Support/mdmsync/
    /// - Windows: %APPDATA%\mdmsync\
    pub fn resolve(cli_override: Option<&Path>) -> CliResult<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(Self::at(dir));
        }
        if let Some(dir) = cli_override {
            return Ok(Self::at(dir));
        }

        let base_dir = dirs::config_dir().ok_or_else(|| {
            CliError::Config("Could not determine configuration directory".to_string())
        })?;
        Ok(Self::at(base_dir.join("mdmsync")))
    }

    /// Paths under an explicit directory
    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let credentials_dir = config_dir.join("credentials");

        Self {
            settings_file: config_dir.join("settings.json"),
            mdm_credentials_file: credentials_dir.join("mdm_credentials.json"),
            directory_credentials_file: credentials_dir.join("directory_credentials.json"),
            results_dir: config_dir.join("results"),
            config_dir,
        }
    }

    /// Ensure the results directory exists
    pub fn ensure_results_dir(&self) -> CliResult<()> {
        if !self.results_dir.exists() {
            std::fs::create_dir_all(&self.results_dir)?;
        }
        Ok(())
    }
}
