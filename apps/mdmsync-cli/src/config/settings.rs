//! settings.json: backend URLs and session tuning

use crate::error::{CliError, CliResult};
use mdmsync_connector::{
    BackendConfig, ConnectionSettings, Credentials, LogVerbosity, MdmEndpoints,
    RateLimitConfig, RetryConfig,
};
use serde::{Deserialize, Serialize};

use super::paths::ConfigPaths;

pub const DEFAULT_MDM_URL: &str = "https://na2.mobileiron.com/api/v1";
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Session tuning shared by both backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub log_verbosity: LogVerbosity,
}

impl SessionSettings {
    fn apply(&self, config: BackendConfig) -> BackendConfig {
        let mut config = config
            .with_retry(self.retry.clone())
            .with_rate_limit(self.rate_limit.clone())
            .with_log_verbosity(self.log_verbosity);
        config.connection = self.connection.clone();
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdmSettings {
    #[serde(default = "default_mdm_url")]
    pub base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Endpoint path overrides.
    #[serde(default)]
    pub endpoints: MdmEndpoints,

    #[serde(flatten)]
    pub session: SessionSettings,
}

fn default_mdm_url() -> String {
    DEFAULT_MDM_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for MdmSettings {
    fn default() -> Self {
        Self {
            base_url: default_mdm_url(),
            page_size: default_page_size(),
            endpoints: MdmEndpoints::default(),
            session: SessionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySettings {
    /// Unset means jobs that need the directory cannot run.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_machines_path")]
    pub machines_path: String,

    /// PEM bundle for an internal CA.
    #[serde(default)]
    pub ca_cert: Option<String>,

    #[serde(flatten)]
    pub session: SessionSettings,
}

fn default_machines_path() -> String {
    "/api/machines/".to_string()
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            base_url: None,
            machines_path: default_machines_path(),
            ca_cert: None,
            session: SessionSettings::default(),
        }
    }
}

/// Contents of settings.json. Every field has a default, so a missing file
/// or an empty object is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub mdm: MdmSettings,
    #[serde(default)]
    pub directory: DirectorySettings,
}

impl Settings {
    /// Load settings.json, falling back to defaults when it does not exist
    pub fn load(paths: &ConfigPaths) -> CliResult<Self> {
        if !paths.settings_file.exists() {
            tracing::debug!(path = %paths.settings_file.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&paths.settings_file)?;
        let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            CliError::Config(format!(
                "{}: {}",
                paths.settings_file.display(),
                e
            ))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.mdm.page_size == 0 {
            return Err(CliError::Config(
                "mdm.page_size must be greater than zero".to_string(),
            ));
        }
        if self.mdm.base_url.trim().is_empty() {
            return Err(CliError::Config("mdm.base_url is required".to_string()));
        }
        Ok(())
    }

    /// Session configuration for the MDM
    pub fn mdm_backend(&self, credentials: Credentials) -> BackendConfig {
        let config = BackendConfig::new(&self.mdm.base_url, credentials)
            .with_page_size(self.mdm.page_size);
        self.mdm.session.apply(config)
    }

    /// Session configuration for the asset directory, if one is configured
    pub fn directory_backend(&self, credentials: Credentials) -> Option<BackendConfig> {
        let base_url = self.directory.base_url.as_deref()?;
        let mut config = self
            .directory
            .session
            .apply(BackendConfig::new(base_url, credentials));
        if let Some(ca_cert) = &self.directory.ca_cert {
            config = config.with_ca_cert(ca_cert);
        }
        Some(config)
    }
}
