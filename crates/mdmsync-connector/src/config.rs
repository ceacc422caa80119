//! Backend configuration
//!
//! Configuration types for the MDM and secondary-directory HTTP sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConnectorError, ConnectorResult};
use crate::rate_limit::{LogVerbosity, RateLimitConfig, RetryConfig};

const REDACTED: &str = "***REDACTED***";

/// A (username, password) pair for one backend.
///
/// Deserializes from the operator's credential file: `{"user": ..., "pass": ...}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// Copy safe to log.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            user: self.user.clone(),
            pass: REDACTED.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &REDACTED)
            .finish()
    }
}

/// Connection timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_read_timeout() -> u64 {
    120
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: default_connection_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

/// TLS options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether to verify the server certificate.
    #[serde(default = "default_true")]
    pub verify_certificate: bool,

    /// Extra PEM bundle to trust (internal CAs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify_certificate: true,
            ca_cert_path: None,
        }
    }
}

/// Offset pagination parameters for search-style endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Query parameter carrying the offset.
    #[serde(default = "default_offset_param")]
    pub offset_param: String,

    /// Query parameter carrying the page size.
    #[serde(default = "default_size_param")]
    pub size_param: String,

    /// Page size.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_offset_param() -> String {
    "start".to_string()
}

fn default_size_param() -> String {
    "rows".to_string()
}

fn default_page_size() -> u32 {
    500
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            offset_param: default_offset_param(),
            size_param: default_size_param(),
            page_size: default_page_size(),
        }
    }
}

/// Configuration for one backend session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL for requests (e.g., "https://na2.mobileiron.com/api/v1").
    pub base_url: String,

    /// Basic-auth credentials.
    pub credentials: Credentials,

    /// TLS configuration.
    #[serde(default)]
    pub tls: TlsConfig,

    /// Connection settings (timeouts).
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// Pagination configuration.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Request-rate ceiling.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry configuration with exponential backoff.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging verbosity for request/response logging.
    #[serde(default)]
    pub log_verbosity: LogVerbosity,
}

impl BackendConfig {
    /// Create a new backend config with required fields.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            tls: TlsConfig::default(),
            connection: ConnectionSettings::default(),
            pagination: PaginationConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            log_verbosity: LogVerbosity::default(),
        }
    }

    /// Build the full URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Set the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.pagination.page_size = page_size;
        self
    }

    /// Set rate limiting configuration.
    #[must_use]
    pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Set retry configuration.
    #[must_use]
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set logging verbosity.
    #[must_use]
    pub fn with_log_verbosity(mut self, verbosity: LogVerbosity) -> Self {
        self.log_verbosity = verbosity;
        self
    }

    /// Trust an extra PEM bundle.
    #[must_use]
    pub fn with_ca_cert(mut self, path: impl Into<String>) -> Self {
        self.tls.ca_cert_path = Some(path.into());
        self
    }

    /// Check the configuration before any request is made.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.base_url.is_empty() {
            return Err(ConnectorError::invalid_configuration("base_url is required"));
        }

        let url = url::Url::parse(&self.base_url).map_err(|e| {
            ConnectorError::invalid_configuration(format!("invalid base_url: {e}"))
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConnectorError::invalid_configuration(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        if self.pagination.page_size == 0 {
            return Err(ConnectorError::invalid_configuration(
                "page_size must be greater than zero",
            ));
        }

        if self.credentials.user.is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "credentials.user is required",
            ));
        }

        Ok(())
    }

    /// Copy safe to log.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.credentials = config.credentials.redacted();
        config
    }
}

/// MDM endpoint paths, relative to the base URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdmEndpoints {
    /// List partitions (GET).
    #[serde(default = "default_spaces_endpoint")]
    pub list_spaces: String,

    /// Device search, also used for app-inventory queries (GET).
    #[serde(default = "default_devices_endpoint")]
    pub search_devices: String,

    /// Configs applied to one device (GET).
    #[serde(default = "default_configs_endpoint")]
    pub device_configs: String,

    /// Clear a config error (PUT).
    #[serde(default = "default_clear_config_endpoint")]
    pub clear_config_error: String,

    /// Replace one device's custom attributes (PUT).
    #[serde(default = "default_put_attributes_endpoint")]
    pub put_custom_attributes: String,

    /// Remove attribute keys from a set of devices (DELETE).
    #[serde(default = "default_delete_attributes_endpoint")]
    pub delete_custom_attributes: String,

    /// ID placeholder in paths (default: "{id}").
    #[serde(default = "default_id_placeholder")]
    pub id_placeholder: String,
}

fn default_spaces_endpoint() -> String {
    "/tenant/partition/device".to_string()
}

fn default_devices_endpoint() -> String {
    "/device".to_string()
}

fn default_configs_endpoint() -> String {
    "/device/{id}/configs".to_string()
}

fn default_clear_config_endpoint() -> String {
    "/device/clearConfigError".to_string()
}

fn default_put_attributes_endpoint() -> String {
    "/device/{id}/customattributes".to_string()
}

fn default_delete_attributes_endpoint() -> String {
    "/device/customattributes".to_string()
}

fn default_id_placeholder() -> String {
    "{id}".to_string()
}

impl Default for MdmEndpoints {
    fn default() -> Self {
        Self {
            list_spaces: default_spaces_endpoint(),
            search_devices: default_devices_endpoint(),
            device_configs: default_configs_endpoint(),
            clear_config_error: default_clear_config_endpoint(),
            put_custom_attributes: default_put_attributes_endpoint(),
            delete_custom_attributes: default_delete_attributes_endpoint(),
            id_placeholder: default_id_placeholder(),
        }
    }
}

impl MdmEndpoints {
    /// Substitute an id into a path template.
    pub fn endpoint_for_id(&self, template: &str, id: impl fmt::Display) -> String {
        template.replace(&self.id_placeholder, &id.to_string())
    }
}
