//! # MDM Connector
//!
//! HTTP plumbing for the mdmsync reconciliation jobs.
//!
//! This crate talks to two backends: the MDM inventory API (offset-paginated
//! searches, custom-attribute writes, config-error clearing) and a secondary
//! asset directory (next-link pagination). Everything above the wire lives in
//! `mdmsync-reconcile`.
//!
//! ## Features
//!
//! - Basic-auth sessions with per-backend timeouts, TLS options and CA bundles
//! - Token-bucket rate ceiling and opt-in retry with exponential backoff
//! - Skip-and-count pagination drivers for both pagination styles
//! - Lenient wire models: missing optional fields default to empty values
//!
//! ## Example
//!
//! ```ignore
//! use mdmsync_connector::{BackendConfig, Credentials, MdmApi, MdmClient};
//!
//! let config = BackendConfig::new("https://na1.mobileiron.com/api/v1", Credentials::new("svc", "pw"));
//! let mdm = MdmClient::new(config)?;
//! let spaces = mdm.list_spaces().await?;
//! ```

pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod mdm;
pub mod model;
pub mod paging;
pub mod rate_limit;
pub mod traits;

// Re-exports
pub use client::{HttpMethod, HttpSession};
pub use config::{
    BackendConfig, ConnectionSettings, Credentials, MdmEndpoints, PaginationConfig, TlsConfig,
};
pub use directory::{DirectoryClient, DirectorySnapshot};
pub use error::{ConnectorError, ConnectorResult};
pub use mdm::MdmClient;
pub use model::{
    AppInventoryRecord, AppPlatform, CustomAttributes, Device, DeviceConfig, DirectoryRecord,
    PlatformType, RegistrationState, Space, SpaceRef,
};
pub use paging::{
    collect_linked, collect_offset_pages, Collected, LinkPage, LinkPageSource, OffsetPageSource,
    Page,
};
pub use rate_limit::{LogVerbosity, RateLimitConfig, RateLimiter, RetryConfig};
pub use traits::{DeviceQuery, DirectoryApi, MdmApi};
