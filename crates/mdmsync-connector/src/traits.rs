//! Backend capability traits
//!
//! The reconciliation jobs only see these traits; [`crate::MdmClient`] and
//! [`crate::DirectoryClient`] are the HTTP implementations.

use async_trait::async_trait;

use crate::error::ConnectorResult;
use crate::model::{AppPlatform, CustomAttributes, Device, DeviceConfig, DirectoryRecord, Space};
use crate::paging::{LinkPage, Page};

/// Filters for the MDM device search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceQuery {
    /// Every device in a partition.
    Devices { space_id: i64 },

    /// Devices in a partition with an app installed. The endpoint accepts a
    /// single platform per call.
    AppInventory {
        space_id: i64,
        bundle_id: String,
        platform: AppPlatform,
    },
}

impl DeviceQuery {
    pub fn space_id(&self) -> i64 {
        match self {
            DeviceQuery::Devices { space_id } | DeviceQuery::AppInventory { space_id, .. } => {
                *space_id
            }
        }
    }
}

impl std::fmt::Display for DeviceQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceQuery::Devices { space_id } => write!(f, "devices(space={space_id})"),
            DeviceQuery::AppInventory {
                space_id,
                bundle_id,
                platform,
            } => write!(
                f,
                "app-inventory(space={space_id}, bundle={bundle_id}, platform={platform})"
            ),
        }
    }
}

/// Operations the jobs need from the MDM.
#[async_trait]
pub trait MdmApi: Send + Sync {
    /// Rows requested per search page.
    fn page_size(&self) -> u32;

    /// List organizational partitions.
    async fn list_spaces(&self) -> ConnectorResult<Vec<Space>>;

    /// One page of a device search.
    async fn search_devices(
        &self,
        query: &DeviceQuery,
        start: u64,
        rows: u32,
    ) -> ConnectorResult<Page<Device>>;

    /// Configurations applied to a device.
    async fn device_configs(&self, device_id: i64) -> ConnectorResult<Vec<DeviceConfig>>;

    /// Clear the error state of one config on one device.
    async fn clear_config_error(&self, device_id: i64, config_id: &str) -> ConnectorResult<()>;

    /// Replace a device's full custom-attribute map.
    ///
    /// Callers are responsible for merging; whatever map is passed becomes
    /// the device's attribute set.
    async fn put_custom_attributes(
        &self,
        device_id: i64,
        attributes: &CustomAttributes,
    ) -> ConnectorResult<()>;

    /// Remove attribute keys from a set of devices, leaving other keys alone.
    async fn delete_custom_attributes(
        &self,
        device_ids: &[i64],
        keys: &[String],
    ) -> ConnectorResult<()>;
}

/// Read access to the secondary asset directory.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// Fetch the page at `url`, or the first page when `url` is `None`.
    async fn machines_page(&self, url: Option<&str>) -> ConnectorResult<LinkPage<DirectoryRecord>>;
}
