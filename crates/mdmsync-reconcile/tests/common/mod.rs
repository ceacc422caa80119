//! In-memory MDM and directory backends for job tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use mdmsync_connector::{
    AppPlatform, ConnectorError, ConnectorResult, CustomAttributes, Device, DeviceConfig,
    DeviceQuery, DirectoryApi, DirectoryRecord, LinkPage, MdmApi, Page, PlatformType, Space,
};

// =============================================================================
// Fake MDM
// =============================================================================

/// A write the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Put {
        device_id: i64,
        attributes: CustomAttributes,
    },
    Delete {
        device_ids: Vec<i64>,
        keys: Vec<String>,
    },
    Clear {
        device_id: i64,
        config_id: String,
    },
}

/// MDM whose attribute store actually changes on writes, so runs can be
/// repeated against the resulting state.
pub struct FakeMdm {
    page_size: u32,
    spaces: Vec<Space>,
    /// `(space id, device)` in collection order.
    devices: Mutex<Vec<(i64, Device)>>,
    /// `(device id, bundle id, platform)`.
    installs: Vec<(i64, String, AppPlatform)>,
    configs: HashMap<i64, Vec<DeviceConfig>>,
    fail_spaces: bool,
    failing_device_pages: HashSet<u64>,
    failing_app_pages: HashSet<u64>,
    failing_writes: HashSet<i64>,
    failing_config_lookups: HashSet<i64>,
    calls: Mutex<Vec<Call>>,
}

pub fn space(id: i64, name: &str) -> Space {
    Space {
        id,
        name: name.to_string(),
        device_count: 0,
    }
}

impl FakeMdm {
    pub fn new(spaces: Vec<Space>) -> Self {
        Self {
            page_size: 2,
            spaces,
            devices: Mutex::new(Vec::new()),
            installs: Vec::new(),
            configs: HashMap::new(),
            fail_spaces: false,
            failing_device_pages: HashSet::new(),
            failing_app_pages: HashSet::new(),
            failing_writes: HashSet::new(),
            failing_config_lookups: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_device(self, space_id: i64, device: Device) -> Self {
        self.devices.lock().unwrap().push((space_id, device));
        self
    }

    pub fn with_install(mut self, device_id: i64, bundle_id: &str, platform: AppPlatform) -> Self {
        self.installs
            .push((device_id, bundle_id.to_string(), platform));
        self
    }

    pub fn with_configs(mut self, device_id: i64, configs: &[(&str, &str, &str)]) -> Self {
        self.configs.insert(
            device_id,
            configs
                .iter()
                .map(|(id, name, status)| DeviceConfig {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                    status: (*status).to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn with_space_listing_error(mut self) -> Self {
        self.fail_spaces = true;
        self
    }

    pub fn with_failing_device_page(mut self, start: u64) -> Self {
        self.failing_device_pages.insert(start);
        self
    }

    pub fn with_failing_app_page(mut self, start: u64) -> Self {
        self.failing_app_pages.insert(start);
        self
    }

    pub fn with_failing_write(mut self, device_id: i64) -> Self {
        self.failing_writes.insert(device_id);
        self
    }

    pub fn with_failing_config_lookup(mut self, device_id: i64) -> Self {
        self.failing_config_lookups.insert(device_id);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.calls().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Current stored state of a device.
    pub fn device(&self, device_id: i64) -> Device {
        self.devices
            .lock()
            .unwrap()
            .iter()
            .find(|(_, d)| d.id == device_id)
            .map(|(_, d)| d.clone())
            .expect("unknown device")
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_error(device_id: i64) -> ConnectorError {
        ConnectorError::Http {
            status: 500,
            message: format!("write rejected for {device_id}"),
        }
    }
}

#[async_trait]
impl MdmApi for FakeMdm {
    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn list_spaces(&self) -> ConnectorResult<Vec<Space>> {
        if self.fail_spaces {
            return Err(ConnectorError::AuthenticationFailed);
        }
        Ok(self.spaces.clone())
    }

    async fn search_devices(
        &self,
        query: &DeviceQuery,
        start: u64,
        rows: u32,
    ) -> ConnectorResult<Page<Device>> {
        let failing = match query {
            DeviceQuery::Devices { .. } => &self.failing_device_pages,
            DeviceQuery::AppInventory { .. } => &self.failing_app_pages,
        };
        if failing.contains(&start) {
            return Err(ConnectorError::Http {
                status: 503,
                message: "search unavailable".to_string(),
            });
        }

        let devices = self.devices.lock().unwrap();
        let matches: Vec<Device> = devices
            .iter()
            .filter(|(space_id, _)| *space_id == query.space_id())
            .filter(|(_, device)| match query {
                DeviceQuery::Devices { .. } => true,
                DeviceQuery::AppInventory {
                    bundle_id,
                    platform,
                    ..
                } => self.installs.iter().any(|(id, bundle, p)| {
                    *id == device.id && bundle == bundle_id && p == platform
                }),
            })
            .map(|(_, device)| device.clone())
            .collect();

        let total_count = matches.len() as u64;
        let records = matches
            .into_iter()
            .skip(start as usize)
            .take(rows as usize)
            .collect();
        Ok(Page {
            records,
            total_count,
            offset: start,
        })
    }

    async fn device_configs(&self, device_id: i64) -> ConnectorResult<Vec<DeviceConfig>> {
        if self.failing_config_lookups.contains(&device_id) {
            return Err(ConnectorError::ConnectionFailed {
                message: "reset by peer".to_string(),
                source: None,
            });
        }
        Ok(self.configs.get(&device_id).cloned().unwrap_or_default())
    }

    async fn clear_config_error(&self, device_id: i64, config_id: &str) -> ConnectorResult<()> {
        self.record(Call::Clear {
            device_id,
            config_id: config_id.to_string(),
        });
        if self.failing_writes.contains(&device_id) {
            return Err(Self::write_error(device_id));
        }
        Ok(())
    }

    async fn put_custom_attributes(
        &self,
        device_id: i64,
        attributes: &CustomAttributes,
    ) -> ConnectorResult<()> {
        self.record(Call::Put {
            device_id,
            attributes: attributes.clone(),
        });
        if self.failing_writes.contains(&device_id) {
            return Err(Self::write_error(device_id));
        }
        let mut devices = self.devices.lock().unwrap();
        if let Some((_, device)) = devices.iter_mut().find(|(_, d)| d.id == device_id) {
            device.custom_attributes = attributes.clone();
        }
        Ok(())
    }

    async fn delete_custom_attributes(
        &self,
        device_ids: &[i64],
        keys: &[String],
    ) -> ConnectorResult<()> {
        self.record(Call::Delete {
            device_ids: device_ids.to_vec(),
            keys: keys.to_vec(),
        });
        if device_ids.iter().any(|id| self.failing_writes.contains(id)) {
            return Err(Self::write_error(device_ids[0]));
        }
        let mut devices = self.devices.lock().unwrap();
        for (_, device) in devices.iter_mut().filter(|(_, d)| device_ids.contains(&d.id)) {
            for key in keys {
                device.custom_attributes = device.custom_attributes.without(key);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Fake directory
// =============================================================================

/// Directory served as fixed pages linked `page-0 -> page-1 -> ...`.
pub struct FakeDirectory {
    pages: Vec<Vec<DirectoryRecord>>,
    failing_page: Option<usize>,
}

impl FakeDirectory {
    pub fn new(pages: Vec<Vec<DirectoryRecord>>) -> Self {
        Self {
            pages,
            failing_page: None,
        }
    }

    pub fn with_failing_page(mut self, index: usize) -> Self {
        self.failing_page = Some(index);
        self
    }
}

#[async_trait]
impl DirectoryApi for FakeDirectory {
    async fn machines_page(&self, url: Option<&str>) -> ConnectorResult<LinkPage<DirectoryRecord>> {
        let index = match url {
            None => 0,
            Some(link) => link
                .trim_start_matches("page-")
                .parse::<usize>()
                .map_err(|e| ConnectorError::invalid_data_with_source("bad link", e))?,
        };
        if self.failing_page == Some(index) {
            return Err(ConnectorError::Http {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        let records = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(LinkPage { records, next })
    }
}

pub fn machine(serial: &str, environment: Option<&str>) -> DirectoryRecord {
    let mut record = DirectoryRecord::new(serial);
    record.munki_environment = environment.map(str::to_string);
    record
}

pub fn mac(id: i64, serial: &str) -> Device {
    Device::new(id, PlatformType::Osx).with_serial(serial)
}
