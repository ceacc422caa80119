//! Inventory sources
//!
//! Wraps the offset-pagination driver with the filters each entity kind
//! needs, and annotates every record with the partition that returned it.

use async_trait::async_trait;
use mdmsync_connector::{
    collect_offset_pages, AppInventoryRecord, AppPlatform, Collected, ConnectorResult, Device,
    DeviceQuery, MdmApi, OffsetPageSource, Page, Space,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{JobError, JobResult};

/// Which partitions a job scans, matched by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", content = "names", rename_all = "snake_case")]
pub enum SpaceFilter {
    #[default]
    All,
    Exclude(Vec<String>),
    Only(Vec<String>),
}

impl SpaceFilter {
    pub fn exclude<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SpaceFilter::Exclude(names.into_iter().map(Into::into).collect())
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SpaceFilter::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn allows(&self, name: &str) -> bool {
        match self {
            SpaceFilter::All => true,
            SpaceFilter::Exclude(names) => !names.iter().any(|n| n == name),
            SpaceFilter::Only(names) => names.iter().any(|n| n == name),
        }
    }

    pub fn apply(&self, spaces: Vec<Space>) -> Vec<Space> {
        spaces.into_iter().filter(|s| self.allows(&s.name)).collect()
    }
}

/// A fixed device search driven page by page.
struct SearchPages<'a> {
    mdm: &'a dyn MdmApi,
    query: DeviceQuery,
}

#[async_trait]
impl OffsetPageSource for SearchPages<'_> {
    type Record = Device;

    async fn fetch_page(&self, start: u64, rows: u32) -> ConnectorResult<Page<Device>> {
        self.mdm.search_devices(&self.query, start, rows).await
    }

    fn describe(&self) -> String {
        self.query.to_string()
    }
}

/// Entity-level reads over the MDM.
pub struct InventorySource<'a> {
    mdm: &'a dyn MdmApi,
}

impl<'a> InventorySource<'a> {
    pub fn new(mdm: &'a dyn MdmApi) -> Self {
        Self { mdm }
    }

    /// Partitions the filter allows.
    ///
    /// A listing failure is fatal to the run: without partitions there is
    /// nothing to scope device queries on.
    pub async fn spaces(&self, filter: &SpaceFilter) -> JobResult<Vec<Space>> {
        let all = self.mdm.list_spaces().await.map_err(JobError::SpaceListing)?;
        let total = all.len();
        let selected = filter.apply(all);

        info!(total = total, selected = selected.len(), "Selected spaces");
        Ok(selected)
    }

    /// Every device in one partition, annotated with that partition.
    pub async fn devices(&self, space: &Space) -> Collected<Device> {
        let source = SearchPages {
            mdm: self.mdm,
            query: DeviceQuery::Devices { space_id: space.id },
        };
        let collected = collect_offset_pages(&source, self.mdm.page_size()).await;
        debug!(
            space_id = space.id,
            space = %space.name,
            devices = collected.records.len(),
            "Collected devices"
        );

        let space_ref = space.reference();
        collected.map(|device| device.in_space(space_ref.clone()))
    }

    /// Devices in one partition with `bundle_id` installed on `platform`.
    pub async fn app_inventory(
        &self,
        space: &Space,
        bundle_id: &str,
        platform: AppPlatform,
    ) -> Collected<AppInventoryRecord> {
        let source = SearchPages {
            mdm: self.mdm,
            query: DeviceQuery::AppInventory {
                space_id: space.id,
                bundle_id: bundle_id.to_string(),
                platform,
            },
        };
        let collected = collect_offset_pages(&source, self.mdm.page_size()).await;
        debug!(
            space_id = space.id,
            space = %space.name,
            bundle_id = %bundle_id,
            platform = %platform,
            devices = collected.records.len(),
            "Collected app inventory"
        );

        let space_ref = space.reference();
        collected.map(|device| AppInventoryRecord {
            device: device.in_space(space_ref.clone()),
            bundle_id: bundle_id.to_string(),
            platform,
        })
    }

    /// Devices across several partitions, in partition order.
    pub async fn devices_in(&self, spaces: &[Space]) -> Collected<Device> {
        let mut all = Collected::default();
        for space in spaces {
            all.absorb(self.devices(space).await);
        }
        all
    }

    /// App inventory across several partitions, in partition order.
    pub async fn app_inventory_in(
        &self,
        spaces: &[Space],
        bundle_id: &str,
        platform: AppPlatform,
    ) -> Collected<AppInventoryRecord> {
        let mut all = Collected::default();
        for space in spaces {
            all.absorb(self.app_inventory(space, bundle_id, platform).await);
        }
        all
    }
}
