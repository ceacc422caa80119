//! Secondary asset directory client
//!
//! The directory lists machines as `{"results": [...], "next": url|null}`
//! and is walked by following `next`. The client builds lookups only;
//! deciding what a record means is up to the caller.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::client::HttpSession;
use crate::config::BackendConfig;
use crate::error::{ConnectorError, ConnectorResult};
use crate::model::DirectoryRecord;
use crate::paging::{collect_linked, LinkPage, LinkPageSource};
use crate::traits::DirectoryApi;

#[derive(Debug, Deserialize)]
struct MachinesEnvelope {
    #[serde(default)]
    results: Option<Vec<DirectoryRecord>>,
    #[serde(default)]
    next: Option<String>,
}

/// Decode one page of the machines listing.
pub fn parse_machines_page(body: serde_json::Value) -> ConnectorResult<LinkPage<DirectoryRecord>> {
    let envelope: MachinesEnvelope = serde_json::from_value(body)
        .map_err(|e| ConnectorError::invalid_data_with_source("malformed machines page", e))?;

    Ok(LinkPage {
        records: envelope.results.unwrap_or_default(),
        next: envelope.next,
    })
}

/// Directory client.
#[derive(Debug)]
pub struct DirectoryClient {
    session: HttpSession,
    machines_path: String,
}

impl DirectoryClient {
    /// Create a client listing machines at `base_url` + `machines_path`.
    pub fn new(config: BackendConfig, machines_path: impl Into<String>) -> ConnectorResult<Self> {
        Ok(Self {
            session: HttpSession::new(config)?,
            machines_path: machines_path.into(),
        })
    }

    pub fn session(&self) -> &HttpSession {
        &self.session
    }
}

#[async_trait]
impl DirectoryApi for DirectoryClient {
    async fn machines_page(&self, url: Option<&str>) -> ConnectorResult<LinkPage<DirectoryRecord>> {
        let url = match url {
            Some(link) => link.to_string(),
            None => self.session.url(&self.machines_path),
        };
        let body = self.session.get_json(&url, &[]).await?;
        parse_machines_page(body)
    }
}

struct MachinePages<'a>(&'a dyn DirectoryApi);

#[async_trait]
impl LinkPageSource for MachinePages<'_> {
    type Record = DirectoryRecord;

    async fn fetch_link_page(&self, url: Option<&str>) -> ConnectorResult<LinkPage<DirectoryRecord>> {
        self.0.machines_page(url).await
    }
}

/// Every directory record from one walk, indexed by serial.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    serials: HashSet<String>,
    by_serial: HashMap<String, Vec<DirectoryRecord>>,
    failed_pages: u32,
}

impl DirectorySnapshot {
    /// Fetch the whole directory.
    pub async fn fetch(api: &dyn DirectoryApi) -> Self {
        let collected = collect_linked(&MachinePages(api)).await;
        let failed_pages = collected.failed_pages;
        let snapshot = Self::from_records(collected.records).with_failed_pages(failed_pages);

        info!(
            serials = snapshot.serials.len(),
            failed_pages = failed_pages,
            "Fetched directory snapshot"
        );
        snapshot
    }

    /// Build lookups from records already in hand.
    pub fn from_records(records: impl IntoIterator<Item = DirectoryRecord>) -> Self {
        let mut snapshot = Self::default();
        for record in records {
            snapshot.serials.insert(record.serial.clone());
            snapshot
                .by_serial
                .entry(record.serial.clone())
                .or_default()
                .push(record);
        }
        snapshot
    }

    #[must_use]
    pub fn with_failed_pages(mut self, failed_pages: u32) -> Self {
        self.failed_pages = failed_pages;
        self
    }

    /// All serials in the directory.
    pub fn serials(&self) -> &HashSet<String> {
        &self.serials
    }

    pub fn contains(&self, serial: &str) -> bool {
        self.serials.contains(serial)
    }

    /// Records for a serial. A serial can appear more than once.
    pub fn records_for(&self, serial: &str) -> &[DirectoryRecord] {
        self.by_serial.get(serial).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Serial to records, for callers that classify.
    pub fn classification(&self) -> &HashMap<String, Vec<DirectoryRecord>> {
        &self.by_serial
    }

    /// Pages that failed during the walk; a nonzero value means the
    /// snapshot is partial.
    pub fn failed_pages(&self) -> u32 {
        self.failed_pages
    }

    pub fn len(&self) -> usize {
        self.serials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }
}
