//! MDM REST client
//!
//! Implements [`MdmApi`] over an [`HttpSession`]. Search-style responses are
//! wrapped as `{"result": {"totalCount": n, "offset": k, "searchResults": [...]}}`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::client::HttpSession;
use crate::config::{BackendConfig, MdmEndpoints};
use crate::error::{ConnectorError, ConnectorResult};
use crate::model::{CustomAttributes, Device, DeviceConfig, Space};
use crate::paging::Page;
use crate::traits::{DeviceQuery, MdmApi};

/// Filter applied to app-inventory searches: skip placeholder rows with no
/// installed version. The bundle clause is ANDed onto it; the search API
/// reads `bundleId` from the filter, not as its own parameter.
const INSTALLED_VERSION_FILTER: &str = "version!='0'";

/// MDM client.
#[derive(Debug)]
pub struct MdmClient {
    session: HttpSession,
    endpoints: MdmEndpoints,
}

impl MdmClient {
    /// Create a client with the default endpoint layout.
    pub fn new(config: BackendConfig) -> ConnectorResult<Self> {
        Self::with_endpoints(config, MdmEndpoints::default())
    }

    /// Create a client with custom endpoint paths.
    pub fn with_endpoints(config: BackendConfig, endpoints: MdmEndpoints) -> ConnectorResult<Self> {
        Ok(Self {
            session: HttpSession::new(config)?,
            endpoints,
        })
    }

    pub fn session(&self) -> &HttpSession {
        &self.session
    }

    /// Query parameters for one search page.
    fn search_params(&self, query: &DeviceQuery, start: u64, rows: u32) -> Vec<(String, String)> {
        let pagination = &self.session.config().pagination;
        let mut params: Vec<(String, String)> = Vec::new();

        if let DeviceQuery::AppInventory {
            bundle_id,
            platform,
            ..
        } = query
        {
            params.push(("q".to_string(), String::new()));
            params.push((
                "fq".to_string(),
                format!("{INSTALLED_VERSION_FILTER} AND bundleId={bundle_id}"),
            ));
            params.push(("type".to_string(), "APP_INVENTORY".to_string()));
            params.push(("platformType".to_string(), platform.as_str().to_string()));
        }

        params.push(("dmPartitionId".to_string(), query.space_id().to_string()));
        params.push((pagination.offset_param.clone(), start.to_string()));
        params.push((pagination.size_param.clone(), rows.to_string()));
        params
    }
}

/// Pull the `result` object out of a search envelope.
fn result_object<'a>(body: &'a Value, what: &str) -> ConnectorResult<&'a Value> {
    body.get("result")
        .filter(|r| r.is_object())
        .ok_or_else(|| ConnectorError::invalid_data(format!("{what}: response has no result object")))
}

/// Decode `result.searchResults`; an absent or null list is empty.
fn search_results<T: DeserializeOwned>(result: &Value, what: &str) -> ConnectorResult<Vec<T>> {
    match result.get("searchResults") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(rows) => serde_json::from_value(rows.clone()).map_err(|e| {
            ConnectorError::invalid_data_with_source(format!("{what}: malformed searchResults"), e)
        }),
    }
}

/// Decode one page of a search response.
pub fn parse_search_page<T: DeserializeOwned>(
    body: &Value,
    requested_start: u64,
    what: &str,
) -> ConnectorResult<Page<T>> {
    let result = result_object(body, what)?;

    let total_count = result
        .get("totalCount")
        .and_then(Value::as_u64)
        .ok_or_else(|| ConnectorError::invalid_data(format!("{what}: missing result.totalCount")))?;

    let offset = result
        .get("offset")
        .and_then(Value::as_u64)
        .unwrap_or(requested_start);

    Ok(Page {
        records: search_results(result, what)?,
        total_count,
        offset,
    })
}

#[async_trait]
impl MdmApi for MdmClient {
    fn page_size(&self) -> u32 {
        self.session.config().pagination.page_size
    }

    #[instrument(skip(self))]
    async fn list_spaces(&self) -> ConnectorResult<Vec<Space>> {
        let url = self.session.url(&self.endpoints.list_spaces);
        let body = self.session.get_json(&url, &[]).await?;
        let result = result_object(&body, "list spaces")?;
        let spaces: Vec<Space> = search_results(result, "list spaces")?;
        debug!(count = spaces.len(), "Listed spaces");
        Ok(spaces)
    }

    async fn search_devices(
        &self,
        query: &DeviceQuery,
        start: u64,
        rows: u32,
    ) -> ConnectorResult<Page<Device>> {
        let url = self.session.url(&self.endpoints.search_devices);
        let params = self.search_params(query, start, rows);
        let body = self.session.get_json(&url, &params).await?;
        parse_search_page(&body, start, &query.to_string())
    }

    async fn device_configs(&self, device_id: i64) -> ConnectorResult<Vec<DeviceConfig>> {
        let path = self
            .endpoints
            .endpoint_for_id(&self.endpoints.device_configs, device_id);
        let body = self.session.get_json(&self.session.url(&path), &[]).await?;
        let what = format!("configs of device {device_id}");
        let result = result_object(&body, &what)?;
        search_results(result, &what)
    }

    async fn clear_config_error(&self, device_id: i64, config_id: &str) -> ConnectorResult<()> {
        let url = self.session.url(&self.endpoints.clear_config_error);
        let params = vec![
            ("deviceId".to_string(), device_id.to_string()),
            ("policyUuid".to_string(), config_id.to_string()),
        ];
        self.session.put_json(&url, &params, None).await.map(|_| ())
    }

    async fn put_custom_attributes(
        &self,
        device_id: i64,
        attributes: &CustomAttributes,
    ) -> ConnectorResult<()> {
        let path = self
            .endpoints
            .endpoint_for_id(&self.endpoints.put_custom_attributes, device_id);
        let body = attributes.to_wire();
        self.session
            .put_json(&self.session.url(&path), &[], Some(&body))
            .await
            .map(|_| ())
    }

    async fn delete_custom_attributes(
        &self,
        device_ids: &[i64],
        keys: &[String],
    ) -> ConnectorResult<()> {
        let url = self.session.url(&self.endpoints.delete_custom_attributes);
        let ids: Vec<String> = device_ids.iter().map(ToString::to_string).collect();
        let body = json!({ "ids": ids, "attrKeys": keys });
        self.session.delete_json(&url, &body).await.map(|_| ())
    }
}
