//! Blocking HTTP implementation of `TwinApi`.

use crate::api::{ApiError, ApiResult, TwinApi};
use crate::config::ApiConfig;
use crate::model::bulk::{
    AssociationsBulkResult, BulkAssociationsPayload, BulkCounts, BulkToolPayload,
};
use crate::model::digital_twin::{DigitalTwin, DigitalTwinId, Group, Layer, LayerId};
use crate::model::tool::{ToolCatalogItem, ToolKind};
use log::{info, warn};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

pub fn digital_twins_path() -> String {
    "digital-twins".to_string()
}

pub fn digital_twin_path(id: DigitalTwinId) -> String {
    format!("digital-twins/{id}")
}

pub fn layers_path() -> String {
    "layers".to_string()
}

pub fn layer_path(id: LayerId) -> String {
    format!("layers/{id}")
}

pub fn groups_path(id: DigitalTwinId) -> String {
    format!("digital-twins/{id}/groups")
}

pub fn associations_bulk_path(id: DigitalTwinId) -> String {
    format!("digital-twins/{id}/associations/bulk")
}

pub fn tools_bulk_path(id: DigitalTwinId) -> String {
    format!("digital-twins/{id}/tools/bulk")
}

/// `TwinApi` over a blocking `reqwest` client with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpTwinApi {
    client: Client,
    config: ApiConfig,
}

impl HttpTwinApi {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.config.url(path);
        self.execute("GET", path, self.client.get(url))
    }

    fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let url = self.config.url(path);
        self.execute("PUT", path, self.client.put(url).json(body))
    }

    fn execute<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let started_at = Instant::now();
        let result = send(request);
        let duration_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(_) => info!(
                "event=api_request module=api status=ok method={} path={} duration_ms={}",
                method, path, duration_ms
            ),
            Err(ApiError::Status { status, .. }) => warn!(
                "event=api_request module=api status=error method={} path={} http_status={} duration_ms={}",
                method, path, status, duration_ms
            ),
            Err(ApiError::Transport(_)) => warn!(
                "event=api_request module=api status=error method={} path={} error_kind=transport duration_ms={}",
                method, path, duration_ms
            ),
            Err(ApiError::Decode(_)) => warn!(
                "event=api_request module=api status=error method={} path={} error_kind=decode duration_ms={}",
                method, path, duration_ms
            ),
        }
        result
    }
}

fn send<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
    let response = request
        .send()
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    decode_body(&body)
}

/// Decodes a response body; an empty body decodes like JSON `null`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}

impl TwinApi for HttpTwinApi {
    fn fetch_digital_twins(&self) -> ApiResult<Vec<DigitalTwin>> {
        self.get(&digital_twins_path())
    }

    fn fetch_digital_twin(&self, id: DigitalTwinId) -> ApiResult<DigitalTwin> {
        self.get(&digital_twin_path(id))
    }

    fn fetch_layers(&self) -> ApiResult<Vec<Layer>> {
        self.get(&layers_path())
    }

    fn fetch_layer(&self, id: LayerId) -> ApiResult<Layer> {
        self.get(&layer_path(id))
    }

    fn fetch_groups(&self, id: DigitalTwinId) -> ApiResult<Vec<Group>> {
        self.get(&groups_path(id))
    }

    fn fetch_tool_catalog(&self, kind: ToolKind) -> ApiResult<Vec<ToolCatalogItem>> {
        self.get(kind.catalog_path())
    }

    fn bulk_update_associations(
        &self,
        id: DigitalTwinId,
        payload: &BulkAssociationsPayload,
    ) -> ApiResult<AssociationsBulkResult> {
        let result: Option<AssociationsBulkResult> =
            self.put(&associations_bulk_path(id), payload)?;
        Ok(result.unwrap_or_default())
    }

    fn bulk_update_tools(
        &self,
        id: DigitalTwinId,
        payload: &BulkToolPayload,
    ) -> ApiResult<BulkCounts> {
        let result: Option<BulkCounts> = self.put(&tools_bulk_path(id), payload)?;
        Ok(result.unwrap_or_default())
    }
}
