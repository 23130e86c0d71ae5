//! Remote API boundary.
//!
//! # Responsibility
//! - Define the calls the editor makes against the remote store.
//! - Keep transport details behind the `TwinApi` trait.
//!
//! # Invariants
//! - One call issues exactly one request; there is no retry.
//! - Any non-success status is an error carrying status code and body.

pub mod http;

use crate::model::bulk::{
    AssociationsBulkResult, BulkAssociationsPayload, BulkCounts, BulkToolPayload,
};
use crate::model::digital_twin::{DigitalTwin, DigitalTwinId, Group, Layer, LayerId};
use crate::model::tool::{ToolCatalogItem, ToolKind};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Remote call failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    Transport(String),
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body did not match the expected shape.
    Decode(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Status { status, body } => {
                write!(f, "server responded with status {status}: {body}")
            }
            Self::Decode(message) => write!(f, "response decode failed: {message}"),
        }
    }
}

impl Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

/// Calls against the digital twin store.
pub trait TwinApi {
    fn fetch_digital_twins(&self) -> ApiResult<Vec<DigitalTwin>>;
    fn fetch_digital_twin(&self, id: DigitalTwinId) -> ApiResult<DigitalTwin>;
    fn fetch_layers(&self) -> ApiResult<Vec<Layer>>;
    fn fetch_layer(&self, id: LayerId) -> ApiResult<Layer>;
    /// Flat group list of one twin; nesting is expressed through `parent_id`.
    fn fetch_groups(&self, id: DigitalTwinId) -> ApiResult<Vec<Group>>;
    fn fetch_tool_catalog(&self, kind: ToolKind) -> ApiResult<Vec<ToolCatalogItem>>;
    fn bulk_update_associations(
        &self,
        id: DigitalTwinId,
        payload: &BulkAssociationsPayload,
    ) -> ApiResult<AssociationsBulkResult>;
    fn bulk_update_tools(
        &self,
        id: DigitalTwinId,
        payload: &BulkToolPayload,
    ) -> ApiResult<BulkCounts>;
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn status_error_carries_code_and_body() {
        let err = ApiError::Status {
            status: 422,
            body: "bad operation".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "server responded with status 422: bad operation"
        );
    }
}
