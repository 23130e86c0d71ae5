//! Core editing logic for digital twin layer, group and tool associations.
//! The in-memory tree, the drop rules and the bulk diff all live here.

pub mod api;
pub mod config;
pub mod logging;
pub mod model;
pub mod placement;
pub mod service;
pub mod sync;
pub mod tree;

pub use api::http::HttpTwinApi;
pub use api::{ApiError, ApiResult, TwinApi};
pub use config::{ApiConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::bulk::{BulkAction, BulkCounts, BulkPlan};
pub use model::digital_twin::{
    DigitalTwin, DigitalTwinId, Group, GroupId, Layer, LayerAssociation, LayerId,
};
pub use model::snapshot::TwinSnapshot;
pub use model::tool::{ToolAssociation, ToolCatalogItem, ToolKey, ToolKind};
pub use placement::permission::{
    can_drop, AllowTable, DenyReason, DragItem, DropDecision, DropTarget,
};
pub use placement::zone::{get_drop_zone, AllowedZones, Bounds, DropZone};
pub use service::editor::{DropOutcome, EditorError, SaveReport, TwinEditor};
pub use sync::{apply_plan, diff_snapshots};
pub use tree::draft::TwinDraft;
pub use tree::error::TreeError;
pub use tree::layer_tree::{GroupRemoveMode, InsertionPoint, LayerTree, NodeRef};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
