//! Drag-and-drop placement engine.
//!
//! # Responsibility
//! - Classify pointer positions into drop zones.
//! - Decide whether a drop is permitted.
//! - Translate permitted drops into tree insertion points.
//!
//! # Invariants
//! - Every check here is pure; only `DragSession` holds state.
//! - Decisions never mutate the tree.

pub mod permission;
pub mod resolve;
pub mod rules;
pub mod session;
pub mod zone;

use crate::tree::layer_tree::GroupNode;
use permission::{AllowTable, DropPermissionConfig};
use rules::DescendantPrevention;
use zone::{AllowedZones, DropZone};

/// Item type names used in drag items and drop targets.
pub mod kinds {
    pub const LAYER: &str = "layer";
    pub const GROUP: &str = "group";
    /// Layer dragged in from the catalog, not yet associated.
    pub const CATALOG_LAYER: &str = "catalog-layer";
    pub const TOOL: &str = "tool";
}

/// Standard allow-table of the layer panel.
pub fn layer_panel_table() -> AllowTable {
    let edges = AllowedZones::only(&[DropZone::Top, DropZone::Bottom]);
    let middle = AllowedZones::only(&[DropZone::Middle]);
    AllowTable::new()
        .allow(kinds::GROUP, kinds::GROUP, AllowedZones::Any)
        .allow(kinds::LAYER, kinds::LAYER, edges)
        .allow(kinds::LAYER, kinds::GROUP, middle)
        .allow(kinds::CATALOG_LAYER, kinds::LAYER, edges)
        .allow(kinds::CATALOG_LAYER, kinds::GROUP, middle)
}

/// Layer-panel permissions, including descendant prevention for groups.
pub fn layer_panel_config() -> DropPermissionConfig<GroupNode> {
    DropPermissionConfig::new(layer_panel_table())
        .with_rule(DescendantPrevention::new(kinds::GROUP))
}

/// Tool-panel permissions: tools reorder among tools by edge zones.
pub fn tool_panel_config() -> DropPermissionConfig<GroupNode> {
    DropPermissionConfig::new(AllowTable::new().allow(
        kinds::TOOL,
        kinds::TOOL,
        AllowedZones::only(&[DropZone::Top, DropZone::Bottom]),
    ))
}
