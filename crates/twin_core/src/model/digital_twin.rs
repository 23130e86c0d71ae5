//! Digital twin, layer and group records.
//!
//! # Responsibility
//! - Mirror `GET /digital-twins/{id}`, `GET /layers` and
//!   `GET /digital-twins/{id}/groups` payloads.
//!
//! # Invariants
//! - `Group::parent_id == None` means a root-level group.
//! - `LayerAssociation::group_id == None` means an ungrouped layer.
//! - Negative group ids are temporary ids for groups not yet saved.

use crate::model::tool::ToolAssociation;
use serde::{Deserialize, Serialize};

/// Remote digital twin identifier.
pub type DigitalTwinId = i64;
/// Remote layer identifier.
pub type LayerId = i64;
/// Remote group identifier. Negative values are local temporary ids.
pub type GroupId = i64;

/// Digital twin with its layer and tool associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalTwin {
    pub id: DigitalTwinId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub private: bool,
    /// ISO-8601 timestamp as sent by the API; kept opaque.
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub layer_associations: Vec<LayerAssociation>,
    #[serde(default)]
    pub tool_associations: Vec<ToolAssociation>,
}

/// Layer catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    /// Serialized as `type` to match the API naming.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "featureName", default)]
    pub feature_name: String,
    #[serde(rename = "isBackground", default)]
    pub is_background: bool,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Link between a digital twin and one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerAssociation {
    pub layer_id: LayerId,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

/// Flat group record; nesting is expressed through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<GroupId>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub digital_twin_id: DigitalTwinId,
}

impl Group {
    /// Returns whether this group only exists in the local draft.
    pub fn is_temporary(&self) -> bool {
        self.id < 0
    }
}
