//! Flat capture of a digital twin's associations.

use crate::model::digital_twin::{Group, GroupId, LayerAssociation, LayerId};
use crate::model::tool::{ToolAssociation, ToolKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Order-insensitive capture of layers, groups and tools.
///
/// Used as the "committed" and "current" inputs of the bulk diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwinSnapshot {
    pub layers: Vec<LayerAssociation>,
    pub groups: Vec<Group>,
    pub tools: Vec<ToolAssociation>,
}

impl TwinSnapshot {
    /// Layers keyed by layer id. Later duplicates win.
    pub fn layers_by_id(&self) -> BTreeMap<LayerId, &LayerAssociation> {
        self.layers.iter().map(|layer| (layer.layer_id, layer)).collect()
    }

    /// Groups keyed by group id. Later duplicates win.
    pub fn groups_by_id(&self) -> BTreeMap<GroupId, &Group> {
        self.groups.iter().map(|group| (group.id, group)).collect()
    }

    /// Tools keyed by `(content_type, content_id)`. Later duplicates win.
    pub fn tools_by_key(&self) -> BTreeMap<ToolKey, &ToolAssociation> {
        self.tools.iter().map(|tool| (tool.key(), tool)).collect()
    }

    /// Returns a copy with every collection sorted by identity.
    pub fn normalized(&self) -> Self {
        Self {
            layers: self.layers_by_id().into_values().cloned().collect(),
            groups: self.groups_by_id().into_values().cloned().collect(),
            tools: self.tools_by_key().into_values().cloned().collect(),
        }
    }
}
