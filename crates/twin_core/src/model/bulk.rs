//! Bulk operation records submitted in one save cycle.
//!
//! # Responsibility
//! - Mirror the bodies of `PUT /digital-twins/{id}/associations/bulk` and
//!   `PUT /digital-twins/{id}/tools/bulk`.
//! - Group all pending operations of a save cycle into one `BulkPlan`.
//!
//! # Invariants
//! - `action` is serialized lowercase (`create|update|delete`).
//! - `group_id` is always present on layer operations; `null` means ungrouped.

use crate::model::digital_twin::{Group, GroupId, LayerId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Kind of one pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Create,
    Update,
    Delete,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for BulkAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pending layer association change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerBulkOperation {
    pub action: BulkAction,
    pub layer_id: LayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

/// One pending group change; carries the full group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBulkOperation {
    pub action: BulkAction,
    #[serde(flatten)]
    pub group: Group,
}

/// One pending tool association change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolBulkOperation {
    pub action: BulkAction,
    pub content_type: String,
    pub content_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

/// `{ operations: [...] }` wrapper used for every payload section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationList<T> {
    pub operations: Vec<T>,
}

impl<T> Default for OperationList<T> {
    fn default() -> Self {
        Self {
            operations: Vec::new(),
        }
    }
}

/// Body of `PUT /digital-twins/{id}/associations/bulk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAssociationsPayload {
    pub layer_payload: OperationList<LayerBulkOperation>,
    pub group_payload: OperationList<GroupBulkOperation>,
}

/// Body of `PUT /digital-twins/{id}/tools/bulk`.
pub type BulkToolPayload = OperationList<ToolBulkOperation>;

/// Counters returned by the remote store for one bulk section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkCounts {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
}

impl BulkCounts {
    /// Adds the counters of another response.
    pub fn merge(&mut self, other: BulkCounts) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
    }
}

/// Response of the associations bulk endpoint.
///
/// Decoding is lenient: unknown shapes decode as zero counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationsBulkResult {
    #[serde(alias = "layer_result")]
    pub layers: BulkCounts,
    #[serde(alias = "group_result")]
    pub groups: BulkCounts,
}

impl AssociationsBulkResult {
    pub fn merge(&mut self, other: AssociationsBulkResult) {
        self.layers.merge(other.layers);
        self.groups.merge(other.groups);
    }
}

/// Every pending operation of one save cycle, per association kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkPlan {
    pub layers: Vec<LayerBulkOperation>,
    pub groups: Vec<GroupBulkOperation>,
    pub tools: Vec<ToolBulkOperation>,
}

impl BulkPlan {
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.groups.is_empty() && self.tools.is_empty()
    }

    /// Whether the layers+groups request has anything to send.
    pub fn has_association_changes(&self) -> bool {
        !self.layers.is_empty() || !self.groups.is_empty()
    }

    pub fn has_tool_changes(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Total number of operations across all kinds.
    pub fn len(&self) -> usize {
        self.layers.len() + self.groups.len() + self.tools.len()
    }

    pub fn associations_payload(&self) -> BulkAssociationsPayload {
        BulkAssociationsPayload {
            layer_payload: OperationList {
                operations: self.layers.clone(),
            },
            group_payload: OperationList {
                operations: self.groups.clone(),
            },
        }
    }

    pub fn tools_payload(&self) -> BulkToolPayload {
        OperationList {
            operations: self.tools.clone(),
        }
    }

    /// Number of operations per action, across all kinds.
    pub fn counts(&self) -> BulkCounts {
        let mut counts = BulkCounts::default();
        let actions = self
            .layers
            .iter()
            .map(|op| op.action)
            .chain(self.groups.iter().map(|op| op.action))
            .chain(self.tools.iter().map(|op| op.action));
        for action in actions {
            match action {
                BulkAction::Create => counts.created += 1,
                BulkAction::Update => counts.updated += 1,
                BulkAction::Delete => counts.deleted += 1,
            }
        }
        counts
    }
}
