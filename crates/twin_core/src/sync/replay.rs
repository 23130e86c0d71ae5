//! Local replay of a bulk plan, mirroring how the remote store dispatches it.

use crate::model::bulk::{BulkAction, BulkPlan};
use crate::model::digital_twin::LayerAssociation;
use crate::model::snapshot::TwinSnapshot;
use crate::model::tool::{ToolAssociation, ToolKey};
use std::collections::BTreeMap;

/// Applies `plan` on top of `committed` and returns the resulting snapshot.
///
/// `create` inserts or replaces the row, `update` overwrites the fields it
/// carries on an existing row and is ignored otherwise, `delete` removes the
/// row. The result is sorted by identity.
pub fn apply_plan(committed: &TwinSnapshot, plan: &BulkPlan) -> TwinSnapshot {
    let mut layers: BTreeMap<i64, LayerAssociation> = committed
        .layers
        .iter()
        .map(|layer| (layer.layer_id, layer.clone()))
        .collect();
    for op in &plan.layers {
        match op.action {
            BulkAction::Create => {
                layers.insert(
                    op.layer_id,
                    LayerAssociation {
                        layer_id: op.layer_id,
                        is_default: op.is_default.unwrap_or(false),
                        sort_order: op.sort_order.unwrap_or(0),
                        group_id: op.group_id,
                    },
                );
            }
            BulkAction::Update => {
                if let Some(layer) = layers.get_mut(&op.layer_id) {
                    if let Some(is_default) = op.is_default {
                        layer.is_default = is_default;
                    }
                    if let Some(sort_order) = op.sort_order {
                        layer.sort_order = sort_order;
                    }
                    layer.group_id = op.group_id;
                }
            }
            BulkAction::Delete => {
                layers.remove(&op.layer_id);
            }
        }
    }

    let mut groups: BTreeMap<i64, _> = committed
        .groups
        .iter()
        .map(|group| (group.id, group.clone()))
        .collect();
    for op in &plan.groups {
        match op.action {
            BulkAction::Create => {
                groups.insert(op.group.id, op.group.clone());
            }
            BulkAction::Update => {
                if let Some(group) = groups.get_mut(&op.group.id) {
                    *group = op.group.clone();
                }
            }
            BulkAction::Delete => {
                groups.remove(&op.group.id);
            }
        }
    }

    let mut tools: BTreeMap<ToolKey, ToolAssociation> = committed
        .tools
        .iter()
        .map(|tool| (tool.key(), tool.clone()))
        .collect();
    for op in &plan.tools {
        let key = ToolKey::new(op.content_type.clone(), op.content_id);
        match op.action {
            BulkAction::Create => {
                tools.insert(
                    key,
                    ToolAssociation {
                        content_type: op.content_type.clone(),
                        content_id: op.content_id,
                        sort_order: op.sort_order.unwrap_or(0),
                        is_default: op.is_default.unwrap_or(false),
                    },
                );
            }
            BulkAction::Update => {
                if let Some(tool) = tools.get_mut(&key) {
                    if let Some(sort_order) = op.sort_order {
                        tool.sort_order = sort_order;
                    }
                    if let Some(is_default) = op.is_default {
                        tool.is_default = is_default;
                    }
                }
            }
            BulkAction::Delete => {
                tools.remove(&key);
            }
        }
    }

    TwinSnapshot {
        layers: layers.into_values().collect(),
        groups: groups.into_values().collect(),
        tools: tools.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::apply_plan;
    use crate::model::bulk::{BulkAction, BulkPlan, LayerBulkOperation};
    use crate::model::digital_twin::LayerAssociation;
    use crate::model::snapshot::TwinSnapshot;
    use crate::sync::diff::diff_snapshots;

    fn layer(layer_id: i64, group_id: Option<i64>, sort_order: i64) -> LayerAssociation {
        LayerAssociation {
            layer_id,
            is_default: false,
            sort_order,
            group_id,
        }
    }

    #[test]
    fn update_of_missing_row_is_ignored() {
        let plan = BulkPlan {
            layers: vec![LayerBulkOperation {
                action: BulkAction::Update,
                layer_id: 4,
                is_default: Some(true),
                sort_order: Some(0),
                group_id: None,
            }],
            ..BulkPlan::default()
        };
        assert!(apply_plan(&TwinSnapshot::default(), &plan).layers.is_empty());
    }

    #[test]
    fn update_moves_layer_between_groups() {
        let committed = TwinSnapshot {
            layers: vec![layer(1, Some(3), 0)],
            ..TwinSnapshot::default()
        };
        let plan = BulkPlan {
            layers: vec![LayerBulkOperation {
                action: BulkAction::Update,
                layer_id: 1,
                is_default: None,
                sort_order: Some(2),
                group_id: None,
            }],
            ..BulkPlan::default()
        };
        let result = apply_plan(&committed, &plan);
        assert_eq!(result.layers, vec![layer(1, None, 2)]);
    }

    #[test]
    fn replaying_a_diff_reaches_the_target() {
        let committed = TwinSnapshot {
            layers: vec![layer(1, None, 0), layer(2, None, 1)],
            ..TwinSnapshot::default()
        };
        let current = TwinSnapshot {
            layers: vec![layer(3, None, 0), layer(1, None, 1)],
            ..TwinSnapshot::default()
        };
        let replayed = apply_plan(&committed, &diff_snapshots(&committed, &current));
        assert_eq!(replayed, current.normalized());
        assert!(diff_snapshots(&replayed, &current).is_empty());
    }
}
