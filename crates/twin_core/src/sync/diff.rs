//! Bulk diff between the committed and the current snapshot.
//!
//! # Invariants
//! - Deletes come first; group deletes run deepest-first by committed nesting.
//! - Creates and updates follow the post-edit order: containers in pre-order
//!   of the current group tree, siblings by ascending `sort_order`.
//! - Creates and updates carry every field of the row.
//! - Identical snapshots produce an empty plan.

use crate::model::bulk::{
    BulkAction, BulkPlan, GroupBulkOperation, LayerBulkOperation, ToolBulkOperation,
};
use crate::model::digital_twin::{Group, GroupId, LayerAssociation};
use crate::model::snapshot::TwinSnapshot;
use crate::model::tool::ToolAssociation;
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Computes the operations that turn `committed` into `current`.
pub fn diff_snapshots(committed: &TwinSnapshot, current: &TwinSnapshot) -> BulkPlan {
    let current_groups = current.groups_by_id();
    let container_rank = container_ranks(&current_groups);

    let plan = BulkPlan {
        layers: diff_layers(committed, current, &container_rank),
        groups: diff_groups(committed, &current_groups),
        tools: diff_tools(committed, current),
    };
    debug!(
        "event=bulk_diff module=sync status=ok layers={} groups={} tools={}",
        plan.layers.len(),
        plan.groups.len(),
        plan.tools.len()
    );
    plan
}

fn diff_layers(
    committed: &TwinSnapshot,
    current: &TwinSnapshot,
    container_rank: &HashMap<Option<GroupId>, usize>,
) -> Vec<LayerBulkOperation> {
    let before = committed.layers_by_id();
    let after = current.layers_by_id();

    let mut operations: Vec<LayerBulkOperation> = before
        .values()
        .filter(|layer| !after.contains_key(&layer.layer_id))
        .map(|layer| LayerBulkOperation {
            action: BulkAction::Delete,
            layer_id: layer.layer_id,
            is_default: None,
            sort_order: None,
            group_id: layer.group_id,
        })
        .collect();

    let mut ordered: Vec<&LayerAssociation> = after.values().copied().collect();
    ordered.sort_by_key(|layer| {
        let rank = container_rank
            .get(&layer.group_id)
            .copied()
            .unwrap_or(usize::MAX);
        (rank, layer.group_id, layer.sort_order, layer.layer_id)
    });

    for layer in ordered {
        let action = match before.get(&layer.layer_id) {
            None => BulkAction::Create,
            Some(previous) if *previous != layer => BulkAction::Update,
            Some(_) => continue,
        };
        operations.push(LayerBulkOperation {
            action,
            layer_id: layer.layer_id,
            is_default: Some(layer.is_default),
            sort_order: Some(layer.sort_order),
            group_id: layer.group_id,
        });
    }
    operations
}

fn diff_groups(
    committed: &TwinSnapshot,
    current_groups: &BTreeMap<GroupId, &Group>,
) -> Vec<GroupBulkOperation> {
    let before = committed.groups_by_id();
    let committed_depth = group_depths(&before);

    let mut removed: Vec<&Group> = before
        .values()
        .copied()
        .filter(|group| !current_groups.contains_key(&group.id))
        .collect();
    removed.sort_by_key(|group| {
        let depth = committed_depth.get(&group.id).copied().unwrap_or(0);
        (std::cmp::Reverse(depth), group.id)
    });

    let mut operations: Vec<GroupBulkOperation> = removed
        .into_iter()
        .map(|group| GroupBulkOperation {
            action: BulkAction::Delete,
            group: group.clone(),
        })
        .collect();

    for group in groups_preorder(current_groups) {
        let action = match before.get(&group.id) {
            None => BulkAction::Create,
            Some(previous) if *previous != group => BulkAction::Update,
            Some(_) => continue,
        };
        operations.push(GroupBulkOperation {
            action,
            group: group.clone(),
        });
    }
    operations
}

fn diff_tools(committed: &TwinSnapshot, current: &TwinSnapshot) -> Vec<ToolBulkOperation> {
    let before = committed.tools_by_key();
    let after = current.tools_by_key();

    let mut operations: Vec<ToolBulkOperation> = before
        .iter()
        .filter(|(key, _)| !after.contains_key(*key))
        .map(|(key, _)| ToolBulkOperation {
            action: BulkAction::Delete,
            content_type: key.content_type.clone(),
            content_id: key.content_id,
            sort_order: None,
            is_default: None,
        })
        .collect();

    let mut ordered: Vec<&ToolAssociation> = after.values().copied().collect();
    ordered.sort_by(|a, b| (a.sort_order, a.key()).cmp(&(b.sort_order, b.key())));

    for tool in ordered {
        let action = match before.get(&tool.key()) {
            None => BulkAction::Create,
            Some(previous) if *previous != tool => BulkAction::Update,
            Some(_) => continue,
        };
        operations.push(ToolBulkOperation {
            action,
            content_type: tool.content_type.clone(),
            content_id: tool.content_id,
            sort_order: Some(tool.sort_order),
            is_default: Some(tool.is_default),
        });
    }
    operations
}

/// Groups in pre-order: parents before children, siblings by `(sort_order, id)`.
///
/// Groups with an unknown parent are roots. Groups only reachable through a
/// parent cycle follow at the end, ordered by id.
pub(crate) fn groups_preorder<'a>(groups: &BTreeMap<GroupId, &'a Group>) -> Vec<&'a Group> {
    let mut children_of: HashMap<Option<GroupId>, Vec<&'a Group>> = HashMap::new();
    for &group in groups.values() {
        let parent = group.parent_id.filter(|parent_id| groups.contains_key(parent_id));
        children_of.entry(parent).or_default().push(group);
    }
    for siblings in children_of.values_mut() {
        siblings.sort_by_key(|group| (group.sort_order, group.id));
    }

    let mut ordered = Vec::with_capacity(groups.len());
    let mut visited = HashSet::new();
    let mut roots: Vec<&'a Group> = children_of.get(&None).cloned().unwrap_or_default();
    roots.extend(groups.values().copied());

    for root in roots {
        if visited.contains(&root.id) {
            continue;
        }
        let mut stack = vec![root];
        while let Some(group) = stack.pop() {
            if !visited.insert(group.id) {
                continue;
            }
            ordered.push(group);
            if let Some(children) = children_of.get(&Some(group.id)) {
                stack.extend(children.iter().rev().copied());
            }
        }
    }
    ordered
}

/// Rank of every container in the current tree; the root level ranks first.
fn container_ranks(groups: &BTreeMap<GroupId, &Group>) -> HashMap<Option<GroupId>, usize> {
    let mut ranks = HashMap::with_capacity(groups.len() + 1);
    ranks.insert(None, 0);
    for (index, group) in groups_preorder(groups).into_iter().enumerate() {
        ranks.insert(Some(group.id), index + 1);
    }
    ranks
}

/// Nesting depth of every group; parent chains are cut at the first repeat.
fn group_depths(groups: &BTreeMap<GroupId, &Group>) -> HashMap<GroupId, usize> {
    let mut depths = HashMap::with_capacity(groups.len());
    for group in groups.values() {
        let mut depth = 0;
        let mut seen = HashSet::from([group.id]);
        let mut parent = group.parent_id;
        while let Some(parent_id) = parent {
            let Some(parent_group) = groups.get(&parent_id) else {
                break;
            };
            if !seen.insert(parent_id) {
                break;
            }
            depth += 1;
            parent = parent_group.parent_id;
        }
        depths.insert(group.id, depth);
    }
    depths
}
