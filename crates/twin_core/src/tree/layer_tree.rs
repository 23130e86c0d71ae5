//! In-memory group/layer tree of one digital twin.
//!
//! # Responsibility
//! - Build the nested group tree from flat remote records.
//! - Provide insert, move, and remove operations for layers and groups.
//! - Keep sibling ordering normalized after every mutation.
//!
//! # Invariants
//! - Layer `sort_order` within one container is `0..n` with no gaps.
//! - Subgroup `sort_order` within one parent is `0..n` with no gaps.
//! - `Group::parent_id` and `GroupNode::depth` always reflect tree position.
//! - No group is its own ancestor.
//! - A layer appears at most once in the tree.

use crate::model::digital_twin::{
    DigitalTwinId, Group, GroupId, Layer, LayerAssociation, LayerId,
};
use crate::tree::error::TreeError;
use crate::tree::traversal::{
    find_node_by_id, is_descendant, total_items_in_tree, ItemTree, TreeNode,
};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One layer association as shown in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEntry {
    pub layer_id: LayerId,
    pub title: String,
    pub feature_name: String,
    pub is_default: bool,
    pub sort_order: i64,
    /// Added locally and not yet saved.
    pub is_new: bool,
}

impl LayerEntry {
    /// Creates an unsaved entry from a catalog layer.
    pub fn from_catalog(layer: &Layer) -> Self {
        Self {
            layer_id: layer.id,
            title: layer.title.clone(),
            feature_name: layer.feature_name.clone(),
            is_default: false,
            sort_order: 0,
            is_new: true,
        }
    }
}

/// Group with its layers and nested subgroups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    pub group: Group,
    pub layers: Vec<LayerEntry>,
    pub subgroups: Vec<GroupNode>,
    /// Nesting depth; root groups have depth 0.
    pub depth: usize,
}

impl GroupNode {
    pub fn id(&self) -> GroupId {
        self.group.id
    }

    /// Layers in this group and all nested subgroups.
    pub fn total_layers(&self) -> usize {
        total_items_in_tree(self)
    }
}

impl TreeNode for GroupNode {
    type Id = GroupId;

    fn node_id(&self) -> &GroupId {
        &self.group.id
    }

    fn child_nodes(&self) -> &[Self] {
        &self.subgroups
    }
}

impl ItemTree for GroupNode {
    fn item_count(&self) -> usize {
        self.layers.len()
    }

    fn child_trees(&self) -> &[Self] {
        &self.subgroups
    }
}

/// Existing tree item used as a positional anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Layer(LayerId),
    Group(GroupId),
}

/// Target position for an insert or move.
///
/// Containers are `None` for the root level and `Some(group_id)` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint {
    /// First position of the container.
    Start(Option<GroupId>),
    /// Last position of the container.
    End(Option<GroupId>),
    /// Directly before the anchor, in the anchor's container.
    Before(NodeRef),
    /// Directly after the anchor, in the anchor's container.
    After(NodeRef),
}

impl InsertionPoint {
    fn anchor(&self) -> Option<NodeRef> {
        match self {
            Self::Before(anchor) | Self::After(anchor) => Some(*anchor),
            Self::Start(_) | Self::End(_) => None,
        }
    }
}

/// Group delete mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRemoveMode {
    /// Remove the group only. Its subgroups take its place among the parent's
    /// subgroups; its layers are appended to the parent's layers in order.
    Dissolve,
    /// Remove the group with every nested layer and subgroup.
    DeleteAll,
}

/// Group/layer tree of one digital twin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerTree {
    digital_twin_id: DigitalTwinId,
    ungrouped: Vec<LayerEntry>,
    groups: Vec<GroupNode>,
    next_temp_id: GroupId,
}

impl LayerTree {
    /// Creates an empty tree.
    pub fn new(digital_twin_id: DigitalTwinId) -> Self {
        Self {
            digital_twin_id,
            ungrouped: Vec::new(),
            groups: Vec::new(),
            next_temp_id: -1,
        }
    }

    /// Builds the tree from flat remote records.
    ///
    /// Groups whose parent is unknown, or that only reach each other through a
    /// parent cycle, are attached at root. Layers pointing at an unknown group
    /// become ungrouped. Catalog entries only contribute display metadata.
    pub fn from_remote(
        digital_twin_id: DigitalTwinId,
        associations: &[LayerAssociation],
        groups: &[Group],
        catalog: &[Layer],
    ) -> Self {
        let catalog_by_id: HashMap<LayerId, &Layer> =
            catalog.iter().map(|layer| (layer.id, layer)).collect();

        let mut unique_groups: BTreeMap<GroupId, &Group> = BTreeMap::new();
        for group in groups {
            if unique_groups.insert(group.id, group).is_some() {
                warn!(
                    "event=tree_build module=tree status=warn reason=duplicate_group group_id={}",
                    group.id
                );
            }
        }

        let mut children_of: HashMap<Option<GroupId>, Vec<&Group>> = HashMap::new();
        for &group in unique_groups.values() {
            let parent = group
                .parent_id
                .filter(|parent_id| unique_groups.contains_key(parent_id));
            if group.parent_id.is_some() && parent.is_none() {
                warn!(
                    "event=tree_build module=tree status=warn reason=orphan_group group_id={}",
                    group.id
                );
            }
            children_of.entry(parent).or_default().push(group);
        }
        for siblings in children_of.values_mut() {
            siblings.sort_by_key(|group| (group.sort_order, group.id));
        }

        let mut layers_of: HashMap<Option<GroupId>, Vec<LayerEntry>> = HashMap::new();
        let mut seen_layers = HashSet::new();
        for association in associations {
            if !seen_layers.insert(association.layer_id) {
                warn!(
                    "event=tree_build module=tree status=warn reason=duplicate_layer layer_id={}",
                    association.layer_id
                );
                continue;
            }
            let container = association
                .group_id
                .filter(|group_id| unique_groups.contains_key(group_id));
            let catalog_entry = catalog_by_id.get(&association.layer_id);
            layers_of.entry(container).or_default().push(LayerEntry {
                layer_id: association.layer_id,
                title: catalog_entry
                    .map(|layer| layer.title.clone())
                    .unwrap_or_default(),
                feature_name: catalog_entry
                    .map(|layer| layer.feature_name.clone())
                    .unwrap_or_default(),
                is_default: association.is_default,
                sort_order: association.sort_order,
                is_new: false,
            });
        }
        for layers in layers_of.values_mut() {
            layers.sort_by_key(|layer| (layer.sort_order, layer.layer_id));
        }

        let mut builder = TreeBuilder {
            children_of: &children_of,
            layers_of,
            visited: HashSet::new(),
        };

        let mut roots: Vec<GroupNode> = children_of
            .get(&None)
            .map(|siblings| {
                siblings
                    .iter()
                    .map(|group| builder.build(group))
                    .collect()
            })
            .unwrap_or_default();

        // Whatever is still unvisited only hangs off a parent cycle.
        for group in unique_groups.values() {
            if !builder.visited.contains(&group.id) {
                warn!(
                    "event=tree_build module=tree status=warn reason=parent_cycle group_id={}",
                    group.id
                );
                roots.push(builder.build(group));
            }
        }

        let min_id = unique_groups.keys().next().copied().unwrap_or(0);
        let mut tree = Self {
            digital_twin_id,
            ungrouped: builder.layers_of.remove(&None).unwrap_or_default(),
            groups: roots,
            next_temp_id: min_id.min(0) - 1,
        };
        tree.normalize();
        tree
    }

    pub fn digital_twin_id(&self) -> DigitalTwinId {
        self.digital_twin_id
    }

    /// Layers not placed in any group.
    pub fn ungrouped(&self) -> &[LayerEntry] {
        &self.ungrouped
    }

    /// Root-level groups.
    pub fn groups(&self) -> &[GroupNode] {
        &self.groups
    }

    pub fn find_group(&self, group_id: GroupId) -> Option<&GroupNode> {
        find_node_by_id(&self.groups, &group_id)
    }

    /// Whether `target_id` is nested anywhere below `ancestor_id`.
    pub fn is_group_descendant(&self, ancestor_id: GroupId, target_id: GroupId) -> bool {
        is_descendant(&self.groups, &ancestor_id, &target_id)
    }

    pub fn contains_layer(&self, layer_id: LayerId) -> bool {
        self.locate_layer(layer_id).is_some()
    }

    /// Returns `(container, index)` of one layer.
    pub fn locate_layer(&self, layer_id: LayerId) -> Option<(Option<GroupId>, usize)> {
        if let Some(index) = position_of_layer(&self.ungrouped, layer_id) {
            return Some((None, index));
        }
        let mut stack: Vec<&GroupNode> = self.groups.iter().collect();
        while let Some(node) = stack.pop() {
            if let Some(index) = position_of_layer(&node.layers, layer_id) {
                return Some((Some(node.group.id), index));
            }
            stack.extend(node.subgroups.iter());
        }
        None
    }

    /// Returns `(parent, index)` of one group.
    pub fn locate_group(&self, group_id: GroupId) -> Option<(Option<GroupId>, usize)> {
        if let Some(index) = position_of_group(&self.groups, group_id) {
            return Some((None, index));
        }
        let mut stack: Vec<&GroupNode> = self.groups.iter().collect();
        while let Some(node) = stack.pop() {
            if let Some(index) = position_of_group(&node.subgroups, group_id) {
                return Some((Some(node.group.id), index));
            }
            stack.extend(node.subgroups.iter());
        }
        None
    }

    pub fn layer(&self, layer_id: LayerId) -> Option<&LayerEntry> {
        let (container, index) = self.locate_layer(layer_id)?;
        self.container_layers(container)?.get(index)
    }

    /// Layers of one container, in order.
    pub fn container_layers(&self, container: Option<GroupId>) -> Option<&[LayerEntry]> {
        match container {
            None => Some(&self.ungrouped),
            Some(group_id) => self.find_group(group_id).map(|node| node.layers.as_slice()),
        }
    }

    /// Subgroups of one container, in order.
    pub fn container_groups(&self, container: Option<GroupId>) -> Option<&[GroupNode]> {
        match container {
            None => Some(&self.groups),
            Some(group_id) => self
                .find_group(group_id)
                .map(|node| node.subgroups.as_slice()),
        }
    }

    /// Number of layers across the whole tree.
    pub fn total_layers(&self) -> usize {
        self.ungrouped.len()
            + self
                .groups
                .iter()
                .map(GroupNode::total_layers)
                .sum::<usize>()
    }

    /// Inserts a layer entry at `point`.
    pub fn insert_layer(
        &mut self,
        entry: LayerEntry,
        point: InsertionPoint,
    ) -> Result<(), TreeError> {
        if self.contains_layer(entry.layer_id) {
            return Err(TreeError::DuplicateLayer(entry.layer_id));
        }
        let (container, index) = self.resolve_layer_slot(&point)?;
        let layer_id = entry.layer_id;
        let layers = self.layers_mut(container)?;
        layers.insert(index.min(layers.len()), entry);
        renumber_layers(layers);
        debug!(
            "event=layer_insert module=tree status=ok layer_id={} container={:?}",
            layer_id, container
        );
        Ok(())
    }

    /// Appends a catalog layer at the end of `container` as an unsaved entry.
    pub fn add_catalog_layer(
        &mut self,
        layer: &Layer,
        container: Option<GroupId>,
    ) -> Result<(), TreeError> {
        self.insert_layer(LayerEntry::from_catalog(layer), InsertionPoint::End(container))
    }

    /// Moves one layer to `point`, possibly across containers.
    pub fn move_layer(
        &mut self,
        layer_id: LayerId,
        point: InsertionPoint,
    ) -> Result<(), TreeError> {
        if point.anchor() == Some(NodeRef::Layer(layer_id)) {
            return Err(TreeError::SelfAnchor);
        }
        let (from, index) = self
            .locate_layer(layer_id)
            .ok_or(TreeError::LayerNotFound(layer_id))?;
        self.resolve_layer_slot(&point)?;

        let entry = {
            let layers = self.layers_mut(from)?;
            let entry = layers.remove(index);
            renumber_layers(layers);
            entry
        };

        let (to, slot) = self.resolve_layer_slot(&point)?;
        let layers = self.layers_mut(to)?;
        layers.insert(slot.min(layers.len()), entry);
        renumber_layers(layers);
        debug!(
            "event=layer_move module=tree status=ok layer_id={} from={:?} to={:?} index={}",
            layer_id, from, to, slot
        );
        Ok(())
    }

    /// Removes one layer and returns its entry.
    pub fn remove_layer(&mut self, layer_id: LayerId) -> Result<LayerEntry, TreeError> {
        let (container, index) = self
            .locate_layer(layer_id)
            .ok_or(TreeError::LayerNotFound(layer_id))?;
        let layers = self.layers_mut(container)?;
        let entry = layers.remove(index);
        renumber_layers(layers);
        debug!(
            "event=layer_remove module=tree status=ok layer_id={} container={:?}",
            layer_id, container
        );
        Ok(entry)
    }

    pub fn set_default_layer(
        &mut self,
        layer_id: LayerId,
        is_default: bool,
    ) -> Result<(), TreeError> {
        let (container, index) = self
            .locate_layer(layer_id)
            .ok_or(TreeError::LayerNotFound(layer_id))?;
        self.layers_mut(container)?[index].is_default = is_default;
        Ok(())
    }

    /// Creates an unsaved group at `point` and returns its temporary id.
    pub fn create_group(
        &mut self,
        title: impl Into<String>,
        point: InsertionPoint,
    ) -> Result<GroupId, TreeError> {
        let title = normalize_title(title.into())?;
        let (container, index) = self.resolve_group_slot(&point)?;
        let group_id = self.next_temp_id;
        self.next_temp_id -= 1;

        let node = GroupNode {
            group: Group {
                id: group_id,
                title,
                parent_id: container,
                sort_order: 0,
                digital_twin_id: self.digital_twin_id,
            },
            layers: Vec::new(),
            subgroups: Vec::new(),
            depth: 0,
        };
        let depth = self.container_depth(container);
        let siblings = self.subgroups_mut(container)?;
        siblings.insert(index.min(siblings.len()), node);
        fix_siblings(siblings, container, depth);
        debug!(
            "event=group_create module=tree status=ok group_id={} parent={:?}",
            group_id, container
        );
        Ok(group_id)
    }

    pub fn rename_group(
        &mut self,
        group_id: GroupId,
        title: impl Into<String>,
    ) -> Result<(), TreeError> {
        let title = normalize_title(title.into())?;
        let node = find_group_mut(&mut self.groups, group_id)
            .ok_or(TreeError::GroupNotFound(group_id))?;
        node.group.title = title;
        Ok(())
    }

    /// Gives a group the id assigned by the remote store.
    ///
    /// Direct subgroups follow the new parent id; position and contents are
    /// unchanged.
    pub fn replace_group_id(
        &mut self,
        group_id: GroupId,
        new_id: GroupId,
    ) -> Result<(), TreeError> {
        if group_id == new_id {
            return Ok(());
        }
        if self.find_group(new_id).is_some() {
            return Err(TreeError::DuplicateGroup(new_id));
        }
        let node = find_group_mut(&mut self.groups, group_id)
            .ok_or(TreeError::GroupNotFound(group_id))?;
        node.group.id = new_id;
        for child in &mut node.subgroups {
            child.group.parent_id = Some(new_id);
        }
        debug!(
            "event=group_id_replace module=tree status=ok group_id={} new_id={}",
            group_id, new_id
        );
        Ok(())
    }

    /// Moves one group, with its subtree, to `point`.
    pub fn move_group(
        &mut self,
        group_id: GroupId,
        point: InsertionPoint,
    ) -> Result<(), TreeError> {
        if point.anchor() == Some(NodeRef::Group(group_id)) {
            return Err(TreeError::SelfAnchor);
        }
        let (from, index) = self
            .locate_group(group_id)
            .ok_or(TreeError::GroupNotFound(group_id))?;
        let (target_parent, _) = self.resolve_group_slot(&point)?;
        if let Some(parent_id) = target_parent {
            if parent_id == group_id || self.is_group_descendant(group_id, parent_id) {
                return Err(TreeError::CycleDetected {
                    group_id,
                    parent_id,
                });
            }
        }

        let node = {
            let depth = self.container_depth(from);
            let siblings = self.subgroups_mut(from)?;
            let node = siblings.remove(index);
            fix_siblings(siblings, from, depth);
            node
        };

        let (to, slot) = self.resolve_group_slot(&point)?;
        let depth = self.container_depth(to);
        let siblings = self.subgroups_mut(to)?;
        siblings.insert(slot.min(siblings.len()), node);
        fix_siblings(siblings, to, depth);
        debug!(
            "event=group_move module=tree status=ok group_id={} from={:?} to={:?} index={}",
            group_id, from, to, slot
        );
        Ok(())
    }

    /// Removes one group by mode and returns the removed node.
    ///
    /// With `Dissolve` the returned node has no layers or subgroups left.
    pub fn remove_group(
        &mut self,
        group_id: GroupId,
        mode: GroupRemoveMode,
    ) -> Result<GroupNode, TreeError> {
        let (parent, index) = self
            .locate_group(group_id)
            .ok_or(TreeError::GroupNotFound(group_id))?;
        let depth = self.container_depth(parent);

        let mut node = {
            let siblings = self.subgroups_mut(parent)?;
            siblings.remove(index)
        };

        if mode == GroupRemoveMode::Dissolve {
            let subgroups = std::mem::take(&mut node.subgroups);
            let layers = std::mem::take(&mut node.layers);

            let siblings = self.subgroups_mut(parent)?;
            for (offset, child) in subgroups.into_iter().enumerate() {
                siblings.insert(index + offset, child);
            }
            fix_siblings(siblings, parent, depth);

            let parent_layers = self.layers_mut(parent)?;
            parent_layers.extend(layers);
            renumber_layers(parent_layers);
        } else {
            let siblings = self.subgroups_mut(parent)?;
            fix_siblings(siblings, parent, depth);
        }

        debug!(
            "event=group_remove module=tree status=ok group_id={} mode={:?} parent={:?}",
            group_id, mode, parent
        );
        Ok(node)
    }

    /// Flat layer associations, root level first, then groups in pre-order.
    pub fn layer_associations(&self) -> Vec<LayerAssociation> {
        let mut result: Vec<LayerAssociation> = self
            .ungrouped
            .iter()
            .map(|entry| to_association(entry, None))
            .collect();
        for node in self.groups_preorder() {
            result.extend(
                node.layers
                    .iter()
                    .map(|entry| to_association(entry, Some(node.group.id))),
            );
        }
        result
    }

    /// Flat group records in pre-order.
    pub fn group_records(&self) -> Vec<Group> {
        self.groups_preorder()
            .into_iter()
            .map(|node| node.group.clone())
            .collect()
    }

    /// Clears every `is_new` marker after a successful save.
    pub fn mark_saved(&mut self) {
        for entry in &mut self.ungrouped {
            entry.is_new = false;
        }
        let mut stack: Vec<&mut GroupNode> = self.groups.iter_mut().collect();
        while let Some(node) = stack.pop() {
            for entry in &mut node.layers {
                entry.is_new = false;
            }
            stack.extend(node.subgroups.iter_mut());
        }
    }

    fn groups_preorder(&self) -> Vec<&GroupNode> {
        let mut ordered = Vec::new();
        let mut stack: Vec<&GroupNode> = self.groups.iter().rev().collect();
        while let Some(node) = stack.pop() {
            ordered.push(node);
            stack.extend(node.subgroups.iter().rev());
        }
        ordered
    }

    fn container_exists(&self, container: Option<GroupId>) -> bool {
        container.map_or(true, |group_id| self.find_group(group_id).is_some())
    }

    fn container_depth(&self, container: Option<GroupId>) -> usize {
        container
            .and_then(|group_id| self.find_group(group_id))
            .map_or(0, |node| node.depth + 1)
    }

    fn resolve_layer_slot(
        &self,
        point: &InsertionPoint,
    ) -> Result<(Option<GroupId>, usize), TreeError> {
        match *point {
            InsertionPoint::Start(container) | InsertionPoint::End(container) => {
                let layers = self
                    .container_layers(container)
                    .ok_or(TreeError::GroupNotFound(container.unwrap_or_default()))?;
                let index = if matches!(point, InsertionPoint::Start(_)) {
                    0
                } else {
                    layers.len()
                };
                Ok((container, index))
            }
            InsertionPoint::Before(NodeRef::Layer(anchor)) => self
                .locate_layer(anchor)
                .ok_or(TreeError::LayerNotFound(anchor)),
            InsertionPoint::After(NodeRef::Layer(anchor)) => self
                .locate_layer(anchor)
                .map(|(container, index)| (container, index + 1))
                .ok_or(TreeError::LayerNotFound(anchor)),
            InsertionPoint::Before(NodeRef::Group(_))
            | InsertionPoint::After(NodeRef::Group(_)) => Err(TreeError::InvalidAnchor),
        }
    }

    fn resolve_group_slot(
        &self,
        point: &InsertionPoint,
    ) -> Result<(Option<GroupId>, usize), TreeError> {
        match *point {
            InsertionPoint::Start(container) | InsertionPoint::End(container) => {
                if !self.container_exists(container) {
                    return Err(TreeError::GroupNotFound(container.unwrap_or_default()));
                }
                let index = if matches!(point, InsertionPoint::Start(_)) {
                    0
                } else {
                    self.container_groups(container).map_or(0, <[GroupNode]>::len)
                };
                Ok((container, index))
            }
            InsertionPoint::Before(NodeRef::Group(anchor)) => self
                .locate_group(anchor)
                .ok_or(TreeError::GroupNotFound(anchor)),
            InsertionPoint::After(NodeRef::Group(anchor)) => self
                .locate_group(anchor)
                .map(|(parent, index)| (parent, index + 1))
                .ok_or(TreeError::GroupNotFound(anchor)),
            InsertionPoint::Before(NodeRef::Layer(_))
            | InsertionPoint::After(NodeRef::Layer(_)) => Err(TreeError::InvalidAnchor),
        }
    }

    fn layers_mut(
        &mut self,
        container: Option<GroupId>,
    ) -> Result<&mut Vec<LayerEntry>, TreeError> {
        match container {
            None => Ok(&mut self.ungrouped),
            Some(group_id) => find_group_mut(&mut self.groups, group_id)
                .map(|node| &mut node.layers)
                .ok_or(TreeError::GroupNotFound(group_id)),
        }
    }

    fn subgroups_mut(
        &mut self,
        container: Option<GroupId>,
    ) -> Result<&mut Vec<GroupNode>, TreeError> {
        match container {
            None => Ok(&mut self.groups),
            Some(group_id) => find_group_mut(&mut self.groups, group_id)
                .map(|node| &mut node.subgroups)
                .ok_or(TreeError::GroupNotFound(group_id)),
        }
    }

    /// Renumbers every container and refreshes parent ids and depths.
    fn normalize(&mut self) {
        renumber_layers(&mut self.ungrouped);
        let digital_twin_id = self.digital_twin_id;
        fix_siblings(&mut self.groups, None, 0);
        let mut stack: Vec<&mut GroupNode> = self.groups.iter_mut().collect();
        while let Some(node) = stack.pop() {
            node.group.digital_twin_id = digital_twin_id;
            renumber_layers(&mut node.layers);
            renumber_groups(&mut node.subgroups, Some(node.group.id));
            stack.extend(node.subgroups.iter_mut());
        }
    }
}

struct TreeBuilder<'a> {
    children_of: &'a HashMap<Option<GroupId>, Vec<&'a Group>>,
    layers_of: HashMap<Option<GroupId>, Vec<LayerEntry>>,
    visited: HashSet<GroupId>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, group: &Group) -> GroupNode {
        self.visited.insert(group.id);
        let children_of = self.children_of;
        let pending: Vec<&Group> = children_of
            .get(&Some(group.id))
            .map(|children| {
                children
                    .iter()
                    .copied()
                    .filter(|child| !self.visited.contains(&child.id))
                    .collect()
            })
            .unwrap_or_default();

        let mut subgroups = Vec::with_capacity(pending.len());
        for child in pending {
            // A sibling subtree may already have claimed this group via a cycle.
            if !self.visited.contains(&child.id) {
                subgroups.push(self.build(child));
            }
        }

        GroupNode {
            group: group.clone(),
            layers: self.layers_of.remove(&Some(group.id)).unwrap_or_default(),
            subgroups,
            depth: 0,
        }
    }
}

fn find_group_mut(nodes: &mut [GroupNode], group_id: GroupId) -> Option<&mut GroupNode> {
    let mut stack: Vec<&mut GroupNode> = nodes.iter_mut().collect();
    while let Some(node) = stack.pop() {
        if node.group.id == group_id {
            return Some(node);
        }
        stack.extend(node.subgroups.iter_mut());
    }
    None
}

fn position_of_layer(layers: &[LayerEntry], layer_id: LayerId) -> Option<usize> {
    layers.iter().position(|entry| entry.layer_id == layer_id)
}

fn position_of_group(groups: &[GroupNode], group_id: GroupId) -> Option<usize> {
    groups.iter().position(|node| node.group.id == group_id)
}

fn renumber_layers(layers: &mut [LayerEntry]) {
    for (index, entry) in layers.iter_mut().enumerate() {
        entry.sort_order = index as i64;
    }
}

fn renumber_groups(siblings: &mut [GroupNode], parent: Option<GroupId>) {
    for (index, node) in siblings.iter_mut().enumerate() {
        node.group.sort_order = index as i64;
        node.group.parent_id = parent;
    }
}

/// Renumbers siblings and refreshes parent ids and depths of their subtrees.
fn fix_siblings(siblings: &mut [GroupNode], parent: Option<GroupId>, depth: usize) {
    renumber_groups(siblings, parent);
    let mut stack: Vec<(&mut GroupNode, usize)> =
        siblings.iter_mut().map(|node| (node, depth)).collect();
    while let Some((node, depth)) = stack.pop() {
        node.depth = depth;
        stack.extend(node.subgroups.iter_mut().map(|child| (child, depth + 1)));
    }
}

fn to_association(entry: &LayerEntry, group_id: Option<GroupId>) -> LayerAssociation {
    LayerAssociation {
        layer_id: entry.layer_id,
        is_default: entry.is_default,
        sort_order: entry.sort_order,
        group_id,
    }
}

fn normalize_title(value: String) -> Result<String, TreeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TreeError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}
