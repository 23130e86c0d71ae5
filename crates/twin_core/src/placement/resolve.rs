//! Maps an allowed drop onto a tree insertion point.
//!
//! Zone semantics:
//! - leaf onto leaf: top inserts before the anchor, middle and bottom after it.
//! - leaf onto group: top inserts at the start of the group, middle and bottom
//!   at its end.
//! - group onto group: top and bottom insert before/after the anchor group,
//!   middle nests at the end of the anchor group.
//! - group onto leaf: end of the leaf's container.

use crate::model::tool::ToolKey;
use crate::placement::kinds;
use crate::placement::permission::{DragItem, DropTarget};
use crate::placement::zone::DropZone;
use crate::tree::layer_tree::{InsertionPoint, LayerTree, NodeRef};
use crate::tree::tool_list::ToolSlot;

/// Resolves the insertion point of a layer-panel drop.
///
/// Returns `None` when the pair is not a layer-panel drop or the target is
/// not in `tree`.
pub fn resolve_insertion(
    dragged: &DragItem,
    target: &DropTarget,
    tree: &LayerTree,
) -> Option<InsertionPoint> {
    let leaf_drag = matches!(dragged.kind.as_str(), kinds::LAYER | kinds::CATALOG_LAYER);

    match (leaf_drag, dragged.kind.as_str(), target.kind.as_str()) {
        (true, _, kinds::LAYER) => {
            tree.locate_layer(target.id)?;
            let anchor = NodeRef::Layer(target.id);
            Some(match target.zone {
                DropZone::Top => InsertionPoint::Before(anchor),
                DropZone::Middle | DropZone::Bottom => InsertionPoint::After(anchor),
            })
        }
        (true, _, kinds::GROUP) => {
            tree.find_group(target.id)?;
            Some(match target.zone {
                DropZone::Top => InsertionPoint::Start(Some(target.id)),
                DropZone::Middle | DropZone::Bottom => InsertionPoint::End(Some(target.id)),
            })
        }
        (false, kinds::GROUP, kinds::GROUP) => {
            tree.find_group(target.id)?;
            let anchor = NodeRef::Group(target.id);
            Some(match target.zone {
                DropZone::Top => InsertionPoint::Before(anchor),
                DropZone::Middle => InsertionPoint::End(Some(target.id)),
                DropZone::Bottom => InsertionPoint::After(anchor),
            })
        }
        (false, kinds::GROUP, kinds::LAYER) => {
            let (container, _) = tree.locate_layer(target.id)?;
            Some(InsertionPoint::End(container))
        }
        _ => None,
    }
}

/// Resolves the slot of a tool-panel drop.
pub fn resolve_tool_slot(dragged: &DragItem, target: &DropTarget) -> Option<ToolSlot> {
    if dragged.kind != kinds::TOOL || target.kind != kinds::TOOL {
        return None;
    }
    let anchor = ToolKey::new(target.content_type.clone()?, target.id);
    Some(match target.zone {
        DropZone::Top => ToolSlot::Before(anchor),
        DropZone::Middle | DropZone::Bottom => ToolSlot::After(anchor),
    })
}

#[cfg(test)]
mod tests {
    use super::{resolve_insertion, resolve_tool_slot};
    use crate::model::digital_twin::{Group, LayerAssociation};
    use crate::model::tool::ToolKey;
    use crate::placement::permission::{DragItem, DropTarget};
    use crate::placement::zone::DropZone;
    use crate::tree::layer_tree::{InsertionPoint, LayerTree, NodeRef};
    use crate::tree::tool_list::ToolSlot;

    fn tree() -> LayerTree {
        let groups = vec![
            Group {
                id: 1,
                title: "Base".to_string(),
                parent_id: None,
                sort_order: 0,
                digital_twin_id: 9,
            },
            Group {
                id: 2,
                title: "Nested".to_string(),
                parent_id: Some(1),
                sort_order: 0,
                digital_twin_id: 9,
            },
        ];
        let associations = vec![
            LayerAssociation {
                layer_id: 10,
                is_default: false,
                sort_order: 0,
                group_id: Some(2),
            },
            LayerAssociation {
                layer_id: 11,
                is_default: false,
                sort_order: 0,
                group_id: None,
            },
        ];
        LayerTree::from_remote(9, &associations, &groups, &[])
    }

    #[test]
    fn layer_onto_layer_uses_anchor_side() {
        let tree = tree();
        let dragged = DragItem::new("layer", 11);
        assert_eq!(
            resolve_insertion(&dragged, &DropTarget::new("layer", 10, DropZone::Top), &tree),
            Some(InsertionPoint::Before(NodeRef::Layer(10)))
        );
        assert_eq!(
            resolve_insertion(&dragged, &DropTarget::new("layer", 10, DropZone::Bottom), &tree),
            Some(InsertionPoint::After(NodeRef::Layer(10)))
        );
    }

    #[test]
    fn layer_onto_group_nests() {
        let tree = tree();
        let dragged = DragItem::new("catalog-layer", 30);
        assert_eq!(
            resolve_insertion(&dragged, &DropTarget::new("group", 2, DropZone::Middle), &tree),
            Some(InsertionPoint::End(Some(2)))
        );
        assert_eq!(
            resolve_insertion(&dragged, &DropTarget::new("group", 2, DropZone::Top), &tree),
            Some(InsertionPoint::Start(Some(2)))
        );
    }

    #[test]
    fn group_onto_group_by_zone() {
        let tree = tree();
        let dragged = DragItem::new("group", 2);
        let target = |zone| DropTarget::new("group", 1, zone);
        assert_eq!(
            resolve_insertion(&dragged, &target(DropZone::Top), &tree),
            Some(InsertionPoint::Before(NodeRef::Group(1)))
        );
        assert_eq!(
            resolve_insertion(&dragged, &target(DropZone::Middle), &tree),
            Some(InsertionPoint::End(Some(1)))
        );
        assert_eq!(
            resolve_insertion(&dragged, &target(DropZone::Bottom), &tree),
            Some(InsertionPoint::After(NodeRef::Group(1)))
        );
        assert_eq!(
            resolve_insertion(&dragged, &DropTarget::new("layer", 10, DropZone::Top), &tree),
            Some(InsertionPoint::End(Some(2)))
        );
    }

    #[test]
    fn unknown_targets_and_kinds_resolve_to_none() {
        let tree = tree();
        assert_eq!(
            resolve_insertion(
                &DragItem::new("layer", 11),
                &DropTarget::new("group", 42, DropZone::Middle),
                &tree
            ),
            None
        );
        assert_eq!(
            resolve_insertion(
                &DragItem::new("tool", 1),
                &DropTarget::new("layer", 10, DropZone::Top),
                &tree
            ),
            None
        );
    }

    #[test]
    fn tool_slots_need_a_content_type() {
        let dragged = DragItem::new("tool", 1).with_content_type("bookmark");
        let target = DropTarget::new("tool", 2, DropZone::Top).with_content_type("story");
        assert_eq!(
            resolve_tool_slot(&dragged, &target),
            Some(ToolSlot::Before(ToolKey::new("story", 2)))
        );
        assert_eq!(
            resolve_tool_slot(&dragged, &DropTarget::new("tool", 2, DropZone::Top)),
            None
        );
    }
}
