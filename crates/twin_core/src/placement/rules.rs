//! Built-in custom drop rules.

use crate::model::digital_twin::GroupId;
use crate::placement::permission::{
    DenyReason, DragItem, DropDecision, DropRule, DropRuleError, DropTarget,
};
use crate::tree::traversal::{is_descendant, TreeNode};

/// Denies dropping a container into itself or any of its descendants.
///
/// The target's effective container is the target itself when it is a
/// container, or the container holding it otherwise. Items of other kinds, and
/// dragged containers that are not in the tree, are left to the allow-table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescendantPrevention {
    pub container_kind: String,
}

impl DescendantPrevention {
    pub fn new(container_kind: impl Into<String>) -> Self {
        Self {
            container_kind: container_kind.into(),
        }
    }

    fn effective_container(&self, target: &DropTarget) -> Option<GroupId> {
        if target.kind == self.container_kind {
            Some(target.id)
        } else {
            target.group_id
        }
    }
}

impl<N: TreeNode<Id = GroupId>> DropRule<N> for DescendantPrevention {
    fn evaluate(
        &self,
        dragged: &DragItem,
        target: &DropTarget,
        tree: &[N],
    ) -> Result<Option<DropDecision>, DropRuleError> {
        if dragged.kind != self.container_kind {
            return Ok(None);
        }
        let Some(container) = self.effective_container(target) else {
            return Ok(None);
        };
        if container == dragged.id || is_descendant(tree, &dragged.id, &container) {
            return Ok(Some(DropDecision::deny(DenyReason::IntoOwnDescendant)));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::DescendantPrevention;
    use crate::placement::permission::{DenyReason, DragItem, DropRule, DropTarget};
    use crate::placement::zone::DropZone;
    use crate::tree::traversal::TreeNode;

    struct Node {
        id: i64,
        children: Vec<Node>,
    }

    impl TreeNode for Node {
        type Id = i64;

        fn node_id(&self) -> &i64 {
            &self.id
        }

        fn child_nodes(&self) -> &[Self] {
            &self.children
        }
    }

    fn leaf(id: i64) -> Node {
        Node {
            id,
            children: Vec::new(),
        }
    }

    // A(1) -> [B(2) -> [D(4)], C(3)], E(5)
    fn tree() -> Vec<Node> {
        vec![
            Node {
                id: 1,
                children: vec![
                    Node {
                        id: 2,
                        children: vec![leaf(4)],
                    },
                    leaf(3),
                ],
            },
            leaf(5),
        ]
    }

    #[test]
    fn group_onto_own_child_is_denied() {
        let rule = DescendantPrevention::new("group");
        let decision = rule
            .evaluate(
                &DragItem::new("group", 1),
                &DropTarget::new("group", 2, DropZone::Middle),
                &tree()[..],
            )
            .unwrap();
        assert_eq!(decision.and_then(|d| d.reason), Some(DenyReason::IntoOwnDescendant));
    }

    #[test]
    fn layer_inside_descendant_counts_as_descendant_target() {
        let rule = DescendantPrevention::new("group");
        let target = DropTarget::new("layer", 40, DropZone::Top).in_group(Some(4));
        let decision = rule
            .evaluate(&DragItem::new("group", 1), &target, &tree()[..])
            .unwrap();
        assert!(matches!(decision, Some(d) if !d.allowed));
    }

    #[test]
    fn unrelated_targets_defer_to_table() {
        let rule = DescendantPrevention::new("group");
        let nodes = tree();
        assert_eq!(
            rule.evaluate(
                &DragItem::new("group", 2),
                &DropTarget::new("group", 5, DropZone::Middle),
                &nodes[..]
            )
            .unwrap(),
            None
        );
        assert_eq!(
            rule.evaluate(
                &DragItem::new("group", 4),
                &DropTarget::new("group", 1, DropZone::Middle),
                &nodes[..]
            )
            .unwrap(),
            None
        );
        assert_eq!(
            rule.evaluate(
                &DragItem::new("layer", 1),
                &DropTarget::new("group", 2, DropZone::Middle),
                &nodes[..]
            )
            .unwrap(),
            None
        );
    }

    #[test]
    fn unknown_dragged_group_defers_to_table() {
        let rule = DescendantPrevention::new("group");
        let nodes = tree();
        for target in [1, 4, 5] {
            let decision = rule
                .evaluate(
                    &DragItem::new("group", 99),
                    &DropTarget::new("group", target, DropZone::Middle),
                    &nodes[..],
                )
                .unwrap();
            assert_eq!(decision, None);
        }
    }
}
