//! Generic traversal helpers over id-addressed trees.
//!
//! # Responsibility
//! - Find nodes by id and answer ancestry questions for any tree shape.
//! - Count leaf items across nested containers.
//!
//! # Invariants
//! - Traversals use explicit stacks; nesting depth is bounded by memory only.
//! - Missing ids yield `None`/`false`, never a panic.

/// Structural view of a tree node: an id plus a children collection.
pub trait TreeNode: Sized {
    type Id: PartialEq;

    fn node_id(&self) -> &Self::Id;

    /// Child nodes; empty when the node has none.
    fn child_nodes(&self) -> &[Self];
}

/// Structural view of a node that owns countable items.
pub trait ItemTree: Sized {
    fn item_count(&self) -> usize;

    fn child_trees(&self) -> &[Self];
}

/// Pre-order search across `nodes` and all nested children.
///
/// Returns the first node whose id equals `id`.
pub fn find_node_by_id<'a, N: TreeNode>(nodes: &'a [N], id: &N::Id) -> Option<&'a N> {
    let mut stack: Vec<&'a N> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.node_id() == id {
            return Some(node);
        }
        stack.extend(node.child_nodes().iter().rev());
    }
    None
}

/// Returns whether `target_id` sits anywhere below `ancestor_id`.
///
/// Only the ancestor's children are searched, so a node is never its own
/// descendant. Returns `false` when `ancestor_id` is not in the tree.
pub fn is_descendant<N: TreeNode>(nodes: &[N], ancestor_id: &N::Id, target_id: &N::Id) -> bool {
    let Some(ancestor) = find_node_by_id(nodes, ancestor_id) else {
        return false;
    };

    let mut stack: Vec<&N> = ancestor.child_nodes().iter().collect();
    while let Some(node) = stack.pop() {
        if node.node_id() == target_id {
            return true;
        }
        stack.extend(node.child_nodes());
    }
    false
}

/// Sums items of `node` and every descendant.
pub fn total_items_in_tree<N: ItemTree>(node: &N) -> usize {
    count_items_with(node, N::item_count, N::child_trees)
}

/// Sums items of `node` and every descendant using caller-chosen collections.
pub fn count_items_with<N, I, C>(node: &N, items: I, children: C) -> usize
where
    I: Fn(&N) -> usize,
    C: for<'n> Fn(&'n N) -> &'n [N],
{
    let mut total = 0;
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        total += items(current);
        stack.extend(children(current));
    }
    total
}

#[cfg(test)]
mod tests {
    use super::{
        count_items_with, find_node_by_id, is_descendant, total_items_in_tree, ItemTree, TreeNode,
    };

    #[derive(Debug)]
    struct Node {
        id: u32,
        children: Option<Vec<Node>>,
    }

    impl Node {
        fn leaf(id: u32) -> Self {
            Self { id, children: None }
        }

        fn branch(id: u32, children: Vec<Node>) -> Self {
            Self {
                id,
                children: Some(children),
            }
        }
    }

    impl TreeNode for Node {
        type Id = u32;

        fn node_id(&self) -> &u32 {
            &self.id
        }

        fn child_nodes(&self) -> &[Self] {
            self.children.as_deref().unwrap_or(&[])
        }
    }

    struct Bucket {
        items: Vec<i32>,
        children: Vec<Bucket>,
    }

    impl ItemTree for Bucket {
        fn item_count(&self) -> usize {
            self.items.len()
        }

        fn child_trees(&self) -> &[Self] {
            &self.children
        }
    }

    fn sample() -> Vec<Node> {
        vec![
            Node::branch(1, vec![Node::leaf(2), Node::branch(3, vec![Node::leaf(4)])]),
            Node::branch(5, Vec::new()),
        ]
    }

    #[test]
    fn find_node_by_id_searches_nested_children() {
        let tree = sample();
        assert_eq!(find_node_by_id(&tree, &4).map(|n| n.id), Some(4));
        assert_eq!(find_node_by_id(&tree, &5).map(|n| n.id), Some(5));
        assert!(find_node_by_id(&tree, &42).is_none());
        assert!(find_node_by_id::<Node>(&[], &1).is_none());
    }

    #[test]
    fn find_node_by_id_returns_first_preorder_match() {
        let tree = vec![
            Node::branch(1, vec![Node::branch(7, vec![Node::leaf(9)])]),
            Node::branch(7, Vec::new()),
        ];
        let found = find_node_by_id(&tree, &7).unwrap();
        assert_eq!(found.child_nodes().len(), 1);
    }

    #[test]
    fn is_descendant_checks_all_depths() {
        let tree = sample();
        assert!(is_descendant(&tree, &1, &2));
        assert!(is_descendant(&tree, &1, &4));
        assert!(is_descendant(&tree, &3, &4));
        assert!(!is_descendant(&tree, &1, &1));
        assert!(!is_descendant(&tree, &1, &5));
        assert!(!is_descendant(&tree, &4, &1));
        assert!(!is_descendant(&tree, &99, &1));
    }

    #[test]
    fn counts_items_across_nested_children() {
        let root = Bucket {
            items: vec![1, 2],
            children: vec![
                Bucket {
                    items: vec![3],
                    children: Vec::new(),
                },
                Bucket {
                    items: Vec::new(),
                    children: vec![Bucket {
                        items: vec![4, 5],
                        children: Vec::new(),
                    }],
                },
            ],
        };
        assert_eq!(total_items_in_tree(&root), 5);
    }

    #[test]
    fn count_with_custom_collections_handles_missing_children() {
        let tree = Node::branch(1, vec![Node::leaf(2), Node::branch(3, vec![Node::leaf(4)])]);
        let nodes = count_items_with(&tree, |_| 1, |node: &Node| node.child_nodes());
        assert_eq!(nodes, 4);
        assert_eq!(count_items_with(&Node::leaf(8), |_| 0, |n: &Node| n.child_nodes()), 0);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let mut node = Node::leaf(0);
        for id in 1..50_000 {
            node = Node::branch(id, vec![node]);
        }
        let tree = vec![node];
        assert!(is_descendant(&tree, &49_999, &0));
        // Iterative drop keeps the test's own teardown off the recursion path.
        let mut pending = tree;
        while let Some(mut current) = pending.pop() {
            if let Some(children) = current.children.take() {
                pending.extend(children);
            }
        }
    }
}
