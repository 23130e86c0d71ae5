use twin_core::tree::layer_tree::LayerEntry;
use twin_core::{
    Group, GroupRemoveMode, InsertionPoint, Layer, LayerAssociation, LayerTree, NodeRef, TreeError,
};

fn group(id: i64, parent_id: Option<i64>, sort_order: i64) -> Group {
    Group {
        id,
        title: format!("Group {id}"),
        parent_id,
        sort_order,
        digital_twin_id: 1,
    }
}

fn assoc(layer_id: i64, group_id: Option<i64>, sort_order: i64) -> LayerAssociation {
    LayerAssociation {
        layer_id,
        is_default: false,
        sort_order,
        group_id,
    }
}

fn catalog_layer(id: i64, title: &str) -> Layer {
    Layer {
        id,
        kind: "wms".to_string(),
        title: title.to_string(),
        url: String::new(),
        feature_name: String::new(),
        is_background: false,
        content: serde_json::Value::Null,
        last_updated: None,
    }
}

fn layer_ids(tree: &LayerTree, container: Option<i64>) -> Vec<i64> {
    tree.container_layers(container)
        .unwrap()
        .iter()
        .map(|entry| entry.layer_id)
        .collect()
}

fn group_ids(tree: &LayerTree, container: Option<i64>) -> Vec<i64> {
    tree.container_groups(container)
        .unwrap()
        .iter()
        .map(|node| node.group.id)
        .collect()
}

fn sort_orders_are_contiguous(tree: &LayerTree) -> bool {
    let snapshot_groups = tree.group_records();
    let mut containers: Vec<Option<i64>> = vec![None];
    containers.extend(snapshot_groups.iter().map(|group| Some(group.id)));
    containers.iter().all(|container| {
        let layers_ok = tree
            .container_layers(*container)
            .unwrap()
            .iter()
            .enumerate()
            .all(|(index, entry)| entry.sort_order == index as i64);
        let groups_ok = tree
            .container_groups(*container)
            .unwrap()
            .iter()
            .enumerate()
            .all(|(index, node)| node.group.sort_order == index as i64);
        layers_ok && groups_ok
    })
}

// 1 -> [2 -> [3]], 4 ; layers 10,11 in 1, 12 in 3, 20 ungrouped
fn sample_tree() -> LayerTree {
    let groups = vec![
        group(4, None, 1),
        group(1, None, 0),
        group(2, Some(1), 0),
        group(3, Some(2), 0),
    ];
    let associations = vec![
        assoc(11, Some(1), 5),
        assoc(10, Some(1), 2),
        assoc(12, Some(3), 0),
        assoc(20, None, 0),
    ];
    let catalog = vec![catalog_layer(10, "Roads"), catalog_layer(11, "Rivers")];
    LayerTree::from_remote(1, &associations, &groups, &catalog)
}

#[test]
fn from_remote_nests_groups_and_renumbers() {
    let tree = sample_tree();

    assert_eq!(group_ids(&tree, None), vec![1, 4]);
    assert_eq!(group_ids(&tree, Some(1)), vec![2]);
    assert_eq!(layer_ids(&tree, Some(1)), vec![10, 11]);
    assert_eq!(tree.find_group(3).unwrap().depth, 2);
    assert_eq!(tree.layer(10).unwrap().title, "Roads");
    assert_eq!(tree.find_group(1).unwrap().total_layers(), 3);
    assert_eq!(tree.total_layers(), 4);
    assert!(sort_orders_are_contiguous(&tree));
}

#[test]
fn from_remote_attaches_orphans_and_cycles_at_root() {
    let groups = vec![
        group(1, Some(99), 0),
        group(5, Some(6), 0),
        group(6, Some(5), 0),
    ];
    let associations = vec![assoc(30, Some(42), 0)];
    let tree = LayerTree::from_remote(1, &associations, &groups, &[]);

    let roots = group_ids(&tree, None);
    assert!(roots.contains(&1));
    assert_eq!(tree.group_records().len(), 3);
    assert_eq!(layer_ids(&tree, None), vec![30]);
    assert!(sort_orders_are_contiguous(&tree));
}

#[test]
fn move_layer_across_containers() {
    let mut tree = sample_tree();

    tree.move_layer(20, InsertionPoint::Before(NodeRef::Layer(11)))
        .unwrap();
    assert_eq!(layer_ids(&tree, Some(1)), vec![10, 20, 11]);
    assert!(layer_ids(&tree, None).is_empty());

    tree.move_layer(10, InsertionPoint::End(Some(3))).unwrap();
    assert_eq!(layer_ids(&tree, Some(3)), vec![12, 10]);
    assert_eq!(tree.locate_layer(10), Some((Some(3), 1)));
    assert!(sort_orders_are_contiguous(&tree));
}

#[test]
fn move_layer_after_later_sibling_in_same_container() {
    let mut tree = sample_tree();
    tree.move_layer(10, InsertionPoint::After(NodeRef::Layer(11)))
        .unwrap();
    assert_eq!(layer_ids(&tree, Some(1)), vec![11, 10]);
}

#[test]
fn invalid_moves_leave_tree_unchanged() {
    let mut tree = sample_tree();
    let before = tree.clone();

    assert_eq!(
        tree.move_layer(10, InsertionPoint::After(NodeRef::Layer(10))),
        Err(TreeError::SelfAnchor)
    );
    assert_eq!(
        tree.move_layer(10, InsertionPoint::End(Some(77))),
        Err(TreeError::GroupNotFound(77))
    );
    assert_eq!(
        tree.move_layer(10, InsertionPoint::Before(NodeRef::Group(2))),
        Err(TreeError::InvalidAnchor)
    );
    assert_eq!(
        tree.move_group(1, InsertionPoint::End(Some(3))),
        Err(TreeError::CycleDetected {
            group_id: 1,
            parent_id: 3
        })
    );
    assert_eq!(
        tree.move_group(2, InsertionPoint::End(Some(2))),
        Err(TreeError::CycleDetected {
            group_id: 2,
            parent_id: 2
        })
    );
    assert_eq!(tree, before);
}

#[test]
fn move_group_updates_parent_and_depth() {
    let mut tree = sample_tree();
    tree.move_group(3, InsertionPoint::Before(NodeRef::Group(1)))
        .unwrap();

    assert_eq!(group_ids(&tree, None), vec![3, 1, 4]);
    let moved = tree.find_group(3).unwrap();
    assert_eq!(moved.group.parent_id, None);
    assert_eq!(moved.depth, 0);
    assert!(group_ids(&tree, Some(2)).is_empty());
    assert!(sort_orders_are_contiguous(&tree));
}

#[test]
fn create_group_uses_negative_temporary_ids() {
    let mut tree = sample_tree();
    let first = tree
        .create_group("  New folder ", InsertionPoint::Start(Some(1)))
        .unwrap();
    let second = tree
        .create_group("Other", InsertionPoint::End(None))
        .unwrap();

    assert!(first < 0);
    assert!(second < first);
    let created = tree.find_group(first).unwrap();
    assert_eq!(created.group.title, "New folder");
    assert_eq!(created.group.parent_id, Some(1));
    assert_eq!(created.depth, 1);
    assert_eq!(group_ids(&tree, Some(1)), vec![first, 2]);
    assert_eq!(
        tree.create_group("   ", InsertionPoint::End(None)),
        Err(TreeError::InvalidTitle)
    );
}

#[test]
fn rename_group_trims_and_rejects_blank_titles() {
    let mut tree = sample_tree();
    tree.rename_group(2, "  Hydrology ").unwrap();
    assert_eq!(tree.find_group(2).unwrap().group.title, "Hydrology");

    let before = tree.clone();
    assert_eq!(tree.rename_group(2, " \t "), Err(TreeError::InvalidTitle));
    assert_eq!(tree.rename_group(77, "Other"), Err(TreeError::GroupNotFound(77)));
    assert_eq!(tree, before);
}

#[test]
fn replace_group_id_keeps_position_and_rewires_children() {
    let mut tree = sample_tree();
    let temp = tree
        .create_group("Imagery", InsertionPoint::End(None))
        .unwrap();
    let child = tree
        .create_group("Aerial", InsertionPoint::End(Some(temp)))
        .unwrap();
    tree.move_layer(20, InsertionPoint::End(Some(temp)))
        .unwrap();

    tree.replace_group_id(temp, 40).unwrap();
    assert!(tree.find_group(temp).is_none());
    assert_eq!(group_ids(&tree, None), vec![1, 4, 40]);
    assert_eq!(tree.find_group(child).unwrap().group.parent_id, Some(40));
    assert_eq!(tree.locate_layer(20), Some((Some(40), 0)));

    assert_eq!(tree.replace_group_id(child, 4), Err(TreeError::DuplicateGroup(4)));
    assert_eq!(tree.replace_group_id(-99, 41), Err(TreeError::GroupNotFound(-99)));
}

#[test]
fn dissolve_moves_children_to_parent_position() {
    let mut tree = sample_tree();
    let removed = tree.remove_group(2, GroupRemoveMode::Dissolve).unwrap();

    assert!(removed.subgroups.is_empty());
    assert_eq!(group_ids(&tree, Some(1)), vec![3]);
    assert_eq!(tree.find_group(3).unwrap().depth, 1);
    assert_eq!(tree.find_group(3).unwrap().group.parent_id, Some(1));
    assert_eq!(tree.total_layers(), 4);
}

#[test]
fn dissolve_appends_layers_to_parent_layers() {
    let mut tree = sample_tree();
    tree.remove_group(1, GroupRemoveMode::Dissolve).unwrap();

    assert_eq!(layer_ids(&tree, None), vec![20, 10, 11]);
    assert_eq!(group_ids(&tree, None), vec![2, 4]);
    assert_eq!(tree.find_group(2).unwrap().depth, 0);
    assert_eq!(tree.find_group(3).unwrap().depth, 1);
    assert!(sort_orders_are_contiguous(&tree));
}

#[test]
fn delete_all_removes_subtree_layers() {
    let mut tree = sample_tree();
    let removed = tree.remove_group(1, GroupRemoveMode::DeleteAll).unwrap();

    assert_eq!(removed.total_layers(), 3);
    assert_eq!(group_ids(&tree, None), vec![4]);
    assert!(!tree.contains_layer(12));
    assert_eq!(tree.total_layers(), 1);
    assert_eq!(tree.find_group(4).unwrap().group.sort_order, 0);
}

#[test]
fn catalog_layers_append_as_new_and_reject_duplicates() {
    let mut tree = sample_tree();
    tree.add_catalog_layer(&catalog_layer(50, "Parks"), Some(4))
        .unwrap();

    let added = tree.layer(50).unwrap();
    assert!(added.is_new);
    assert_eq!(added.sort_order, 0);
    assert_eq!(added.title, "Parks");

    assert_eq!(
        tree.insert_layer(
            LayerEntry::from_catalog(&catalog_layer(10, "Roads")),
            InsertionPoint::End(None)
        ),
        Err(TreeError::DuplicateLayer(10))
    );

    tree.mark_saved();
    assert!(!tree.layer(50).unwrap().is_new);
}

#[test]
fn flat_output_lists_root_first_then_groups_in_preorder() {
    let tree = sample_tree();
    let layer_order: Vec<i64> = tree
        .layer_associations()
        .iter()
        .map(|assoc| assoc.layer_id)
        .collect();
    assert_eq!(layer_order, vec![20, 10, 11, 12]);

    let group_order: Vec<i64> = tree.group_records().iter().map(|g| g.id).collect();
    assert_eq!(group_order, vec![1, 2, 3, 4]);
}
