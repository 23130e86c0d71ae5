//! Ordered tool associations of one digital twin.
//!
//! # Invariants
//! - `sort_order` is `0..n` with no gaps after every mutation.
//! - A `(content_type, content_id)` pair appears at most once.

use crate::model::tool::{ToolAssociation, ToolCatalogItem, ToolKey, ToolKind};
use crate::tree::error::TreeError;
use log::{debug, warn};
use std::collections::HashSet;

/// One tool association as shown in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEntry {
    pub key: ToolKey,
    pub label: String,
    pub is_default: bool,
    pub sort_order: i64,
    /// Added locally and not yet saved.
    pub is_new: bool,
}

/// Target position inside the tool list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSlot {
    Start,
    End,
    Before(ToolKey),
    After(ToolKey),
}

/// Ordered list of tool associations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolList {
    entries: Vec<ToolEntry>,
}

impl ToolList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the list from remote associations ordered by `(sort_order, key)`.
    pub fn from_associations(associations: &[ToolAssociation]) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(associations.len());
        for association in associations {
            let key = association.key();
            if !seen.insert(key.clone()) {
                warn!(
                    "event=tool_list_build module=tree status=warn reason=duplicate_tool tool={}",
                    key
                );
                continue;
            }
            entries.push(ToolEntry {
                key,
                label: String::new(),
                is_default: association.is_default,
                sort_order: association.sort_order,
                is_new: false,
            });
        }
        entries.sort_by(|a, b| (a.sort_order, &a.key).cmp(&(b.sort_order, &b.key)));
        renumber(&mut entries);
        Self { entries }
    }

    pub fn entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, key: &ToolKey) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.key == key)
    }

    pub fn contains(&self, key: &ToolKey) -> bool {
        self.position(key).is_some()
    }

    /// Inserts one entry at `slot`.
    pub fn insert(&mut self, entry: ToolEntry, slot: ToolSlot) -> Result<(), TreeError> {
        if self.contains(&entry.key) {
            return Err(TreeError::DuplicateTool(entry.key));
        }
        let index = self.resolve(&slot)?;
        debug!(
            "event=tool_insert module=tree status=ok tool={} index={}",
            entry.key, index
        );
        self.entries.insert(index, entry);
        renumber(&mut self.entries);
        Ok(())
    }

    /// Appends a catalog item as an unsaved tool association.
    pub fn add_catalog_tool(
        &mut self,
        kind: ToolKind,
        item: &ToolCatalogItem,
    ) -> Result<(), TreeError> {
        let entry = ToolEntry {
            key: ToolKey::new(kind.content_type(), item.id),
            label: item.label.clone(),
            is_default: false,
            sort_order: self.entries.len() as i64,
            is_new: true,
        };
        self.insert(entry, ToolSlot::End)
    }

    /// Moves one entry to `slot`.
    pub fn move_tool(&mut self, key: &ToolKey, slot: ToolSlot) -> Result<(), TreeError> {
        if matches!(&slot, ToolSlot::Before(anchor) | ToolSlot::After(anchor) if anchor == key) {
            return Err(TreeError::SelfAnchor);
        }
        let from = self
            .position(key)
            .ok_or_else(|| TreeError::ToolNotFound(key.clone()))?;
        self.resolve(&slot)?;

        let entry = self.entries.remove(from);
        let index = self.resolve(&slot)?;
        self.entries.insert(index, entry);
        renumber(&mut self.entries);
        debug!(
            "event=tool_move module=tree status=ok tool={} from={} to={}",
            key, from, index
        );
        Ok(())
    }

    /// Removes one entry and returns it.
    pub fn remove(&mut self, key: &ToolKey) -> Result<ToolEntry, TreeError> {
        let index = self
            .position(key)
            .ok_or_else(|| TreeError::ToolNotFound(key.clone()))?;
        let entry = self.entries.remove(index);
        renumber(&mut self.entries);
        Ok(entry)
    }

    pub fn set_default(&mut self, key: &ToolKey, is_default: bool) -> Result<(), TreeError> {
        let index = self
            .position(key)
            .ok_or_else(|| TreeError::ToolNotFound(key.clone()))?;
        self.entries[index].is_default = is_default;
        Ok(())
    }

    /// Flat associations in list order.
    pub fn associations(&self) -> Vec<ToolAssociation> {
        self.entries
            .iter()
            .map(|entry| ToolAssociation {
                content_type: entry.key.content_type.clone(),
                content_id: entry.key.content_id,
                sort_order: entry.sort_order,
                is_default: entry.is_default,
            })
            .collect()
    }

    pub fn mark_saved(&mut self) {
        for entry in &mut self.entries {
            entry.is_new = false;
        }
    }

    fn resolve(&self, slot: &ToolSlot) -> Result<usize, TreeError> {
        match slot {
            ToolSlot::Start => Ok(0),
            ToolSlot::End => Ok(self.entries.len()),
            ToolSlot::Before(anchor) => self
                .position(anchor)
                .ok_or_else(|| TreeError::ToolNotFound(anchor.clone())),
            ToolSlot::After(anchor) => self
                .position(anchor)
                .map(|index| index + 1)
                .ok_or_else(|| TreeError::ToolNotFound(anchor.clone())),
        }
    }
}

fn renumber(entries: &mut [ToolEntry]) {
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.sort_order = index as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::{ToolList, ToolSlot};
    use crate::model::tool::{ToolAssociation, ToolCatalogItem, ToolKey, ToolKind};
    use crate::tree::error::TreeError;

    fn association(content_type: &str, content_id: i64, sort_order: i64) -> ToolAssociation {
        ToolAssociation {
            content_type: content_type.to_string(),
            content_id,
            sort_order,
            is_default: false,
        }
    }

    fn order(list: &ToolList) -> Vec<String> {
        list.entries().iter().map(|entry| entry.key.to_string()).collect()
    }

    #[test]
    fn from_associations_sorts_and_renumbers() {
        let list = ToolList::from_associations(&[
            association("story", 4, 9),
            association("bookmark", 1, 2),
            association("bookmark", 1, 5),
        ]);
        assert_eq!(order(&list), vec!["bookmark:1", "story:4"]);
        let sort_orders: Vec<i64> = list.entries().iter().map(|e| e.sort_order).collect();
        assert_eq!(sort_orders, vec![0, 1]);
    }

    #[test]
    fn move_before_and_after_anchor() {
        let mut list = ToolList::from_associations(&[
            association("bookmark", 1, 0),
            association("project", 2, 1),
            association("story", 3, 2),
        ]);

        list.move_tool(&ToolKey::new("story", 3), ToolSlot::Before(ToolKey::new("bookmark", 1)))
            .unwrap();
        assert_eq!(order(&list), vec!["story:3", "bookmark:1", "project:2"]);

        list.move_tool(&ToolKey::new("story", 3), ToolSlot::After(ToolKey::new("project", 2)))
            .unwrap();
        assert_eq!(order(&list), vec!["bookmark:1", "project:2", "story:3"]);
    }

    #[test]
    fn move_rejects_self_anchor_and_unknown_tools() {
        let mut list = ToolList::from_associations(&[association("bookmark", 1, 0)]);
        let key = ToolKey::new("bookmark", 1);
        assert_eq!(
            list.move_tool(&key, ToolSlot::After(key.clone())),
            Err(TreeError::SelfAnchor)
        );
        let missing = ToolKey::new("story", 9);
        assert_eq!(
            list.move_tool(&missing, ToolSlot::End),
            Err(TreeError::ToolNotFound(missing))
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn catalog_tools_are_appended_as_new() {
        let mut list = ToolList::from_associations(&[association("bookmark", 1, 0)]);
        let item = ToolCatalogItem {
            id: 8,
            label: "Terrain".to_string(),
            description: None,
            content: serde_json::Value::Null,
        };
        list.add_catalog_tool(ToolKind::TerrainProvider, &item).unwrap();

        let added = &list.entries()[1];
        assert_eq!(added.key, ToolKey::new("terrain_provider", 8));
        assert!(added.is_new);
        assert_eq!(added.sort_order, 1);

        let err = list.add_catalog_tool(ToolKind::TerrainProvider, &item).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateTool(_)));
    }
}
