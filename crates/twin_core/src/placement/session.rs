//! Explicit drag context passed through drag event handlers.
//!
//! # Invariants
//! - At most one item is dragged per session.
//! - `drop_on` always ends the drag, whether or not the drop is allowed.

use crate::placement::permission::{
    can_drop, DragItem, DropDecision, DropPermissionConfig, DropRuleError, DropTarget,
};
use crate::tree::traversal::TreeNode;
use log::debug;
use uuid::Uuid;

/// One drag-and-drop context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    id: Uuid,
    current: Option<DragItem>,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            current: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Starts dragging `item`, replacing any stale drag.
    pub fn start(&mut self, item: DragItem) {
        if let Some(previous) = &self.current {
            debug!(
                "event=drag_start module=placement status=replace session={} previous_kind={} previous_id={}",
                self.id, previous.kind, previous.id
            );
        }
        debug!(
            "event=drag_start module=placement status=ok session={} kind={} id={}",
            self.id, item.kind, item.id
        );
        self.current = Some(item);
    }

    pub fn current(&self) -> Option<&DragItem> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Ends the drag and returns the item that was being dragged.
    pub fn end(&mut self) -> Option<DragItem> {
        let item = self.current.take();
        debug!(
            "event=drag_end module=placement status=ok session={} had_item={}",
            self.id,
            item.is_some()
        );
        item
    }

    /// Checks the current item against `target`, then ends the drag.
    ///
    /// Returns the decision together with the item that was dropped.
    pub fn drop_on<N: TreeNode>(
        &mut self,
        target: &DropTarget,
        tree: &[N],
        config: &DropPermissionConfig<N>,
    ) -> Result<(DropDecision, Option<DragItem>), DropRuleError> {
        let decision = can_drop(self.current.as_ref(), target, tree, config);
        let item = self.end();
        decision.map(|decision| (decision, item))
    }
}

/// Serializes a drag item for a data-transfer channel.
pub fn encode_payload(item: &DragItem) -> Result<String, serde_json::Error> {
    serde_json::to_string(item)
}

/// Parses a drag item received on a data-transfer channel.
pub fn decode_payload(raw: &str) -> Result<DragItem, serde_json::Error> {
    serde_json::from_str(raw)
}
