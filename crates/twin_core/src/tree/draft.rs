//! Editable draft of one digital twin: layer tree plus tool list.

use crate::model::digital_twin::{DigitalTwin, DigitalTwinId, Group, Layer};
use crate::model::snapshot::TwinSnapshot;
use crate::tree::layer_tree::LayerTree;
use crate::tree::tool_list::ToolList;

/// In-memory editing state held between fetch and save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwinDraft {
    layers: LayerTree,
    tools: ToolList,
}

impl TwinDraft {
    pub fn new(layers: LayerTree, tools: ToolList) -> Self {
        Self { layers, tools }
    }

    /// Builds a draft from a fetched twin, its flat groups and the layer catalog.
    pub fn from_remote(twin: &DigitalTwin, groups: &[Group], catalog: &[Layer]) -> Self {
        Self {
            layers: LayerTree::from_remote(twin.id, &twin.layer_associations, groups, catalog),
            tools: ToolList::from_associations(&twin.tool_associations),
        }
    }

    /// Rebuilds a draft from a snapshot, e.g. to discard local edits.
    pub fn from_snapshot(
        digital_twin_id: DigitalTwinId,
        snapshot: &TwinSnapshot,
        catalog: &[Layer],
    ) -> Self {
        Self {
            layers: LayerTree::from_remote(
                digital_twin_id,
                &snapshot.layers,
                &snapshot.groups,
                catalog,
            ),
            tools: ToolList::from_associations(&snapshot.tools),
        }
    }

    pub fn digital_twin_id(&self) -> DigitalTwinId {
        self.layers.digital_twin_id()
    }

    pub fn layers(&self) -> &LayerTree {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerTree {
        &mut self.layers
    }

    pub fn tools(&self) -> &ToolList {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolList {
        &mut self.tools
    }

    /// Flat capture of the current state.
    pub fn snapshot(&self) -> TwinSnapshot {
        TwinSnapshot {
            layers: self.layers.layer_associations(),
            groups: self.layers.group_records(),
            tools: self.tools.associations(),
        }
    }

    pub fn mark_saved(&mut self) {
        self.layers.mark_saved();
        self.tools.mark_saved();
    }
}
