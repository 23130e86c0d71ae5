use crate::model::digital_twin::{GroupId, LayerId};
use crate::model::tool::ToolKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from in-memory tree mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Layer is not part of the tree.
    LayerNotFound(LayerId),
    /// Group is not part of the tree.
    GroupNotFound(GroupId),
    /// Tool association is not part of the list.
    ToolNotFound(ToolKey),
    /// Layer is already associated with the digital twin.
    DuplicateLayer(LayerId),
    /// Group id is already used in the tree.
    DuplicateGroup(GroupId),
    /// Tool is already associated with the digital twin.
    DuplicateTool(ToolKey),
    /// Anchor kind does not match the moved item kind.
    InvalidAnchor,
    /// Item cannot be positioned relative to itself.
    SelfAnchor,
    /// Move would place a group inside its own subtree.
    CycleDetected {
        group_id: GroupId,
        parent_id: GroupId,
    },
    /// Group title is blank after trim.
    InvalidTitle,
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LayerNotFound(id) => write!(f, "layer not found in tree: {id}"),
            Self::GroupNotFound(id) => write!(f, "group not found in tree: {id}"),
            Self::ToolNotFound(key) => write!(f, "tool not found in list: {key}"),
            Self::DuplicateLayer(id) => write!(f, "layer already in tree: {id}"),
            Self::DuplicateGroup(id) => write!(f, "group already in tree: {id}"),
            Self::DuplicateTool(key) => write!(f, "tool already in list: {key}"),
            Self::InvalidAnchor => write!(f, "anchor kind does not match moved item"),
            Self::SelfAnchor => write!(f, "item cannot be anchored to itself"),
            Self::CycleDetected {
                group_id,
                parent_id,
            } => write!(
                f,
                "move would create cycle: group {group_id} under parent {parent_id}"
            ),
            Self::InvalidTitle => write!(f, "group title must not be blank"),
        }
    }
}

impl Error for TreeError {}
