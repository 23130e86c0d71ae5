//! Drag-and-drop permission checks.
//!
//! # Responsibility
//! - Decide whether a dragged item may be dropped on a target zone.
//! - Keep the allow-table declarative and the check pure.
//!
//! # Invariants
//! - Self-drop is denied before any custom rule or table lookup.
//! - A custom rule decision is authoritative when present.
//! - Rule failures are returned as errors, never turned into a decision.
//! - Identical inputs always produce identical decisions.

use crate::model::digital_twin::GroupId;
use crate::placement::zone::{AllowedZones, DropZone};
use crate::tree::traversal::TreeNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Item currently being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    /// Containing group, when the item lives inside one.
    #[serde(rename = "groupId", default)]
    pub group_id: Option<GroupId>,
    /// Subtype for polymorphic items such as tools.
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Display label carried along for catalog drags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DragItem {
    pub fn new(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id,
            group_id: None,
            content_type: None,
            label: None,
        }
    }

    pub fn in_group(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether both sides name the same item.
    pub fn is_same_item(&self, target: &DropTarget) -> bool {
        self.kind == target.kind && self.id == target.id && self.content_type == target.content_type
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Hovered drop target and zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    #[serde(rename = "groupId", default)]
    pub group_id: Option<GroupId>,
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub zone: DropZone,
}

impl DropTarget {
    pub fn new(kind: impl Into<String>, id: i64, zone: DropZone) -> Self {
        Self {
            kind: kind.into(),
            id,
            group_id: None,
            content_type: None,
            zone,
        }
    }

    pub fn in_group(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Why a drop was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NoDraggedItem,
    DropOnItself,
    DragTypeNotAllowed,
    DropTypeNotAllowed,
    ZoneNotAllowed,
    IntoOwnDescendant,
    /// Reason supplied by a custom rule.
    Custom(String),
}

impl Display for DenyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDraggedItem => write!(f, "no dragged item"),
            Self::DropOnItself => write!(f, "cannot drop on itself"),
            Self::DragTypeNotAllowed => write!(f, "drag type not allowed"),
            Self::DropTypeNotAllowed => write!(f, "drop type not allowed for this drag type"),
            Self::ZoneNotAllowed => write!(f, "drop zone not allowed"),
            Self::IntoOwnDescendant => write!(f, "cannot drop into own descendant"),
            Self::Custom(reason) => write!(f, "{reason}"),
        }
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropDecision {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
}

impl DropDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    /// Human-readable deny reason, if any.
    pub fn reason_text(&self) -> Option<String> {
        self.reason.as_ref().map(ToString::to_string)
    }
}

/// Failure inside a custom drop rule; treated as a configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRuleError {
    pub rule: &'static str,
    pub message: String,
}

impl DropRuleError {
    pub fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl Display for DropRuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "drop rule `{}` failed: {}", self.rule, self.message)
    }
}

impl Error for DropRuleError {}

/// Custom drop rule evaluated after the self-drop guard.
///
/// Returning `Ok(None)` defers to the allow-table.
pub trait DropRule<N: TreeNode> {
    fn evaluate(
        &self,
        dragged: &DragItem,
        target: &DropTarget,
        tree: &[N],
    ) -> Result<Option<DropDecision>, DropRuleError>;
}

impl<N, F> DropRule<N> for F
where
    N: TreeNode,
    F: Fn(&DragItem, &DropTarget, &[N]) -> Result<Option<DropDecision>, DropRuleError>,
{
    fn evaluate(
        &self,
        dragged: &DragItem,
        target: &DropTarget,
        tree: &[N],
    ) -> Result<Option<DropDecision>, DropRuleError> {
        self(dragged, target, tree)
    }
}

/// Two-level mapping: drag type → drop type → permitted zones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowTable {
    rules: BTreeMap<String, BTreeMap<String, AllowedZones>>,
}

impl AllowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one rule.
    pub fn allow(
        mut self,
        drag_kind: impl Into<String>,
        drop_kind: impl Into<String>,
        zones: AllowedZones,
    ) -> Self {
        self.rules
            .entry(drag_kind.into())
            .or_default()
            .insert(drop_kind.into(), zones);
        self
    }

    /// Parses a table from its JSON form, e.g. `{"group": {"group": "any"}}`.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Checks one combination without any tree context.
    pub fn check(&self, drag_kind: &str, drop_kind: &str, zone: DropZone) -> DropDecision {
        let Some(drop_types) = self.rules.get(drag_kind) else {
            return DropDecision::deny(DenyReason::DragTypeNotAllowed);
        };
        let Some(zones) = drop_types.get(drop_kind) else {
            return DropDecision::deny(DenyReason::DropTypeNotAllowed);
        };
        if zones.permits(zone) {
            DropDecision::allow()
        } else {
            DropDecision::deny(DenyReason::ZoneNotAllowed)
        }
    }
}

/// Allow-table plus optional custom rule.
pub struct DropPermissionConfig<N: TreeNode> {
    pub allowed: AllowTable,
    pub custom: Option<Box<dyn DropRule<N>>>,
}

impl<N: TreeNode> DropPermissionConfig<N> {
    pub fn new(allowed: AllowTable) -> Self {
        Self {
            allowed,
            custom: None,
        }
    }

    pub fn with_rule(mut self, rule: impl DropRule<N> + 'static) -> Self {
        self.custom = Some(Box::new(rule));
        self
    }
}

/// Decides whether `dragged` may be dropped on `target`.
///
/// # Errors
/// - Returns `DropRuleError` when the configured custom rule fails.
pub fn can_drop<N: TreeNode>(
    dragged: Option<&DragItem>,
    target: &DropTarget,
    tree: &[N],
    config: &DropPermissionConfig<N>,
) -> Result<DropDecision, DropRuleError> {
    let Some(dragged) = dragged else {
        return Ok(DropDecision::deny(DenyReason::NoDraggedItem));
    };

    if dragged.is_same_item(target) {
        return Ok(DropDecision::deny(DenyReason::DropOnItself));
    }

    if let Some(rule) = &config.custom {
        if let Some(decision) = rule.evaluate(dragged, target, tree)? {
            return Ok(decision);
        }
    }

    Ok(config
        .allowed
        .check(&dragged.kind, &target.kind, target.zone))
}
