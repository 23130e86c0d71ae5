//! Digital twin editing session.
//!
//! # Responsibility
//! - Load a twin into a local draft and keep the committed baseline.
//! - Apply permitted drag-and-drop gestures to the draft.
//! - Create unsaved groups remotely and swap in their real ids.
//! - Submit the remaining changes with one request per association kind.
//!
//! # Invariants
//! - The draft is only mutated by permitted gestures or explicit edits.
//! - The committed snapshot only advances after a request succeeded.
//! - Temporary group ids are never sent as a parent or group reference; a
//!   group is created only once its parent has a real id.

use crate::api::{ApiError, TwinApi};
use crate::model::bulk::{
    AssociationsBulkResult, BulkAction, BulkAssociationsPayload, BulkCounts, BulkPlan,
    GroupBulkOperation, OperationList,
};
use crate::model::digital_twin::{DigitalTwin, DigitalTwinId, Group, GroupId, Layer};
use crate::model::snapshot::TwinSnapshot;
use crate::model::tool::ToolKey;
use crate::placement::kinds;
use crate::placement::permission::{
    DenyReason, DragItem, DropPermissionConfig, DropRuleError, DropTarget,
};
use crate::placement::resolve::{resolve_insertion, resolve_tool_slot};
use crate::placement::session::DragSession;
use crate::placement::{layer_panel_config, tool_panel_config};
use crate::sync::{apply_plan, diff_snapshots};
use crate::tree::draft::TwinDraft;
use crate::tree::error::TreeError;
use crate::tree::layer_tree::{GroupNode, LayerEntry};
use log::{info, warn};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from editing-session operations.
#[derive(Debug)]
pub enum EditorError {
    /// Remote call failed.
    Api(ApiError),
    /// Draft mutation was rejected.
    Tree(TreeError),
    /// A custom drop rule failed.
    Rule(DropRuleError),
    /// A group was created but the remote store did not list it afterwards.
    GroupNotCreated(GroupId),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::Rule(err) => write!(f, "{err}"),
            Self::GroupNotCreated(id) => {
                write!(f, "created group {id} is missing from the remote group list")
            }
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::Rule(err) => Some(err),
            Self::GroupNotCreated(_) => None,
        }
    }
}

impl From<ApiError> for EditorError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<TreeError> for EditorError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

impl From<DropRuleError> for EditorError {
    fn from(value: DropRuleError) -> Self {
        Self::Rule(value)
    }
}

/// Result of one drop gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The draft was changed.
    Applied,
    /// The drop was not permitted; the draft is unchanged.
    Denied(DenyReason),
}

/// Summary of one save cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Number of operations submitted.
    pub operations: usize,
    /// Summed counters of the layers+groups requests, when any was sent.
    pub associations: Option<AssociationsBulkResult>,
    /// Counters of the tools request, when one was sent.
    pub tools: Option<BulkCounts>,
    /// Temporary group id to the id assigned by the remote store.
    pub group_ids: BTreeMap<GroupId, GroupId>,
}

impl SaveReport {
    fn record_associations(&mut self, operations: usize, result: AssociationsBulkResult) {
        self.operations += operations;
        self.associations
            .get_or_insert_with(AssociationsBulkResult::default)
            .merge(result);
    }
}

/// Single-editor session over one digital twin.
pub struct TwinEditor<A: TwinApi> {
    api: A,
    twin: DigitalTwin,
    catalog: Vec<Layer>,
    draft: TwinDraft,
    committed: TwinSnapshot,
    layer_rules: DropPermissionConfig<GroupNode>,
    tool_rules: DropPermissionConfig<GroupNode>,
}

impl<A: TwinApi> TwinEditor<A> {
    /// Fetches the twin, its groups and the layer catalog into a fresh draft.
    pub fn load(api: A, twin_id: DigitalTwinId) -> Result<Self, EditorError> {
        let twin = api.fetch_digital_twin(twin_id)?;
        let groups = api.fetch_groups(twin_id)?;
        let catalog = api.fetch_layers()?;

        let draft = TwinDraft::from_remote(&twin, &groups, &catalog);
        let committed = draft.snapshot();
        info!(
            "event=editor_load module=service status=ok twin_id={} layers={} groups={} tools={}",
            twin_id,
            committed.layers.len(),
            committed.groups.len(),
            committed.tools.len()
        );
        Ok(Self {
            api,
            twin,
            catalog,
            draft,
            committed,
            layer_rules: layer_panel_config(),
            tool_rules: tool_panel_config(),
        })
    }

    /// Replaces the layer-panel permissions.
    pub fn with_layer_rules(mut self, rules: DropPermissionConfig<GroupNode>) -> Self {
        self.layer_rules = rules;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn twin(&self) -> &DigitalTwin {
        &self.twin
    }

    pub fn digital_twin_id(&self) -> DigitalTwinId {
        self.draft.digital_twin_id()
    }

    pub fn catalog(&self) -> &[Layer] {
        &self.catalog
    }

    pub fn draft(&self) -> &TwinDraft {
        &self.draft
    }

    /// Direct access for edits that are not drag gestures.
    pub fn draft_mut(&mut self) -> &mut TwinDraft {
        &mut self.draft
    }

    pub fn committed(&self) -> &TwinSnapshot {
        &self.committed
    }

    /// Drops the session's current item on `target`.
    ///
    /// The drag always ends, whether or not the drop is applied.
    pub fn drop_item(
        &mut self,
        session: &mut DragSession,
        target: &DropTarget,
    ) -> Result<DropOutcome, EditorError> {
        let Some(dragged) = session.current().cloned() else {
            return Ok(DropOutcome::Denied(DenyReason::NoDraggedItem));
        };

        let decision = if dragged.kind == kinds::TOOL {
            session.drop_on(target, &[], &self.tool_rules)?.0
        } else {
            session.drop_on(target, self.draft.layers().groups(), &self.layer_rules)?.0
        };
        if !decision.allowed {
            let reason = decision.reason.unwrap_or(DenyReason::DropTypeNotAllowed);
            info!(
                "event=editor_drop module=service status=denied kind={} id={} reason={}",
                dragged.kind, dragged.id, reason
            );
            return Ok(DropOutcome::Denied(reason));
        }

        self.apply_drop(&dragged, target)?;
        info!(
            "event=editor_drop module=service status=ok kind={} id={} target_kind={} target_id={} zone={}",
            dragged.kind, dragged.id, target.kind, target.id, target.zone
        );
        Ok(DropOutcome::Applied)
    }

    fn apply_drop(&mut self, dragged: &DragItem, target: &DropTarget) -> Result<(), TreeError> {
        if dragged.kind == kinds::TOOL {
            let slot = resolve_tool_slot(dragged, target).ok_or(TreeError::InvalidAnchor)?;
            let content_type = dragged.content_type.clone().ok_or(TreeError::InvalidAnchor)?;
            return self
                .draft
                .tools_mut()
                .move_tool(&ToolKey::new(content_type, dragged.id), slot);
        }

        let point = resolve_insertion(dragged, target, self.draft.layers())
            .ok_or(TreeError::InvalidAnchor)?;
        match dragged.kind.as_str() {
            kinds::LAYER => self.draft.layers_mut().move_layer(dragged.id, point),
            kinds::GROUP => self.draft.layers_mut().move_group(dragged.id, point),
            kinds::CATALOG_LAYER => {
                let layer = self
                    .catalog
                    .iter()
                    .find(|layer| layer.id == dragged.id)
                    .ok_or(TreeError::LayerNotFound(dragged.id))?;
                self.draft
                    .layers_mut()
                    .insert_layer(LayerEntry::from_catalog(layer), point)
            }
            _ => Err(TreeError::InvalidAnchor),
        }
    }

    /// Operations that would be submitted by `save`.
    pub fn pending(&self) -> BulkPlan {
        diff_snapshots(&self.committed, &self.draft.snapshot())
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending().is_empty()
    }

    /// Submits pending changes: new groups first, then the remaining layer
    /// and group changes, then tools.
    ///
    /// New groups are created one nesting level per request. After each
    /// request the remote group list is refetched and every temporary id is
    /// replaced by the assigned id, so later operations only carry real ids.
    ///
    /// # Errors
    /// - Returns `EditorError::Api` on the first failed request. Requests that
    ///   already succeeded stay committed; the rest stays pending.
    /// - Returns `EditorError::GroupNotCreated` when a created group cannot be
    ///   matched in the refetched list.
    pub fn save(&mut self) -> Result<SaveReport, EditorError> {
        let mut report = SaveReport::default();
        let twin_id = self.digital_twin_id();
        if self.pending().is_empty() {
            info!(
                "event=editor_save module=service status=skip twin_id={} reason=no_changes",
                twin_id
            );
            return Ok(report);
        }

        self.create_groups(&mut report)?;

        let plan = self.pending();
        if plan.has_association_changes() {
            let result = self
                .api
                .bulk_update_associations(twin_id, &plan.associations_payload())
                .inspect_err(|err| {
                    warn!(
                        "event=editor_save module=service status=error twin_id={} stage=associations error={}",
                        twin_id, err
                    )
                })?;
            report.record_associations(plan.layers.len() + plan.groups.len(), result);

            let applied = BulkPlan {
                layers: plan.layers.clone(),
                groups: plan.groups.clone(),
                tools: Vec::new(),
            };
            self.committed = apply_plan(&self.committed, &applied);
            self.draft.layers_mut().mark_saved();
        }

        if plan.has_tool_changes() {
            let counts = self
                .api
                .bulk_update_tools(twin_id, &plan.tools_payload())
                .inspect_err(|err| {
                    warn!(
                        "event=editor_save module=service status=error twin_id={} stage=tools error={}",
                        twin_id, err
                    )
                })?;
            report.operations += plan.tools.len();
            report.tools = Some(counts);

            let applied = BulkPlan {
                tools: plan.tools.clone(),
                ..BulkPlan::default()
            };
            self.committed = apply_plan(&self.committed, &applied);
            self.draft.tools_mut().mark_saved();
        }

        info!(
            "event=editor_save module=service status=ok twin_id={} operations={} created_groups={}",
            twin_id,
            report.operations,
            report.group_ids.len()
        );
        Ok(report)
    }

    /// Creates unsaved groups whose parent already exists remotely, level by
    /// level, until none is left.
    fn create_groups(&mut self, report: &mut SaveReport) -> Result<(), EditorError> {
        let twin_id = self.digital_twin_id();
        loop {
            let known: HashSet<GroupId> = self.committed.groups.iter().map(|g| g.id).collect();
            let creates: Vec<GroupBulkOperation> = self
                .pending()
                .groups
                .into_iter()
                .filter(|op| op.action == BulkAction::Create)
                .collect();
            if creates.is_empty() {
                return Ok(());
            }
            let ready: Vec<GroupBulkOperation> = creates
                .iter()
                .filter(|op| op.group.parent_id.map_or(true, |id| known.contains(&id)))
                .cloned()
                .collect();
            if ready.is_empty() {
                return Err(EditorError::GroupNotCreated(creates[0].group.id));
            }

            let payload = BulkAssociationsPayload {
                layer_payload: OperationList::default(),
                group_payload: OperationList {
                    operations: ready.clone(),
                },
            };
            let result = self
                .api
                .bulk_update_associations(twin_id, &payload)
                .inspect_err(|err| {
                    warn!(
                        "event=editor_save module=service status=error twin_id={} stage=groups error={}",
                        twin_id, err
                    )
                })?;
            report.record_associations(ready.len(), result);

            let remote = self.api.fetch_groups(twin_id)?;
            let mut claimed = HashSet::new();
            for op in &ready {
                let created = remote
                    .iter()
                    .find(|group| {
                        !known.contains(&group.id)
                            && !claimed.contains(&group.id)
                            && group.title == op.group.title
                            && group.parent_id == op.group.parent_id
                            && group.sort_order == op.group.sort_order
                    })
                    .ok_or(EditorError::GroupNotCreated(op.group.id))?;
                claimed.insert(created.id);

                self.draft
                    .layers_mut()
                    .replace_group_id(op.group.id, created.id)?;
                self.committed.groups.push(Group {
                    id: created.id,
                    ..op.group.clone()
                });
                report.group_ids.insert(op.group.id, created.id);
                info!(
                    "event=editor_group_create module=service status=ok twin_id={} temp_id={} group_id={}",
                    twin_id, op.group.id, created.id
                );
            }
        }
    }

    /// Resets the draft to the committed snapshot.
    pub fn discard(&mut self) {
        self.draft =
            TwinDraft::from_snapshot(self.digital_twin_id(), &self.committed, &self.catalog);
        info!(
            "event=editor_discard module=service status=ok twin_id={}",
            self.digital_twin_id()
        );
    }

    /// Refetches the twin and its groups, replacing the draft and baseline.
    pub fn reload(&mut self) -> Result<(), EditorError> {
        let twin_id = self.digital_twin_id();
        let twin = self.api.fetch_digital_twin(twin_id)?;
        let groups = self.api.fetch_groups(twin_id)?;
        self.draft = TwinDraft::from_remote(&twin, &groups, &self.catalog);
        self.committed = self.draft.snapshot();
        self.twin = twin;
        info!(
            "event=editor_reload module=service status=ok twin_id={} groups={}",
            twin_id,
            self.committed.groups.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DropOutcome, EditorError};
    use crate::api::ApiError;
    use crate::placement::permission::DenyReason;
    use crate::tree::error::TreeError;
    use std::error::Error;

    #[test]
    fn editor_error_exposes_source() {
        let err = EditorError::from(ApiError::Transport("refused".to_string()));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "request failed: refused");

        let err = EditorError::from(TreeError::SelfAnchor);
        assert!(matches!(err, EditorError::Tree(TreeError::SelfAnchor)));
    }

    #[test]
    fn unmatched_group_error_names_temporary_id() {
        let err = EditorError::GroupNotCreated(-3);
        assert!(err.source().is_none());
        assert_eq!(
            err.to_string(),
            "created group -3 is missing from the remote group list"
        );
    }

    #[test]
    fn denied_outcome_keeps_reason() {
        let outcome = DropOutcome::Denied(DenyReason::ZoneNotAllowed);
        assert_ne!(outcome, DropOutcome::Applied);
    }
}
