use crate::domain_model::{EntityId, EntityKind, EntityRef, InteractionKind, ToggleDirection};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MutationKind {
    Like,
    Unlike,
    Bookmark,
    Unbookmark,
    Create,
    Edit,
    Delete,
}

impl MutationKind {
    pub fn for_toggle(kind: InteractionKind, direction: ToggleDirection) -> Self {
        match (kind, direction) {
            (InteractionKind::Like, ToggleDirection::Activate) => MutationKind::Like,
            (InteractionKind::Like, ToggleDirection::Deactivate) => MutationKind::Unlike,
            (InteractionKind::Bookmark, ToggleDirection::Activate) => MutationKind::Bookmark,
            (InteractionKind::Bookmark, ToggleDirection::Deactivate) => MutationKind::Unbookmark,
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Like => "like",
            MutationKind::Unlike => "unlike",
            MutationKind::Bookmark => "bookmark",
            MutationKind::Unbookmark => "unbookmark",
            MutationKind::Create => "create",
            MutationKind::Edit => "edit",
            MutationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One state-changing call. Consumed once and never retried on its own;
/// only a session refresh re-issues it. `id` is `None` only for `Create`.
#[derive(Debug, Clone)]
pub struct MutationRequest {
    pub collection: EntityKind,
    pub id: Option<EntityId>,
    pub kind: MutationKind,
    pub payload: Option<serde_json::Value>,
}

impl MutationRequest {
    pub fn toggle(
        target: &EntityRef,
        interaction: InteractionKind,
        direction: ToggleDirection,
    ) -> Self {
        Self::on(target, MutationKind::for_toggle(interaction, direction), None)
    }

    pub fn create(collection: EntityKind, payload: serde_json::Value) -> Self {
        Self {
            collection,
            id: None,
            kind: MutationKind::Create,
            payload: Some(payload),
        }
    }

    pub fn edit(target: &EntityRef, payload: serde_json::Value) -> Self {
        Self::on(target, MutationKind::Edit, Some(payload))
    }

    pub fn delete(target: &EntityRef) -> Self {
        Self::on(target, MutationKind::Delete, None)
    }

    fn on(target: &EntityRef, kind: MutationKind, payload: Option<serde_json::Value>) -> Self {
        Self {
            collection: target.kind,
            id: Some(target.id.clone()),
            kind,
            payload,
        }
    }

    pub fn target(&self) -> Option<EntityRef> {
        self.id.clone().map(|id| EntityRef {
            kind: self.collection,
            id,
        })
    }
}
