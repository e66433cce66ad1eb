//! Applies the outcome of a successful write to an in-memory list.
//!
//! Every write action produces exactly one [`Mutation`], which is moved into
//! [`reconcile`] and consumed there. The reducer never refetches; an id that
//! is no longer present is a silent no-op because a concurrent action may
//! already have removed it.

use serde::Serialize;

use crate::types::{Entity, MutationKind};

/// Typed outcome of a successful write against one resource type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutation<T: Entity> {
    /// A freshly created item, placed at the front (newest first)
    Insert { item: T },
    Delete { id: String },
    Suspend { id: String },
    Unsuspend { id: String },
    Update { id: String, patch: T::Patch },
}

impl<T: Entity> Mutation<T> {
    pub fn delete(id: impl Into<String>) -> Self {
        Mutation::Delete { id: id.into() }
    }

    pub fn suspend(id: impl Into<String>, suspended: bool) -> Self {
        if suspended {
            Mutation::Suspend { id: id.into() }
        } else {
            Mutation::Unsuspend { id: id.into() }
        }
    }

    pub fn update(id: impl Into<String>, patch: T::Patch) -> Self {
        Mutation::Update {
            id: id.into(),
            patch,
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Insert { .. } => MutationKind::Insert,
            Mutation::Delete { .. } => MutationKind::Delete,
            Mutation::Suspend { .. } => MutationKind::Suspend,
            Mutation::Unsuspend { .. } => MutationKind::Unsuspend,
            Mutation::Update { .. } => MutationKind::Update,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Mutation::Insert { item } => item.id(),
            Mutation::Delete { id }
            | Mutation::Suspend { id }
            | Mutation::Unsuspend { id }
            | Mutation::Update { id, .. } => id,
        }
    }
}

/// Whether a mutation changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    NotFound,
    /// The entity has no field the mutation targets (e.g. suspending a post)
    Unsupported,
}

/// Apply `mutation` to `items` in place.
pub fn reconcile<T: Entity>(items: &mut Vec<T>, mutation: Mutation<T>) -> Applied {
    let kind = mutation.kind();
    let applied = match mutation {
        Mutation::Insert { item } => {
            if items.iter().any(|existing| existing.id() == item.id()) {
                // Already surfaced by a later page fetch; keep server copy
                Applied::NotFound
            } else {
                items.insert(0, item);
                Applied::Changed
            }
        }
        Mutation::Delete { id } => {
            let before = items.len();
            items.retain(|item| item.id() != id);
            if items.len() < before {
                Applied::Changed
            } else {
                Applied::NotFound
            }
        }
        Mutation::Suspend { id } => set_suspended(items, &id, true),
        Mutation::Unsuspend { id } => set_suspended(items, &id, false),
        Mutation::Update { id, patch } => match items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.apply_patch(&patch);
                Applied::Changed
            }
            None => Applied::NotFound,
        },
    };

    if applied != Applied::Changed {
        tracing::debug!(resource = T::RESOURCE, ?kind, ?applied, "mutation left list unchanged");
    }
    applied
}

fn set_suspended<T: Entity>(items: &mut [T], id: &str, suspended: bool) -> Applied {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) => {
            if item.set_suspended(suspended) {
                Applied::Changed
            } else {
                Applied::Unsupported
            }
        }
        None => Applied::NotFound,
    }
}
