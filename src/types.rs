/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Kinds of write outcome the console knows how to apply locally
/// Used by both the reconciler and the CLI's JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationKind {
    Insert,
    Delete,
    Suspend,
    Unsuspend,
    Update,
}

/// A remote resource held in a collection store.
///
/// Ids are opaque strings; numeric ids from the server are stringified on
/// decode so lookups never depend on the wire type.
pub trait Entity: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static {
    /// Partial update carried by an UPDATE outcome
    type Patch: Clone + Debug + PartialEq + Serialize + Send + Sync;

    /// Singular resource name, used in log lines and messages
    const RESOURCE: &'static str;

    fn id(&self) -> &str;

    /// Overwrite the fields present in `patch`, leave the rest alone
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Set the suspension flag. Returns false for entities without one.
    fn set_suspended(&mut self, _suspended: bool) -> bool {
        false
    }
}
