mod collection;
pub mod guard;

pub use collection::{FieldChange, TrackedCollection};
pub use guard::{GuardDecision, Transition, attempt_transition, resolve_unsaved_changes, save_tracked};

use crate::core::FieldValue;

/// Stable identity of a persisted record.
pub type RecordId = i64;

/// A record that can live in a [`TrackedCollection`].
///
/// `tracked_fields` projects the record to typed field values in a fixed
/// order; the change tracker diffs records purely through that projection.
/// Derived fields that are recomputed from others may be included (so a
/// derived change shows up in diffs) but associations must be projected by
/// their foreign-key identity, never by the referenced object.
pub trait Trackable: Clone + Send + Sync + 'static {
    /// Entity name used in not-found reports and event labels.
    const ENTITY: &'static str;

    fn record_id(&self) -> RecordId;

    /// Human-readable label for row-scoped messages.
    fn display_label(&self) -> String;

    fn tracked_fields(&self) -> Vec<(&'static str, FieldValue)>;
}

/// Pre-persistence validation of a record.
///
/// Returns one message per problem; an empty list means the record may be
/// persisted. Batch saves collect messages across rows and are all-or-nothing.
pub trait Validate {
    fn validate(&self) -> Vec<String>;
}
