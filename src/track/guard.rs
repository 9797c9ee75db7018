use tracing::debug;

use crate::core::{AppError, Result, RowIssue};
use crate::notify::{Confirmer, Notifier};
use crate::store::RecordStore;
use crate::track::{Trackable, TrackedCollection, Validate};

/// Outcome of the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    SaveThenProceed,
    DiscardThenProceed,
    Cancel,
}

/// Whether a guarded operation may go ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Proceed,
    Stay,
}

impl Transition {
    pub fn proceeds(self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Ask the user what to do with pending edits. The confirmation collaborator
/// only answers yes/no questions, so the three-way intent is resolved with at
/// most two prompts; declining both means cancel.
pub async fn resolve_unsaved_changes(confirmer: &dyn Confirmer, context: &str) -> GuardDecision {
    if confirmer
        .confirm(
            "Unsaved changes",
            &format!("Save the changes to {context} before leaving?"),
        )
        .await
    {
        return GuardDecision::SaveThenProceed;
    }
    if confirmer
        .confirm(
            "Discard changes",
            &format!("Discard the unsaved changes to {context}?"),
        )
        .await
    {
        return GuardDecision::DiscardThenProceed;
    }
    GuardDecision::Cancel
}

/// Validate and persist the modified records of a tracked collection.
///
/// Batch validation is all-or-nothing: any row problem aborts before the
/// store is touched. On success every snapshot is refreshed. A not-found
/// from the store (record deleted in another session) removes the vanished
/// row from tracking, surfaces a distinct notification and propagates the
/// error; remaining edits stay pending.
pub async fn save_tracked<R, S>(
    tracked: &mut TrackedCollection<R>,
    store: &S,
    notifier: &dyn Notifier,
) -> Result<usize>
where
    R: Trackable + Validate,
    S: RecordStore<R> + ?Sized,
{
    let modified = tracked.modified_records();
    if modified.is_empty() {
        return Ok(0);
    }

    let issues: Vec<RowIssue> = modified
        .iter()
        .flat_map(|record| {
            let row = record.display_label();
            record
                .validate()
                .into_iter()
                .map(move |message| RowIssue::new(row.clone(), message))
        })
        .collect();
    if !issues.is_empty() {
        return Err(AppError::Validation(issues));
    }

    match store.save_modified(&modified).await {
        Ok(saved) => {
            tracked.refresh_snapshots();
            debug!(entity = R::ENTITY, saved, "persisted modified records");
            Ok(saved)
        }
        Err(AppError::NotFound { entity, id }) => {
            tracked.remove(id);
            notifier.notify_warn(&format!(
                "{entity} {id} was deleted in another session; the row has been removed"
            ));
            Err(AppError::NotFound { entity, id })
        }
        Err(err) => Err(err),
    }
}

/// The navigation guard: invoked before paging, filter changes, section
/// switches and application close.
///
/// A clean collection proceeds immediately. A dirty one prompts for the
/// three-way intent: save-then-proceed (persistence failure keeps the
/// collection dirty and stays), discard-then-proceed, or cancel.
pub async fn attempt_transition<R, S>(
    tracked: &mut TrackedCollection<R>,
    store: &S,
    confirmer: &dyn Confirmer,
    notifier: &dyn Notifier,
    context: &str,
) -> Transition
where
    R: Trackable + Validate,
    S: RecordStore<R> + ?Sized,
{
    if !tracked.is_dirty() {
        return Transition::Proceed;
    }

    match resolve_unsaved_changes(confirmer, context).await {
        GuardDecision::SaveThenProceed => match save_tracked(tracked, store, notifier).await {
            Ok(saved) => {
                notifier.notify_success(&format!("Saved {saved} record(s)"));
                Transition::Proceed
            }
            Err(err) => {
                notifier.notify_error(&err.user_message());
                Transition::Stay
            }
        },
        GuardDecision::DiscardThenProceed => {
            tracked.discard();
            Transition::Proceed
        }
        GuardDecision::Cancel => Transition::Stay,
    }
}
