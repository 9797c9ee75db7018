use tokio::sync::broadcast;
use tracing::debug;

use crate::core::{AppError, FieldValue, Result};
use crate::track::{RecordId, Trackable};

/// A single field transition on one record, published on the collection's
/// change stream so downstream consumers (dirty indicators, repaint logic)
/// can subscribe explicitly instead of relying on implicit binding.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub record_id: RecordId,
    pub field: &'static str,
    pub previous: FieldValue,
    pub current: FieldValue,
}

struct RowSlot<R> {
    current: R,
    /// Baseline for the dirty comparison. `None` marks a record that entered
    /// the collection without ever being persisted; such a row is always
    /// considered modified.
    snapshot: Option<R>,
}

impl<R: Trackable> RowSlot<R> {
    fn loaded(record: R) -> Self {
        let snapshot = Some(record.clone());
        Self {
            current: record,
            snapshot,
        }
    }

    fn unsnapshotted(record: R) -> Self {
        Self {
            current: record,
            snapshot: None,
        }
    }

    fn is_dirty(&self) -> bool {
        match &self.snapshot {
            None => true,
            Some(snapshot) => self.current.tracked_fields() != snapshot.tracked_fields(),
        }
    }
}

/// The current page's records plus their snapshots and dirty state.
///
/// Each record is paired with exactly one snapshot for as long as it is
/// tracked. The collection is `Clean` when every record is field-for-field
/// equal to its snapshot and no snapshot-less record is present; it is
/// `Dirty` otherwise. Dirtiness is always computed from the field projection,
/// never cached, so there is no flag to fall out of sync.
pub struct TrackedCollection<R: Trackable> {
    rows: Vec<RowSlot<R>>,
    events: broadcast::Sender<FieldChange>,
}

impl<R: Trackable> TrackedCollection<R> {
    const EVENT_CAPACITY: usize = 64;

    pub fn new() -> Self {
        let (events, _) = broadcast::channel(Self::EVENT_CAPACITY);
        Self {
            rows: Vec::new(),
            events,
        }
    }

    /// Subscribe to field-change events from edits and discards.
    pub fn subscribe(&self) -> broadcast::Receiver<FieldChange> {
        self.events.subscribe()
    }

    /// Replace the page contents; every incoming record gets a fresh snapshot.
    pub fn replace_all(&mut self, records: Vec<R>) {
        self.rows = records.into_iter().map(RowSlot::loaded).collect();
    }

    /// Replace the page contents but keep rows with pending edits as they are.
    ///
    /// Dirty rows that are absent from the incoming page leave the collection
    /// along with their pending edits.
    pub fn replace_preserving_dirty(&mut self, records: Vec<R>) {
        let mut kept: Vec<RowSlot<R>> = Vec::with_capacity(records.len());
        for record in records {
            let id = record.record_id();
            let existing = self
                .rows
                .iter()
                .position(|slot| slot.current.record_id() == id && slot.is_dirty());
            match existing {
                Some(index) => kept.push(self.rows.swap_remove(index)),
                None => kept.push(RowSlot::loaded(record)),
            }
        }
        self.rows = kept;
    }

    /// Add a record that has no persisted baseline yet. It is dirty until the
    /// next snapshot refresh.
    pub fn track_new(&mut self, record: R) {
        self.rows.push(RowSlot::unsnapshotted(record));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().map(|slot| &slot.current)
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.rows
            .iter()
            .find(|slot| slot.current.record_id() == id)
            .map(|slot| &slot.current)
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.rows
            .iter()
            .map(|slot| slot.current.record_id())
            .collect()
    }

    /// Apply an edit to one record and publish the resulting field changes.
    ///
    /// The changes are computed by diffing the tracked-field projection before
    /// and after the closure runs; an edit that leaves every field equal
    /// publishes nothing and cannot dirty the collection.
    pub fn edit<F>(&mut self, id: RecordId, apply: F) -> Result<Vec<FieldChange>>
    where
        F: FnOnce(&mut R),
    {
        let slot = self
            .rows
            .iter_mut()
            .find(|slot| slot.current.record_id() == id)
            .ok_or(AppError::NotFound {
                entity: R::ENTITY,
                id,
            })?;

        let before = slot.current.tracked_fields();
        apply(&mut slot.current);
        let after = slot.current.tracked_fields();

        let changes: Vec<FieldChange> = before
            .into_iter()
            .zip(after)
            .filter(|((_, previous), (_, current))| previous != current)
            .map(|((field, previous), (_, current))| FieldChange {
                record_id: id,
                field,
                previous,
                current,
            })
            .collect();

        for change in &changes {
            let _ = self.events.send(change.clone());
        }
        Ok(changes)
    }

    /// True iff at least one tracked field of any record differs from its
    /// snapshot, or a record without snapshot is present.
    pub fn is_dirty(&self) -> bool {
        self.rows.iter().any(RowSlot::is_dirty)
    }

    pub fn dirty_ids(&self) -> Vec<RecordId> {
        self.rows
            .iter()
            .filter(|slot| slot.is_dirty())
            .map(|slot| slot.current.record_id())
            .collect()
    }

    /// Clones of every record that differs from its snapshot (or has none).
    pub fn modified_records(&self) -> Vec<R> {
        self.rows
            .iter()
            .filter(|slot| slot.is_dirty())
            .map(|slot| slot.current.clone())
            .collect()
    }

    /// Field-level diff of one record against its snapshot. A record without
    /// snapshot reports every field as changed from `Null`.
    pub fn changes_for(&self, id: RecordId) -> Vec<FieldChange> {
        let Some(slot) = self
            .rows
            .iter()
            .find(|slot| slot.current.record_id() == id)
        else {
            return Vec::new();
        };

        let current = slot.current.tracked_fields();
        match &slot.snapshot {
            Some(snapshot) => snapshot
                .tracked_fields()
                .into_iter()
                .zip(current)
                .filter(|((_, previous), (_, now))| previous != now)
                .map(|((field, previous), (_, now))| FieldChange {
                    record_id: id,
                    field,
                    previous,
                    current: now,
                })
                .collect(),
            None => current
                .into_iter()
                .map(|(field, now)| FieldChange {
                    record_id: id,
                    field,
                    previous: FieldValue::Null,
                    current: now,
                })
                .collect(),
        }
    }

    /// Restore every record's fields from its snapshot and re-clone the
    /// snapshots to avoid aliasing. Records without a snapshot cannot be
    /// restored and leave the collection. Calling this on a clean collection
    /// is a no-op; returns the number of rows that were touched.
    pub fn discard(&mut self) -> usize {
        let mut touched = 0;

        self.rows.retain(|slot| slot.snapshot.is_some());

        for slot in &mut self.rows {
            let Some(snapshot) = slot.snapshot.clone() else {
                continue;
            };

            let before = slot.current.tracked_fields();
            let restored = snapshot.tracked_fields();
            if before != restored {
                touched += 1;
                let id = slot.current.record_id();
                for ((field, previous), (_, current)) in
                    before.into_iter().zip(restored).filter(|(a, b)| a.1 != b.1)
                {
                    let _ = self.events.send(FieldChange {
                        record_id: id,
                        field,
                        previous,
                        current,
                    });
                }
                slot.current = snapshot.clone();
            }
            slot.snapshot = Some(snapshot);
        }

        debug!(entity = R::ENTITY, touched, "discarded pending edits");
        touched
    }

    /// Re-baseline every tracked record on its current values. Invoked after
    /// a successful save; covers all rows, not only the persisted ones, since
    /// the save may be followed immediately by further edits.
    pub fn refresh_snapshots(&mut self) {
        for slot in &mut self.rows {
            slot.snapshot = Some(slot.current.clone());
        }
    }

    /// Drop one record and its snapshot from tracking.
    pub fn remove(&mut self, id: RecordId) -> Option<R> {
        let index = self
            .rows
            .iter()
            .position(|slot| slot.current.record_id() == id)?;
        Some(self.rows.remove(index).current)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

impl<R: Trackable> Default for TrackedCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}
