mod common;

use common::{date, employee};
use masthead::{FieldValue, TrackedCollection};

fn loaded_pair() -> TrackedCollection<masthead::Employee> {
    let mut first = employee("Smith", "John", 1);
    first.id = 1;
    let mut second = employee("Brown", "Anna", 2);
    second.id = 2;

    let mut tracked = TrackedCollection::new();
    tracked.replace_all(vec![first, second]);
    tracked
}

#[test]
fn freshly_loaded_collection_is_clean() {
    let tracked = loaded_pair();
    assert!(!tracked.is_dirty());
    assert!(tracked.dirty_ids().is_empty());
    assert!(tracked.modified_records().is_empty());
}

#[test]
fn dirty_iff_a_tracked_field_differs_from_the_snapshot() {
    let mut tracked = loaded_pair();

    tracked.edit(1, |e| e.surname = "Smythe".to_string()).unwrap();
    assert!(tracked.is_dirty());
    assert_eq!(tracked.dirty_ids(), vec![1]);

    // editing the value back restores cleanliness: comparison is by value,
    // not by "was touched"
    tracked.edit(1, |e| e.surname = "Smith".to_string()).unwrap();
    assert!(!tracked.is_dirty());
}

#[test]
fn record_without_snapshot_is_always_dirty() {
    let mut tracked = loaded_pair();
    let mut extra = employee("Taylor", "Mark", 3);
    extra.id = 7;
    tracked.track_new(extra);

    assert!(tracked.is_dirty());
    assert_eq!(tracked.dirty_ids(), vec![7]);

    // the diff routine must not crash on the missing snapshot: every field
    // reports as changed from Null
    let changes = tracked.changes_for(7);
    assert!(!changes.is_empty());
    assert!(changes.iter().all(|c| c.previous == FieldValue::Null));
}

#[test]
fn edit_publishes_field_changes() {
    let mut tracked = loaded_pair();
    let mut events = tracked.subscribe();

    let changes = tracked
        .edit(1, |e| {
            e.surname = "Smythe".to_string();
            e.contract_number = 99;
        })
        .unwrap();

    assert_eq!(changes.len(), 2);
    let first = events.try_recv().unwrap();
    assert_eq!(first.record_id, 1);
    assert_eq!(first.field, "surname");
    assert_eq!(first.previous, FieldValue::from("Smith"));
    assert_eq!(first.current, FieldValue::from("Smythe"));
    let second = events.try_recv().unwrap();
    assert_eq!(second.field, "contract_number");
    assert!(events.try_recv().is_err());
}

#[test]
fn noop_edit_publishes_nothing() {
    let mut tracked = loaded_pair();
    let mut events = tracked.subscribe();

    let changes = tracked.edit(1, |_| {}).unwrap();
    assert!(changes.is_empty());
    assert!(events.try_recv().is_err());
    assert!(!tracked.is_dirty());
}

#[test]
fn discard_restores_from_snapshots_and_emits_repaint_events() {
    let mut tracked = loaded_pair();
    tracked.edit(2, |e| e.given_name = "Annette".to_string()).unwrap();
    let mut events = tracked.subscribe();

    let touched = tracked.discard();
    assert_eq!(touched, 1);
    assert!(!tracked.is_dirty());
    assert_eq!(tracked.get(2).unwrap().given_name, "Anna");

    let event = events.try_recv().unwrap();
    assert_eq!(event.field, "given_name");
    assert_eq!(event.previous, FieldValue::from("Annette"));
    assert_eq!(event.current, FieldValue::from("Anna"));
}

#[test]
fn discard_twice_is_the_same_as_discard_once() {
    let mut tracked = loaded_pair();
    tracked.edit(1, |e| e.surname = "Smythe".to_string()).unwrap();

    assert_eq!(tracked.discard(), 1);
    let after_first: Vec<_> = tracked.records().cloned().collect();

    assert_eq!(tracked.discard(), 0);
    let after_second: Vec<_> = tracked.records().cloned().collect();
    assert_eq!(after_first, after_second);
    assert!(!tracked.is_dirty());
}

#[test]
fn discard_drops_records_that_never_had_a_snapshot() {
    let mut tracked = loaded_pair();
    let mut extra = employee("Taylor", "Mark", 3);
    extra.id = 7;
    tracked.track_new(extra);

    tracked.discard();
    assert!(tracked.get(7).is_none());
    assert_eq!(tracked.len(), 2);
    assert!(!tracked.is_dirty());
}

#[test]
fn refresh_covers_every_row_not_only_the_edited_ones() {
    let mut tracked = loaded_pair();
    tracked.edit(1, |e| e.surname = "Smythe".to_string()).unwrap();

    tracked.refresh_snapshots();
    assert!(!tracked.is_dirty());

    // the new baseline is the refreshed value, so discarding later edits
    // falls back to it
    tracked.edit(1, |e| e.surname = "Smithson".to_string()).unwrap();
    tracked.discard();
    assert_eq!(tracked.get(1).unwrap().surname, "Smythe");
}

#[test]
fn replace_all_resets_snapshots() {
    let mut tracked = loaded_pair();
    tracked.edit(1, |e| e.surname = "Smythe".to_string()).unwrap();

    let mut replacement = employee("Wilson", "Kate", 4);
    replacement.id = 1;
    tracked.replace_all(vec![replacement]);

    assert!(!tracked.is_dirty());
    assert_eq!(tracked.get(1).unwrap().surname, "Wilson");
}

#[test]
fn replace_preserving_dirty_keeps_pending_edits() {
    let mut tracked = loaded_pair();
    tracked.edit(1, |e| e.surname = "Smythe".to_string()).unwrap();

    let mut reloaded_first = employee("Smith", "John", 1);
    reloaded_first.id = 1;
    let mut reloaded_second = employee("Brown", "Anna", 2);
    reloaded_second.id = 2;
    tracked.replace_preserving_dirty(vec![reloaded_first, reloaded_second]);

    assert!(tracked.is_dirty());
    assert_eq!(tracked.get(1).unwrap().surname, "Smythe");
    assert_eq!(tracked.get(2).unwrap().surname, "Brown");
}

#[test]
fn changes_for_reports_the_field_level_diff() {
    let mut tracked = loaded_pair();
    tracked
        .edit(1, |e| e.contract_end = date(2028, 6, 30))
        .unwrap();

    let changes = tracked.changes_for(1);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].field, "contract_end");
    assert_eq!(changes[0].current, FieldValue::from(date(2028, 6, 30)));

    assert!(tracked.changes_for(2).is_empty());
    assert!(tracked.changes_for(404).is_empty());
}

#[test]
fn remove_tears_down_tracking_for_the_row() {
    let mut tracked = loaded_pair();
    tracked.edit(1, |e| e.surname = "Smythe".to_string()).unwrap();

    let removed = tracked.remove(1).unwrap();
    assert_eq!(removed.surname, "Smythe");
    assert!(!tracked.is_dirty());
    assert_eq!(tracked.len(), 1);
}
