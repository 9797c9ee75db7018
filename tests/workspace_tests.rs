mod common;

use std::sync::Arc;

use common::{FlakyStore, RecordingNotifier, ScriptedConfirm, article, date, seeded_store};
use masthead::{
    Article, ArticleFilter, ArticlesWorkspace, Employee, EmployeesWorkspace, Money, RecordStore,
};

const MAY: ArticleFilter = ArticleFilter {
    year: 2026,
    month: 5,
};

async fn articles_workspace(
    page_size: usize,
    answers: &[bool],
) -> (
    ArticlesWorkspace<masthead::MemoryStore>,
    Arc<RecordingNotifier>,
    Arc<ScriptedConfirm>,
) {
    let (store, _, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(answers));
    let mut workspace = ArticlesWorkspace::new(
        store,
        notifier.clone(),
        confirmer.clone(),
        page_size,
        MAY,
    );
    workspace.load().await.unwrap();
    (workspace, notifier, confirmer)
}

// Scenario A: edit -> derived recalculation -> guard -> discard -> revert,
// page advances.
#[tokio::test]
async fn discard_on_page_change_reverts_the_edit_and_advances() {
    // page size 1: "First piece" (amount 100, bonus none) is page 1 of 2
    let (mut workspace, _, confirmer) = articles_workspace(1, &[false, true]).await;

    let first_id = workspace.records().next().unwrap().id;
    assert_eq!(workspace.records().next().unwrap().total, Money::from_major(100));

    workspace
        .edit(first_id, |article| article.amount = Money::from_major(150))
        .unwrap();
    let edited = workspace.tracked().get(first_id).unwrap().clone();
    assert_eq!(edited.total, Money::from_major(150));
    assert!(workspace.has_unsaved_changes());

    // guard fires: decline save, accept discard
    assert!(workspace.next_page().await.unwrap());
    assert_eq!(
        confirmer.questions(),
        vec!["Unsaved changes".to_string(), "Discard changes".to_string()]
    );
    assert_eq!(workspace.page().index, 2);
    assert_eq!(workspace.records().next().unwrap().title, "Second piece");

    // going back shows the untouched record
    assert!(workspace.previous_page().await.unwrap());
    let first = workspace.tracked().get(first_id).unwrap();
    assert_eq!(first.amount, Money::from_major(100));
    assert_eq!(first.total, Money::from_major(100));
    assert!(!workspace.has_unsaved_changes());
}

#[tokio::test]
async fn cancelling_the_guard_stays_on_the_page() {
    let (mut workspace, _, _) = articles_workspace(1, &[false, false]).await;
    let id = workspace.records().next().unwrap().id;
    workspace
        .edit(id, |article| article.amount = Money::from_major(1))
        .unwrap();

    assert!(!workspace.next_page().await.unwrap());
    assert_eq!(workspace.page().index, 1);
    assert!(workspace.has_unsaved_changes());
}

#[tokio::test]
async fn saving_through_the_guard_persists_and_advances() {
    let (mut workspace, notifier, _) = articles_workspace(1, &[true]).await;
    let id = workspace.records().next().unwrap().id;
    workspace
        .edit(id, |article| article.bonus_percent = Some(50))
        .unwrap();

    assert!(workspace.next_page().await.unwrap());
    assert!(notifier.count("success") >= 1);

    // save-then-reload: the persisted record matches the edited one
    assert!(workspace.previous_page().await.unwrap());
    let reloaded = workspace.tracked().get(id).unwrap();
    assert_eq!(reloaded.bonus_percent, Some(50));
    assert_eq!(reloaded.total, Money::from_major(150));
    assert!(!workspace.has_unsaved_changes());
}

#[tokio::test]
async fn period_change_is_guarded_and_resets_to_page_one() {
    let (mut workspace, _, _) = articles_workspace(1, &[false, true]).await;
    workspace.next_page().await.unwrap();
    assert_eq!(workspace.page().index, 2);

    let id = workspace.records().next().unwrap().id;
    workspace
        .edit(id, |article| article.amount = Money::from_major(7))
        .unwrap();

    // guard: decline save, accept discard; then the window moves
    assert!(workspace.set_period(2026, 6).await.unwrap());
    assert_eq!(workspace.page().index, 1);
    assert_eq!(workspace.total(), 0);
}

// Persistence failure during the save path leaves the collection dirty and
// blocks the transition.
#[tokio::test]
async fn save_failure_keeps_the_page_and_the_dirty_state() {
    let (store, employees, _) = seeded_store().await;
    let flaky = FlakyStore::new(store);
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[true, true]));
    let mut workspace =
        EmployeesWorkspace::new(flaky.clone(), notifier.clone(), confirmer, 2);
    workspace.load().await.unwrap();

    let id = employees[0].id;
    workspace
        .edit(id, |e| e.surname = "Renamed".to_string())
        .unwrap();

    flaky.fail_saves(true);
    assert!(!workspace.next_page().await.unwrap());
    assert_eq!(workspace.page().index, 1);
    assert!(workspace.has_unsaved_changes());
    assert!(notifier.contains("error", "connection lost"));

    // the same edit saves once the store recovers
    flaky.fail_saves(false);
    assert!(workspace.next_page().await.unwrap());
    assert!(!workspace.has_unsaved_changes());
}

// Scenario B: add mode with zero rows refuses to save and never reaches the
// store.
#[tokio::test]
async fn saving_zero_new_rows_is_a_validation_error() {
    let (store, _, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[]));
    let mut workspace =
        EmployeesWorkspace::new(store.clone(), notifier.clone(), confirmer, 15);
    workspace.load().await.unwrap();

    workspace.start_adding();
    let err = workspace.save_new_rows().await.unwrap_err();
    assert!(err.user_message().contains("no data to save"));
    assert!(notifier.contains("error", "no data to save"));

    let (employee_count, _) = store.counts().await;
    assert_eq!(employee_count, 3);
    assert!(workspace.is_adding());
}

// Scenario C: batch validation is all-or-nothing with row-scoped messages.
#[tokio::test]
async fn batch_save_with_one_invalid_row_persists_nothing() {
    let (store, employees, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[]));
    let mut workspace =
        EmployeesWorkspace::new(store.clone(), notifier.clone(), confirmer, 15);
    workspace.load().await.unwrap();

    // two rows edited; the second clears a required field
    workspace
        .edit(employees[0].id, |e| e.contract_number = 555)
        .unwrap();
    workspace
        .edit(employees[1].id, |e| e.surname = String::new())
        .unwrap();

    let err = workspace.save_changes().await.unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert!(err.issues()[0].message.contains("surname is required"));

    // nothing was persisted, including the valid row
    let reloaded = masthead::EmployeeLookup::employees_all(&store).await.unwrap();
    let valid = reloaded.iter().find(|e| e.id == employees[0].id).unwrap();
    assert_eq!(valid.contract_number, employees[0].contract_number);
    assert!(workspace.has_unsaved_changes());
}

// Scenario D: a record deleted by another session surfaces not-found, is
// removed locally, and the save path survives.
#[tokio::test]
async fn concurrent_delete_reconciles_the_local_collection() {
    let (store, employees, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[]));
    let mut workspace =
        EmployeesWorkspace::new(store.clone(), notifier.clone(), confirmer, 15);
    workspace.load().await.unwrap();

    let victim = employees[0].id;
    workspace
        .edit(victim, |e| e.surname = "Edited".to_string())
        .unwrap();

    // another session deletes the record out from under the grid
    RecordStore::<Employee>::delete(&store, victim).await.unwrap();

    let err = workspace.save_changes().await.unwrap_err();
    assert!(err.is_not_found());
    assert!(workspace.tracked().get(victim).is_none());
    assert!(notifier.contains("warning", "deleted in another session"));
    assert!(!workspace.has_unsaved_changes());
}

#[tokio::test]
async fn add_mode_edits_do_not_dirty_the_tracked_page() {
    let (store, _, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[]));
    let mut workspace = EmployeesWorkspace::new(store, notifier, confirmer, 15);
    workspace.load().await.unwrap();

    workspace.start_adding();
    workspace.add_row();
    workspace.new_row_mut(0).unwrap().surname = "Draft".to_string();

    assert!(workspace.is_adding());
    assert!(!workspace.has_unsaved_changes());
}

#[tokio::test]
async fn add_mode_saves_valid_rows_and_reloads() {
    let (store, _, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[]));
    let mut workspace =
        EmployeesWorkspace::new(store.clone(), notifier.clone(), confirmer, 15);
    workspace.load().await.unwrap();

    workspace.start_adding();
    workspace.add_row();
    {
        let row = workspace.new_row_mut(0).unwrap();
        row.surname = "Adams".to_string();
        row.given_name = "Nora".to_string();
        row.patronymic = "Lee".to_string();
        row.contract_number = 77;
    }

    let saved = workspace.save_new_rows().await.unwrap();
    assert_eq!(saved, 1);
    assert!(!workspace.is_adding());
    assert!(notifier.contains("success", "added"));

    let (employee_count, _) = store.counts().await;
    assert_eq!(employee_count, 4);
    assert!(workspace.records().any(|e| e.surname == "Adams"));
}

#[tokio::test]
async fn delete_asks_twice_when_articles_would_cascade() {
    let (store, employees, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    // yes to the delete, yes to the cascade warning
    let confirmer = Arc::new(ScriptedConfirm::new(&[true, true]));
    let mut workspace =
        EmployeesWorkspace::new(store.clone(), notifier.clone(), confirmer.clone(), 15);
    workspace.load().await.unwrap();

    let author = employees[0].id; // owns both seeded articles
    assert!(workspace.delete(author).await.unwrap());
    assert_eq!(
        confirmer.questions(),
        vec!["Delete employee".to_string(), "Warning".to_string()]
    );

    let (employee_count, article_count) = store.counts().await;
    assert_eq!(employee_count, 2);
    assert_eq!(article_count, 0);
}

#[tokio::test]
async fn declining_the_cascade_warning_keeps_everything() {
    let (store, employees, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[true, false]));
    let mut workspace =
        EmployeesWorkspace::new(store.clone(), notifier, confirmer, 15);
    workspace.load().await.unwrap();

    assert!(!workspace.delete(employees[0].id).await.unwrap());
    let (employee_count, article_count) = store.counts().await;
    assert_eq!(employee_count, 3);
    assert_eq!(article_count, 2);
}

#[tokio::test]
async fn article_rows_validate_the_selected_employee() {
    let (store, _, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[]));
    let mut workspace =
        ArticlesWorkspace::new(store.clone(), notifier, confirmer, 10, MAY);
    workspace.load().await.unwrap();

    workspace.start_adding();
    workspace.add_row();
    {
        let row = workspace.new_row_mut(0).unwrap();
        row.title = "Orphan piece".to_string();
        row.employee_id = 999;
        row.amount = Money::from_major(10);
    }

    let err = workspace.save_new_rows().await.unwrap_err();
    assert!(
        err.issues()
            .iter()
            .any(|issue| issue.message.contains("does not exist"))
    );
    let (_, article_count) = store.counts().await;
    assert_eq!(article_count, 2);
}

#[tokio::test]
async fn loading_never_reports_phantom_dirt_from_recalculation() {
    let (store, employees, _) = seeded_store().await;
    // store an article whose persisted total lags its inputs
    let mut stale = article("Stale totals", employees[1].id, 60, date(2026, 5, 9));
    stale.bonus_percent = Some(50);
    stale.total = Money::from_major(60); // out of date on purpose
    RecordStore::<Article>::insert_new(&store, vec![stale])
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[]));
    let mut workspace = ArticlesWorkspace::new(store, notifier, confirmer, 10, MAY);
    workspace.load().await.unwrap();

    let loaded = workspace
        .records()
        .find(|article| article.title == "Stale totals")
        .unwrap();
    assert_eq!(loaded.total, Money::from_major(90));
    assert!(!workspace.has_unsaved_changes());
}

#[tokio::test]
async fn search_change_is_guarded() {
    let (store, employees, _) = seeded_store().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let confirmer = Arc::new(ScriptedConfirm::new(&[false, false]));
    let mut workspace =
        EmployeesWorkspace::new(store, notifier, confirmer.clone(), 15);
    workspace.load().await.unwrap();

    workspace
        .edit(employees[0].id, |e| e.pen_name = Some("ghost".to_string()))
        .unwrap();

    // cancelled guard leaves the filter untouched
    assert!(!workspace.set_search("Brown").await.unwrap());
    assert_eq!(workspace.search(), None);
    assert!(workspace.has_unsaved_changes());
    assert_eq!(confirmer.questions().len(), 2);
}
