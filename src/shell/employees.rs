use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::core::{AppError, Result, RowIssue};
use crate::model::Employee;
use crate::notify::{Confirmer, Notifier};
use crate::store::{DependentArticles, EmployeeFilter, PageRequest, RecordStore};
use crate::track::guard::{attempt_transition, save_tracked};
use crate::track::{FieldChange, RecordId, Trackable, TrackedCollection, Validate};

const CONTEXT: &str = "the employees page";

/// Grid state for the employees section: one paged, filtered, editable slice
/// of the employees table plus the orthogonal add mode.
pub struct EmployeesWorkspace<S> {
    store: S,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    tracked: TrackedCollection<Employee>,
    filter: EmployeeFilter,
    page: PageRequest,
    total: usize,
    new_rows: Vec<Employee>,
    adding: bool,
}

impl<S> EmployeesWorkspace<S>
where
    S: RecordStore<Employee, Filter = EmployeeFilter> + DependentArticles,
{
    pub fn new(
        store: S,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            notifier,
            confirmer,
            tracked: TrackedCollection::new(),
            filter: EmployeeFilter::default(),
            page: PageRequest::first(page_size),
            total: 0,
            new_rows: Vec::new(),
            adding: false,
        }
    }

    /// Load the current page, resetting every snapshot to the loaded data.
    pub async fn load(&mut self) -> Result<()> {
        match self.store.load_page(&self.filter, self.page).await {
            Ok(page) => {
                self.total = page.total;
                self.tracked.replace_all(page.items);
                Ok(())
            }
            Err(err) => {
                self.notifier.notify_error(&err.user_message());
                Err(err)
            }
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tracked.is_dirty()
    }

    /// The navigation guard for this grid; see [`attempt_transition`].
    pub async fn confirm_navigation(&mut self) -> bool {
        attempt_transition(
            &mut self.tracked,
            &self.store,
            self.confirmer.as_ref(),
            self.notifier.as_ref(),
            CONTEXT,
        )
        .await
        .proceeds()
    }

    /// Explicit save of pending grid edits.
    pub async fn save_changes(&mut self) -> Result<usize> {
        match save_tracked(&mut self.tracked, &self.store, self.notifier.as_ref()).await {
            Ok(0) => Ok(0),
            Ok(saved) => {
                self.notifier.notify_success("Changes saved");
                Ok(saved)
            }
            Err(err) => {
                if !err.is_not_found() {
                    self.notifier.notify_error(&err.user_message());
                }
                Err(err)
            }
        }
    }

    /// Drop pending grid edits, restoring every row from its snapshot.
    pub fn discard_changes(&mut self) -> usize {
        self.tracked.discard()
    }

    pub fn has_next_page(&self) -> bool {
        self.page.index * self.page.size < self.total
    }

    pub fn has_previous_page(&self) -> bool {
        self.page.index > 1
    }

    pub async fn next_page(&mut self) -> Result<bool> {
        if !self.has_next_page() {
            return Ok(false);
        }
        if !self.confirm_navigation().await {
            return Ok(false);
        }
        self.page = self.page.next();
        self.load().await?;
        Ok(true)
    }

    pub async fn previous_page(&mut self) -> Result<bool> {
        if !self.has_previous_page() {
            return Ok(false);
        }
        if !self.confirm_navigation().await {
            return Ok(false);
        }
        self.page = self.page.previous();
        self.load().await?;
        Ok(true)
    }

    /// Change the free-text filter. Guarded like paging: pending edits must be
    /// resolved first.
    pub async fn set_search(&mut self, search: impl Into<String>) -> Result<bool> {
        if !self.confirm_navigation().await {
            return Ok(false);
        }
        let search = search.into();
        self.filter.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self.page.index = 1;
        self.load().await?;
        Ok(true)
    }

    /// Change the page size. Guarded like paging.
    pub async fn set_page_size(&mut self, size: usize) -> Result<bool> {
        if size == 0 {
            return Err(AppError::Config("page size must be positive".into()));
        }
        if !self.confirm_navigation().await {
            return Ok(false);
        }
        self.page = PageRequest::first(size);
        self.load().await?;
        Ok(true)
    }

    /// Apply an edit to one displayed row.
    pub fn edit<F>(&mut self, id: RecordId, apply: F) -> Result<Vec<FieldChange>>
    where
        F: FnOnce(&mut Employee),
    {
        self.tracked.edit(id, apply)
    }

    // ---- add mode -------------------------------------------------------

    pub fn is_adding(&self) -> bool {
        self.adding
    }

    pub fn start_adding(&mut self) {
        self.new_rows.clear();
        self.adding = true;
    }

    pub fn add_row(&mut self) {
        let today = Utc::now().date_naive();
        self.new_rows.push(Employee::contract_template(today));
    }

    pub fn new_rows(&self) -> &[Employee] {
        &self.new_rows
    }

    pub fn new_row_mut(&mut self, index: usize) -> Option<&mut Employee> {
        self.new_rows.get_mut(index)
    }

    pub fn reset_adding(&mut self) {
        self.new_rows.clear();
    }

    pub fn exit_adding(&mut self) {
        self.new_rows.clear();
        self.adding = false;
    }

    /// Validate and insert the add-mode rows, all-or-nothing.
    pub async fn save_new_rows(&mut self) -> Result<usize> {
        if self.new_rows.is_empty() {
            let err = AppError::validation_of(
                "new rows",
                vec!["no data to save; add at least one employee".to_string()],
            );
            self.notifier.notify_error(&err.user_message());
            return Err(err);
        }

        let issues: Vec<RowIssue> = self
            .new_rows
            .iter()
            .enumerate()
            .flat_map(|(index, row)| {
                row.validate()
                    .into_iter()
                    .map(move |message| RowIssue::new(format!("row {}", index + 1), message))
            })
            .collect();
        if !issues.is_empty() {
            let err = AppError::Validation(issues);
            self.notifier.notify_error(&err.user_message());
            return Err(err);
        }

        let count = self.new_rows.len();
        match self.store.insert_new(self.new_rows.clone()).await {
            Ok(_) => {
                self.new_rows.clear();
                self.adding = false;
                self.notifier.notify_success("Data added successfully");
                self.load().await?;
                Ok(count)
            }
            Err(err) => {
                // rows stay in add mode so the user can fix and retry
                self.notifier.notify_error(&err.user_message());
                Err(err)
            }
        }
    }

    /// Delete one employee after confirmation; warns additionally when the
    /// delete will cascade to authored articles.
    pub async fn delete(&mut self, id: RecordId) -> Result<bool> {
        let Some(employee) = self.tracked.get(id).cloned() else {
            return Ok(false);
        };

        let confirmed = self
            .confirmer
            .confirm(
                "Delete employee",
                &format!("Delete employee {}?", employee.full_name()),
            )
            .await;
        if !confirmed {
            return Ok(false);
        }

        if self.store.employee_has_articles(id).await? {
            let cascade_confirmed = self
                .confirmer
                .confirm(
                    "Warning",
                    "This employee has articles that will be deleted as well. Continue?",
                )
                .await;
            if !cascade_confirmed {
                return Ok(false);
            }
        }

        match self.store.delete(id).await {
            Ok(()) => {
                self.notifier
                    .notify_success(&format!("Employee {} deleted", employee.full_name()));
                self.load().await?;
                Ok(true)
            }
            Err(AppError::NotFound { entity, id }) => {
                self.tracked.remove(id);
                self.notifier.notify_warn(&format!(
                    "{entity} {id} was already deleted in another session"
                ));
                self.load().await?;
                Ok(false)
            }
            Err(err) => {
                self.notifier.notify_error(&err.user_message());
                Err(err)
            }
        }
    }

    // ---- accessors ------------------------------------------------------

    pub fn records(&self) -> impl Iterator<Item = &Employee> {
        self.tracked.records()
    }

    pub fn tracked(&self) -> &TrackedCollection<Employee> {
        &self.tracked
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn search(&self) -> Option<&str> {
        self.filter.search.as_deref()
    }

    /// Tear down tracking state; called when the shell shuts down.
    pub fn cleanup(&mut self) {
        debug!(entity = Employee::ENTITY, "cleaning up workspace");
        self.tracked.clear();
        self.exit_adding();
    }
}
