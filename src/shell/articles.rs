use std::sync::Arc;

use tracing::debug;

use crate::core::{AppError, Result, RowIssue};
use crate::model::{Article, Employee};
use crate::notify::{Confirmer, Notifier};
use crate::store::{ArticleFilter, EmployeeLookup, PageRequest, RecordStore};
use crate::track::guard::{attempt_transition, save_tracked};
use crate::track::{FieldChange, RecordId, Trackable, TrackedCollection, Validate};

const CONTEXT: &str = "the articles page";

/// Grid state for the articles section: one month of articles, paged and
/// editable, plus the employee lookup used for display and row validation.
pub struct ArticlesWorkspace<S> {
    store: S,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    tracked: TrackedCollection<Article>,
    filter: ArticleFilter,
    page: PageRequest,
    total: usize,
    employees: Vec<Employee>,
    new_rows: Vec<Article>,
    adding: bool,
}

impl<S> ArticlesWorkspace<S>
where
    S: RecordStore<Article, Filter = ArticleFilter> + EmployeeLookup,
{
    pub fn new(
        store: S,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        page_size: usize,
        period: ArticleFilter,
    ) -> Self {
        Self {
            store,
            notifier,
            confirmer,
            tracked: TrackedCollection::new(),
            filter: period,
            page: PageRequest::first(page_size),
            total: 0,
            employees: Vec::new(),
            new_rows: Vec::new(),
            adding: false,
        }
    }

    /// Load the current page and the employee lookup.
    ///
    /// Derived totals are recomputed before the rows enter tracking, so a
    /// stored total that merely lags its inputs does not surface as a
    /// pending edit.
    pub async fn load(&mut self) -> Result<()> {
        let page = match self.store.load_page(&self.filter, self.page).await {
            Ok(page) => page,
            Err(err) => {
                self.notifier.notify_error(&err.user_message());
                return Err(err);
            }
        };

        self.employees = self.store.employees_all().await?;

        let mut items = page.items;
        for article in &mut items {
            article.recalc_total();
        }
        self.total = page.total;
        self.tracked.replace_all(items);
        Ok(())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tracked.is_dirty()
    }

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

    pub fn discard_changes(&mut self) -> usize {
        self.tracked.discard()
    }

    pub fn period(&self) -> ArticleFilter {
        self.filter
    }

    /// Switch the month/year window. Guarded like paging; resets to page 1.
    pub async fn set_period(&mut self, year: i32, month: u32) -> Result<bool> {
        let next = ArticleFilter { year, month };
        if next.range().is_none() {
            return Err(AppError::Config(format!("invalid period {year}-{month}")));
        }
        if !self.confirm_navigation().await {
            return Ok(false);
        }
        self.filter = next;
        self.page.index = 1;
        self.load().await?;
        Ok(true)
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

    /// Apply an edit to one displayed row; the derived total is recomputed
    /// as part of the same edit.
    pub fn edit<F>(&mut self, id: RecordId, apply: F) -> Result<Vec<FieldChange>>
    where
        F: FnOnce(&mut Article),
    {
        self.tracked.edit(id, |article| {
            apply(article);
            article.recalc_total();
        })
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
        // default the draft into the visible month
        let release_date = self
            .filter
            .range()
            .map(|(start, _)| start)
            .unwrap_or_default();
        self.new_rows.push(Article::draft(release_date));
    }

    pub fn new_rows(&self) -> &[Article] {
        &self.new_rows
    }

    pub fn new_row_mut(&mut self, index: usize) -> Option<&mut Article> {
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
                vec!["no data to save; add at least one article".to_string()],
            );
            self.notifier.notify_error(&err.user_message());
            return Err(err);
        }

        let mut issues: Vec<RowIssue> = Vec::new();
        for (index, row) in self.new_rows.iter().enumerate() {
            let label = format!("row {}", index + 1);
            for message in row.validate() {
                issues.push(RowIssue::new(label.clone(), message));
            }
            if row.employee_id > 0
                && !self
                    .employees
                    .iter()
                    .any(|employee| employee.id == row.employee_id)
            {
                issues.push(RowIssue::new(
                    label.clone(),
                    "the selected employee does not exist".to_string(),
                ));
            }
        }
        if !issues.is_empty() {
            let err = AppError::Validation(issues);
            self.notifier.notify_error(&err.user_message());
            return Err(err);
        }

        let mut rows = self.new_rows.clone();
        for row in &mut rows {
            row.recalc_total();
        }
        let count = rows.len();
        match self.store.insert_new(rows).await {
            Ok(_) => {
                self.new_rows.clear();
                self.adding = false;
                self.notifier.notify_success("Data added successfully");
                self.load().await?;
                Ok(count)
            }
            Err(err) => {
                self.notifier.notify_error(&err.user_message());
                Err(err)
            }
        }
    }

    pub async fn delete(&mut self, id: RecordId) -> Result<bool> {
        let Some(article) = self.tracked.get(id).cloned() else {
            return Ok(false);
        };

        let confirmed = self
            .confirmer
            .confirm(
                "Delete article",
                &format!("Delete article '{}'?", article.display_label()),
            )
            .await;
        if !confirmed {
            return Ok(false);
        }

        match self.store.delete(id).await {
            Ok(()) => {
                self.notifier
                    .notify_success(&format!("Article '{}' deleted", article.display_label()));
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

    pub fn records(&self) -> impl Iterator<Item = &Article> {
        self.tracked.records()
    }

    pub fn tracked(&self) -> &TrackedCollection<Article> {
        &self.tracked
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn employee_name(&self, id: RecordId) -> Option<String> {
        self.employees
            .iter()
            .find(|employee| employee.id == id)
            .map(Employee::full_name)
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn cleanup(&mut self) {
        debug!(entity = Article::ENTITY, "cleaning up workspace");
        self.tracked.clear();
        self.exit_adding();
    }
}
