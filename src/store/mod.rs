mod memory;
pub(crate) use memory::atomic_write;
mod page;

pub use memory::MemoryStore;
pub use page::{Page, PageRequest};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::Result;
use crate::model::{Article, Employee};
use crate::track::{RecordId, Trackable};

/// Free-text filter over the employee grid: case-insensitive match across
/// full name, pen name and contract number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub search: Option<String>,
}

impl EmployeeFilter {
    pub fn matching(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
        }
    }

    pub fn accepts(&self, employee: &Employee) -> bool {
        let Some(needle) = self.search.as_deref() else {
            return true;
        };
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        employee.full_name().to_lowercase().contains(&needle)
            || employee
                .pen_name
                .as_deref()
                .is_some_and(|nick| nick.to_lowercase().contains(&needle))
            || employee.contract_number.to_string().contains(&needle)
    }
}

/// Release-date window over the article grid: one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleFilter {
    pub year: i32,
    pub month: u32,
}

impl ArticleFilter {
    /// Half-open date range `[first day, first day of the next month)`.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let end = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        Some((start, end))
    }

    pub fn accepts(&self, article: &Article) -> bool {
        match self.range() {
            Some((start, end)) => article.release_date >= start && article.release_date < end,
            None => false,
        }
    }
}

/// Persistence collaborator for one record type.
///
/// A session/connection is acquired per call and released before returning;
/// no call spans user think-time. Deleting a record cascades to dependent
/// records inside the collaborator, never in the calling workspace.
#[async_trait]
pub trait RecordStore<R: Trackable>: Send + Sync {
    type Filter: Send + Sync + Clone;

    /// Stable-ordered page of records matching the filter, with the total
    /// match count for `has_next`/`has_previous`.
    async fn load_page(&self, filter: &Self::Filter, page: PageRequest) -> Result<Page<R>>;

    /// Persist already-existing records that were modified in a grid.
    /// Fails with `AppError::NotFound` when one of them vanished from the
    /// store (deleted by another session); nothing else is written in that
    /// case.
    async fn save_modified(&self, records: &[R]) -> Result<usize>;

    /// Insert brand-new records, assigning identities. Returns the records
    /// as persisted.
    async fn insert_new(&self, records: Vec<R>) -> Result<Vec<R>>;

    async fn delete(&self, id: RecordId) -> Result<()>;
}

/// Extra lookup used by the employee grid's delete flow: whether articles
/// reference an employee (the cascade itself is owned by the store).
#[async_trait]
pub trait DependentArticles: Send + Sync {
    async fn employee_has_articles(&self, employee_id: RecordId) -> Result<bool>;
}

/// Full employee list for selection/display in the articles grid.
#[async_trait]
pub trait EmployeeLookup: Send + Sync {
    async fn employees_all(&self) -> Result<Vec<Employee>>;
}

/// Unpaged article access for report generation. `None` bounds mean
/// "from the beginning" / "until the end".
#[async_trait]
pub trait ArticleReportSource: Send + Sync {
    async fn articles_between(
        &self,
        from: Option<NaiveDate>,
        to_exclusive: Option<NaiveDate>,
    ) -> Result<Vec<Article>>;
}
