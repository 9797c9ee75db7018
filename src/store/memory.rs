use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::{AppError, Result};
use crate::model::{Article, Employee};
use crate::store::{
    ArticleFilter, ArticleReportSource, DependentArticles, EmployeeFilter, EmployeeLookup, Page,
    PageRequest, RecordStore,
};
use crate::track::{RecordId, Trackable};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Tables {
    employees: BTreeMap<RecordId, Employee>,
    articles: BTreeMap<RecordId, Article>,
    next_employee_id: RecordId,
    next_article_id: RecordId,
}

/// On-disk form of the full dataset.
#[derive(Debug, Serialize, Deserialize)]
struct DatasetSnapshot {
    version: u32,
    employees: Vec<Employee>,
    articles: Vec<Article>,
    next_employee_id: RecordId,
    next_article_id: RecordId,
}

const SNAPSHOT_VERSION: u32 = 1;

/// In-memory persistence collaborator backing both grids.
///
/// Owns the employees and articles tables, assigns identities, and cascades
/// employee deletes to their articles. Each operation locks the tables for
/// its own duration only. The whole dataset can be loaded from and written to
/// a JSON snapshot file.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load_snapshot(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).await.map_err(|err| {
            AppError::IoError(format!("failed to read '{}': {}", path.display(), err))
        })?;
        let snapshot: DatasetSnapshot = serde_json::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(AppError::Persistence(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let tables = Tables {
            employees: snapshot
                .employees
                .into_iter()
                .map(|employee| (employee.id, employee))
                .collect(),
            articles: snapshot
                .articles
                .into_iter()
                .map(|article| (article.id, article))
                .collect(),
            next_employee_id: snapshot.next_employee_id,
            next_article_id: snapshot.next_article_id,
        };

        Ok(Self {
            tables: Arc::new(Mutex::new(tables)),
        })
    }

    pub async fn save_snapshot(&self, path: &Path) -> Result<()> {
        let bytes = {
            let tables = self.tables.lock().await;
            let snapshot = DatasetSnapshot {
                version: SNAPSHOT_VERSION,
                employees: tables.employees.values().cloned().collect(),
                articles: tables.articles.values().cloned().collect(),
                next_employee_id: tables.next_employee_id,
                next_article_id: tables.next_article_id,
            };
            serde_json::to_vec_pretty(&snapshot)?
        };
        atomic_write(path, &bytes).await
    }

    pub async fn counts(&self) -> (usize, usize) {
        let tables = self.tables.lock().await;
        (tables.employees.len(), tables.articles.len())
    }
}

/// Temp-file-then-rename write so a crashed export never leaves a torn file.
pub(crate) async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await.map_err(|err| {
            AppError::IoError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                err
            ))
        })?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await.map_err(|err| {
        AppError::IoError(format!("failed to write '{}': {}", tmp.display(), err))
    })?;
    fs::rename(&tmp, path).await.map_err(|err| {
        AppError::IoError(format!(
            "failed to rename '{}' -> '{}': {}",
            tmp.display(),
            path.display(),
            err
        ))
    })?;
    Ok(())
}

fn slice_page<T: Clone>(ordered: Vec<T>, request: PageRequest) -> Page<T> {
    let total = ordered.len();
    let items = ordered
        .into_iter()
        .skip(request.offset())
        .take(request.size)
        .collect();
    Page {
        items,
        total,
        request,
    }
}

#[async_trait]
impl RecordStore<Employee> for MemoryStore {
    type Filter = EmployeeFilter;

    async fn load_page(
        &self,
        filter: &EmployeeFilter,
        request: PageRequest,
    ) -> Result<Page<Employee>> {
        let tables = self.tables.lock().await;
        let mut matched: Vec<Employee> = tables
            .employees
            .values()
            .filter(|employee| filter.accepts(employee))
            .cloned()
            .collect();
        // stable grid order: surname, identity as tie-break
        matched.sort_by(|a, b| {
            (a.surname.to_lowercase(), a.id).cmp(&(b.surname.to_lowercase(), b.id))
        });

        debug!(total = matched.len(), page = request.index, "loaded employee page");
        Ok(slice_page(matched, request))
    }

    async fn save_modified(&self, records: &[Employee]) -> Result<usize> {
        let mut tables = self.tables.lock().await;
        for record in records {
            if !tables.employees.contains_key(&record.id) {
                return Err(AppError::NotFound {
                    entity: Employee::ENTITY,
                    id: record.id,
                });
            }
        }
        for record in records {
            tables.employees.insert(record.id, record.clone());
        }
        Ok(records.len())
    }

    async fn insert_new(&self, records: Vec<Employee>) -> Result<Vec<Employee>> {
        let mut tables = self.tables.lock().await;
        let mut inserted = Vec::with_capacity(records.len());
        for mut record in records {
            tables.next_employee_id += 1;
            record.id = tables.next_employee_id;
            tables.employees.insert(record.id, record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.employees.remove(&id).is_none() {
            return Err(AppError::NotFound {
                entity: Employee::ENTITY,
                id,
            });
        }
        // cascade: articles belong to their employee
        let before = tables.articles.len();
        tables.articles.retain(|_, article| article.employee_id != id);
        debug!(
            employee = id,
            cascaded = before - tables.articles.len(),
            "deleted employee"
        );
        Ok(())
    }
}

#[async_trait]
impl RecordStore<Article> for MemoryStore {
    type Filter = ArticleFilter;

    async fn load_page(
        &self,
        filter: &ArticleFilter,
        request: PageRequest,
    ) -> Result<Page<Article>> {
        let tables = self.tables.lock().await;
        let mut matched: Vec<Article> = tables
            .articles
            .values()
            .filter(|article| filter.accepts(article))
            .cloned()
            .collect();
        matched.sort_by_key(|article| (article.release_date, article.id));

        debug!(total = matched.len(), page = request.index, "loaded article page");
        Ok(slice_page(matched, request))
    }

    async fn save_modified(&self, records: &[Article]) -> Result<usize> {
        let mut tables = self.tables.lock().await;
        for record in records {
            if !tables.articles.contains_key(&record.id) {
                return Err(AppError::NotFound {
                    entity: Article::ENTITY,
                    id: record.id,
                });
            }
            if !tables.employees.contains_key(&record.employee_id) {
                return Err(AppError::Persistence(format!(
                    "article '{}' references missing employee {}",
                    record.title, record.employee_id
                )));
            }
        }
        for record in records {
            tables.articles.insert(record.id, record.clone());
        }
        Ok(records.len())
    }

    async fn insert_new(&self, records: Vec<Article>) -> Result<Vec<Article>> {
        let mut tables = self.tables.lock().await;
        for record in &records {
            if !tables.employees.contains_key(&record.employee_id) {
                return Err(AppError::Persistence(format!(
                    "article '{}' references missing employee {}",
                    record.title, record.employee_id
                )));
            }
        }
        let mut inserted = Vec::with_capacity(records.len());
        for mut record in records {
            tables.next_article_id += 1;
            record.id = tables.next_article_id;
            tables.articles.insert(record.id, record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.articles.remove(&id).is_none() {
            return Err(AppError::NotFound {
                entity: Article::ENTITY,
                id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DependentArticles for MemoryStore {
    async fn employee_has_articles(&self, employee_id: RecordId) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .values()
            .any(|article| article.employee_id == employee_id))
    }
}

#[async_trait]
impl EmployeeLookup for MemoryStore {
    async fn employees_all(&self) -> Result<Vec<Employee>> {
        let tables = self.tables.lock().await;
        let mut employees: Vec<Employee> = tables.employees.values().cloned().collect();
        employees.sort_by(|a, b| {
            (a.surname.to_lowercase(), a.id).cmp(&(b.surname.to_lowercase(), b.id))
        });
        Ok(employees)
    }
}

#[async_trait]
impl ArticleReportSource for MemoryStore {
    async fn articles_between(
        &self,
        from: Option<NaiveDate>,
        to_exclusive: Option<NaiveDate>,
    ) -> Result<Vec<Article>> {
        let tables = self.tables.lock().await;
        let mut matched: Vec<Article> = tables
            .articles
            .values()
            .filter(|article| {
                from.is_none_or(|from| article.release_date >= from)
                    && to_exclusive.is_none_or(|to| article.release_date < to)
            })
            .cloned()
            .collect();
        matched.sort_by_key(|article| (article.release_date, article.id));
        Ok(matched)
    }
}
