use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::core::{AppError, Result};
use crate::notify::Notifier;
use crate::report::{ReportScope, build_articles_report};
use crate::store::{ArticleReportSource, EmployeeLookup};

/// Report section state: pick a scope, generate, export.
pub struct ReportsWorkspace<S> {
    store: S,
    notifier: Arc<dyn Notifier>,
    selected: Option<ReportScope>,
}

impl<S> ReportsWorkspace<S>
where
    S: ArticleReportSource + EmployeeLookup,
{
    pub fn new(store: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            selected: None,
        }
    }

    pub fn select(&mut self, scope: ReportScope) {
        self.selected = Some(scope);
    }

    pub fn selected(&self) -> Option<ReportScope> {
        self.selected
    }

    /// Generate the selected report and write it next to `out_path`.
    ///
    /// Fails before touching the filesystem when no scope is selected or the
    /// scope matches no articles.
    pub async fn generate(&self, out_path: &Path, generated_on: NaiveDate) -> Result<PathBuf> {
        let Some(scope) = self.selected else {
            let err =
                AppError::validation_of("report", vec!["please select a report type".to_string()]);
            self.notifier.notify_error(&err.user_message());
            return Err(err);
        };

        let (from, to) = scope.range();
        let articles = self.store.articles_between(from, to).await?;
        let employees = self.store.employees_all().await?;

        let report = match build_articles_report(&articles, &employees, scope.title(), generated_on)
        {
            Ok(report) => report,
            Err(err) => {
                self.notifier.notify_error(&err.user_message());
                return Err(err);
            }
        };

        if let Err(err) = report.export_html(out_path).await {
            self.notifier.notify_error(&err.user_message());
            return Err(err);
        }

        self.notifier
            .notify_success(&format!("{} generated", report.title));
        Ok(out_path.to_path_buf())
    }
}
