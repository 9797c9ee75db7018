use std::sync::Arc;

use tracing::debug;

use crate::auth::AuthGate;
use crate::config::AppConfig;
use crate::core::Result;
use crate::model::{Article, Employee};
use crate::notify::{Confirmer, Notifier};
use crate::shell::{ArticlesWorkspace, EmployeesWorkspace, ReportsWorkspace};
use crate::store::{
    ArticleFilter, ArticleReportSource, DependentArticles, EmployeeFilter, EmployeeLookup,
    RecordStore,
};

/// Top-level sections of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Login,
    Employees,
    Articles,
    Reports,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Authorization",
            Self::Employees => "Employees",
            Self::Articles => "Articles",
            Self::Reports => "Reports",
        }
    }
}

/// Owns the section workspaces, the authentication gate and the navigation
/// state. Every section switch and the application close pass through the
/// active workspace's unsaved-changes check.
pub struct Shell<S>
where
    S: RecordStore<Employee, Filter = EmployeeFilter>
        + RecordStore<Article, Filter = ArticleFilter>
        + DependentArticles
        + EmployeeLookup
        + ArticleReportSource
        + Clone,
{
    employees: EmployeesWorkspace<S>,
    articles: ArticlesWorkspace<S>,
    reports: ReportsWorkspace<S>,
    auth: AuthGate,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    section: Section,
    authenticated: bool,
}

impl<S> Shell<S>
where
    S: RecordStore<Employee, Filter = EmployeeFilter>
        + RecordStore<Article, Filter = ArticleFilter>
        + DependentArticles
        + EmployeeLookup
        + ArticleReportSource
        + Clone,
{
    pub fn new(
        store: S,
        auth: AuthGate,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        config: &AppConfig,
        period: ArticleFilter,
    ) -> Self {
        Self {
            employees: EmployeesWorkspace::new(
                store.clone(),
                notifier.clone(),
                confirmer.clone(),
                config.employee_page_size,
            ),
            articles: ArticlesWorkspace::new(
                store.clone(),
                notifier.clone(),
                confirmer.clone(),
                config.article_page_size,
                period,
            ),
            reports: ReportsWorkspace::new(store, notifier.clone()),
            auth,
            notifier,
            confirmer,
            section: Section::Login,
            authenticated: false,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Verify the password and, on success, move to the employees section.
    pub async fn login(&mut self, password: &str) -> Result<bool> {
        if self.auth.verify(password) {
            self.authenticated = true;
            self.notifier.notify_success("Signed in successfully");
            self.navigate(Section::Employees).await?;
            Ok(true)
        } else {
            self.notifier.notify_error("Invalid password");
            Ok(false)
        }
    }

    /// Switch sections, delegating the unsaved-changes check to whichever
    /// workspace is currently active.
    pub async fn navigate(&mut self, target: Section) -> Result<bool> {
        if target == self.section {
            return Ok(true);
        }
        if !self.authenticated && target != Section::Login {
            self.notifier.notify_error("Sign in to continue");
            return Ok(false);
        }

        if !self.check_unsaved_changes().await {
            debug!(?target, "navigation cancelled by the unsaved-changes guard");
            return Ok(false);
        }

        self.section = target;
        match target {
            Section::Employees => self.employees.load().await?,
            Section::Articles => self.articles.load().await?,
            Section::Login | Section::Reports => {}
        }
        Ok(true)
    }

    async fn check_unsaved_changes(&mut self) -> bool {
        match self.section {
            Section::Employees if self.employees.has_unsaved_changes() => {
                self.employees.confirm_navigation().await
            }
            Section::Articles if self.articles.has_unsaved_changes() => {
                self.articles.confirm_navigation().await
            }
            _ => true,
        }
    }

    /// Close gate: confirms once when any workspace holds pending edits and
    /// tears tracking state down on an accepted close.
    pub async fn can_close(&mut self) -> bool {
        if self.employees.has_unsaved_changes() || self.articles.has_unsaved_changes() {
            let close = self
                .confirmer
                .confirm(
                    "Unsaved changes",
                    "There are unsaved changes. Close the application?",
                )
                .await;
            if close {
                self.employees.cleanup();
                self.articles.cleanup();
            }
            return close;
        }

        self.employees.cleanup();
        self.articles.cleanup();
        true
    }

    pub fn employees(&self) -> &EmployeesWorkspace<S> {
        &self.employees
    }

    pub fn employees_mut(&mut self) -> &mut EmployeesWorkspace<S> {
        &mut self.employees
    }

    pub fn articles(&self) -> &ArticlesWorkspace<S> {
        &self.articles
    }

    pub fn articles_mut(&mut self) -> &mut ArticlesWorkspace<S> {
        &mut self.articles
    }

    pub fn reports(&self) -> &ReportsWorkspace<S> {
        &self.reports
    }

    pub fn reports_mut(&mut self) -> &mut ReportsWorkspace<S> {
        &mut self.reports
    }
}
