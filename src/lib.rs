// ============================================================================
// Masthead Library
// ============================================================================
//
// Employee/article management core: typed records with validation and derived
// fields, a paged record store, optimistic change tracking with navigation
// guards, the section workspaces that tie them together, and report export.

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod model;
pub mod notify;
pub mod report;
pub mod shell;
pub mod store;
pub mod track;

// Re-export main types for convenience
pub use auth::AuthGate;
pub use config::AppConfig;
pub use crate::core::{AppError, FieldValue, Money, Result, RowIssue};
pub use model::{Article, ContentKind, ContractKind, ContractStatus, Employee, MediaOutlet};
pub use notify::{AutoConfirm, Confirmer, LogNotifier, Notifier};
pub use report::{ArticlesReport, ReportScope, build_articles_report};
pub use shell::{ArticlesWorkspace, EmployeesWorkspace, ReportsWorkspace, Section, Shell};
pub use store::{
    ArticleFilter, ArticleReportSource, DependentArticles, EmployeeFilter, EmployeeLookup,
    MemoryStore, Page, PageRequest, RecordStore,
};
pub use track::{
    FieldChange, GuardDecision, RecordId, Trackable, TrackedCollection, Transition, Validate,
};
