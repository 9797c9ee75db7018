use thiserror::Error;

use crate::track::RecordId;

/// One validation problem, scoped to the row it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub row: String,
    pub message: String,
}

impl RowIssue {
    pub fn new(row: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.row, self.message)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed ({} issue(s))", .0.len())]
    Validation(Vec<RowIssue>),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: RecordId },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl AppError {
    pub fn validation_of(row: impl Into<String>, messages: Vec<String>) -> Self {
        let row = row.into();
        Self::Validation(
            messages
                .into_iter()
                .map(|message| RowIssue::new(row.clone(), message))
                .collect(),
        )
    }

    /// Row-scoped messages for a validation error, empty for any other variant.
    pub fn issues(&self) -> &[RowIssue] {
        match self {
            Self::Validation(issues) => issues,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message suitable for a user-facing notification: validation errors
    /// expand to their row-scoped messages, one per line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(issues) => issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
