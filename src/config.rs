use std::path::PathBuf;

use crate::core::{AppError, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON dataset file; `None` starts from an empty in-memory dataset.
    pub data_path: Option<PathBuf>,

    /// Rows per page in the employees grid.
    pub employee_page_size: usize,

    /// Rows per page in the articles grid.
    pub article_page_size: usize,

    /// Password accepted by the login gate.
    pub password: String,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            data_path: None,
            employee_page_size: 15,
            article_page_size: 10,
            password: "admin".to_string(),
        }
    }

    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn employee_page_size(mut self, size: usize) -> Self {
        self.employee_page_size = size;
        self
    }

    pub fn article_page_size(mut self, size: usize) -> Self {
        self.article_page_size = size;
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.employee_page_size == 0 || self.article_page_size == 0 {
            return Err(AppError::Config("page sizes must be positive".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::Config("password cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
