use serde::{Deserialize, Serialize};

/// One-based page coordinates of a grid query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub index: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn first(size: usize) -> Self {
        Self { index: 1, size }
    }

    pub fn offset(&self) -> usize {
        self.index.saturating_sub(1) * self.size
    }

    pub fn next(self) -> Self {
        Self {
            index: self.index + 1,
            ..self
        }
    }

    pub fn previous(self) -> Self {
        Self {
            index: self.index.saturating_sub(1).max(1),
            ..self
        }
    }
}

/// A stable-ordered slice of records plus the total match count.
///
/// The total comes from a count over the full filtered set, so `has_next`
/// stays correct even when the last page happens to be full-sized.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.request.index * self.request.size < self.total
    }

    pub fn has_previous(&self) -> bool {
        self.request.index > 1
    }
}
