mod article;
mod employee;

pub use article::{Article, ContentKind, MediaOutlet};
pub use employee::{ContractKind, ContractStatus, Employee};

pub const MAX_TEXT_LEN: usize = 255;
