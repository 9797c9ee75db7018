pub mod error;
pub mod value;

pub use error::{AppError, Result, RowIssue};
pub use value::{FieldValue, Money};
