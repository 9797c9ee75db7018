mod articles;
mod employees;
mod reports;
mod root;

pub use articles::ArticlesWorkspace;
pub use employees::EmployeesWorkspace;
pub use reports::ReportsWorkspace;
pub use root::{Section, Shell};
