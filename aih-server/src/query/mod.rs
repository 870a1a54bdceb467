//! Read-side queries over the record store

pub mod dashboard;
pub mod reports;
pub mod search;

pub use dashboard::{dashboard, Dashboard, PeriodValues};
pub use reports::{report, Report, ReportKind};
pub use search::{export_rows, search, ExportRow, SearchFilters, SearchRow};
