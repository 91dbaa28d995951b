//! Application modules
//!
//! The root module is bootstrapped once per process; worker modules are
//! loaded on demand by the dispatcher.

pub mod data;
pub mod export;
pub mod report;
pub mod root;

pub use data::Database;
pub use export::{EXPORT_FORMATTER, EXPORT_JOB, EXPORT_MODULE, ExportFormatter, ExportJob, ExportModuleFactory};
pub use report::{REPORT_MODULE, REPORT_SERVICE, ReportModuleFactory, ReportService};
pub use root::{DATABASE, ROOT_MODULE, RootModuleFactory, SETTINGS};
