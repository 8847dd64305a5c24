//! Core types for Folio: configuration, report discovery and the table
//! viewer model shared by the server and the client.

pub mod config;
pub mod error;
pub mod report;
pub mod resolver;
pub mod table;
pub mod viewer;

pub use config::{Addressing, FolioConfig};
pub use error::{FolioError, Result};
pub use report::{display_name, Report, ReportSummary};
pub use resolver::ReportResolver;
pub use table::{SortDirection, TableView};
pub use viewer::{BoardFilter, DescriptionMap, FilterState, SortState, ViewState};
