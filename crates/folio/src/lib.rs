//! Folio - report server and table viewer.
//!
//! Serves generated HTML/CSV reports from a shared directory and provides a
//! viewer that filters, sorts and auto-refreshes them.

mod runtime;

pub use folio_core;
pub use folio_runtime;

pub use runtime::{Folio, FolioBuilder};
