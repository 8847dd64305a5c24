//! Folio runtime: the HTTP gateway serving reports, the process log sink,
//! and the table viewer client.

pub mod client;
pub mod gateway;
pub mod logging;

pub use client::{RefreshTimer, ReportClient, ReportSource, ViewerSession};
pub use gateway::{ApiError, GatewayConfig, GatewayServer};
pub use logging::{init_logging, LogFile, LogLineFormat};
