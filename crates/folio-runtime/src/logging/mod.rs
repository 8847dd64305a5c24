//! Process log sink.
//!
//! Every event goes to stdout and, when enabled, to a log file created once
//! per process start (`web_<date>_<time>.log`). Lines look like
//! `10/17/2026 09:30:00 || INFO || Served HTML report: appOpen`.

mod file;

pub use file::LogFile;

use std::fmt;
use std::path::PathBuf;

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use folio_core::config::LoggingConfig;
use folio_core::error::{FolioError, Result};

/// Timestamp format of each log line.
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// `timestamp || LEVEL || message fields` line format.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLineFormat;

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} || {} || ",
            Local::now().format(TIMESTAMP_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber. Returns the log file path when a file
/// layer was installed.
///
/// Failing to create the log file is a startup failure; failures while
/// writing to it later are not.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| FolioError::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let log_file = if config.file_enabled {
        Some(LogFile::create(&config.dir, Local::now())?)
    } else {
        None
    };
    let path = log_file.as_ref().map(|f| f.path().to_path_buf());

    let console = tracing_subscriber::fmt::layer()
        .event_format(LogLineFormat)
        .with_writer(std::io::stdout);
    let file = log_file.map(|writer| {
        tracing_subscriber::fmt::layer()
            .event_format(LogLineFormat)
            .with_ansi(false)
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| FolioError::Startup(format!("Failed to install logger: {}", e)))?;

    tracing::info!("Web server logging initialized");
    Ok(path)
}
