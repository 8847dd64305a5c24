use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use tracing_subscriber::fmt::MakeWriter;

use folio_core::error::{FolioError, Result};

/// Append-only log file shared by every event of the process.
///
/// Write errors never reach the caller: the first one is reported on
/// stderr and the rest are dropped silently.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    file: Arc<Mutex<File>>,
    write_failed: Arc<AtomicBool>,
}

impl LogFile {
    /// Create `web_<YYYY-MM-DD>_<HH-MM-SS>.log` in `dir`, creating `dir` as needed.
    pub fn create(dir: &Path, started: DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            FolioError::Startup(format!(
                "Failed to create log directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(file_name(started));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                FolioError::Startup(format!(
                    "Failed to create log file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self::from_file(path, file))
    }

    fn from_file(path: PathBuf, file: File) -> Self {
        Self {
            path,
            file: Arc::new(Mutex::new(file)),
            write_failed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn report_failure(&self, err: &io::Error) {
        if !self.write_failed.swap(true, Ordering::Relaxed) {
            eprintln!(
                "Failed to write to log file {}: {}",
                self.path.display(),
                err
            );
        }
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = file.write_all(buf) {
            drop(file);
            self.report_failure(&e);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = file.flush() {
            drop(file);
            self.report_failure(&e);
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn file_name(started: DateTime<Local>) -> String {
    format!("web_{}.log", started.format("%Y-%m-%d_%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_file_name() {
        let started = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(file_name(started), "web_2026-03-07_09-05-01.log");
    }

    #[test]
    fn test_create_makes_directory() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("nested/logs");
        let log = LogFile::create(&logs, Local::now()).unwrap();
        assert!(log.path().starts_with(&logs));
        assert!(log.path().exists());
    }

    #[test]
    fn test_writes_append() {
        let dir = TempDir::new().unwrap();
        let log = LogFile::create(dir.path(), Local::now()).unwrap();

        let mut a = log.make_writer();
        let mut b = log.make_writer();
        a.write_all(b"first\n").unwrap();
        b.write_all(b"second\n").unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readonly.log");
        fs::write(&path, "").unwrap();
        let read_only = File::open(&path).unwrap();
        let mut log = LogFile::from_file(path.clone(), read_only);

        assert_eq!(log.write(b"dropped\n").unwrap(), 8);
        assert!(log.flush().is_ok());
        assert!(log.write_failed.load(Ordering::Relaxed));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
