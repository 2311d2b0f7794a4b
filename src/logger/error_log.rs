//! Error log
//!
//! Persists handler failures as JSON lines in a daily rotating file. The log directory
//! and the file are only touched when the first record is written, so a process that
//! never fails never creates them.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use super::format::{ExceptionInfo, JsonFormatter, Level, LogRecord};
use super::writer::DailyRotatingFile;
use crate::config::LoggingConfig;

/// Logger name stamped on every record
pub const LOGGER_NAME: &str = "webhook_router";

/// Failure of the logging infrastructure itself
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to open log file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to write log file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Log writer lock poisoned")]
    Poisoned,
}

/// File-backed error logger shared by all request tasks
#[derive(Debug)]
pub struct ErrorLogger {
    name: String,
    dir: PathBuf,
    file_name: String,
    formatter: JsonFormatter,
    writer: Mutex<Option<DailyRotatingFile>>,
}

impl ErrorLogger {
    pub fn new(dir: impl Into<PathBuf>, file_name: &str) -> Self {
        Self {
            name: LOGGER_NAME.to_string(),
            dir: dir.into(),
            file_name: file_name.to_string(),
            formatter: JsonFormatter::default(),
            writer: Mutex::new(None),
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(&config.dir, &config.file_name)
    }

    /// Path of the file currently receiving records
    pub fn current_log_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    #[allow(dead_code)] // Used in tests
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record a handler failure under its correlation key (`"<path> - <method>"`)
    ///
    /// The record is stamped while the writer lock is held, so records reach the file
    /// in timestamp order and one created before midnight never lands in the next
    /// day's file. Its source location is the caller's.
    #[track_caller]
    pub fn record_failure(
        &self,
        correlation_key: &str,
        exception: ExceptionInfo,
    ) -> Result<(), LogError> {
        let mut guard = self.writer()?;
        let record = LogRecord::new(&self.name, Level::Error, correlation_key)
            .with_exception(exception);
        self.append(&mut guard, &record)
    }

    /// Format and append a record, creating the directory and file on first use
    pub fn log(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut guard = self.writer()?;
        self.append(&mut guard, record)
    }

    fn append(
        &self,
        slot: &mut Option<DailyRotatingFile>,
        record: &LogRecord,
    ) -> Result<(), LogError> {
        let line = self.formatter.format(record);
        let writer = match slot {
            Some(writer) => writer,
            slot @ None => slot.insert(self.open_writer()?),
        };
        writer
            .write_line(record.created, &line)
            .map_err(|source| LogError::Write {
                path: writer.path().to_path_buf(),
                source,
            })
    }

    fn writer(&self) -> Result<MutexGuard<'_, Option<DailyRotatingFile>>, LogError> {
        self.writer.lock().map_err(|_| LogError::Poisoned)
    }

    fn open_writer(&self) -> Result<DailyRotatingFile, LogError> {
        create_log_dir(&self.dir).map_err(|source| LogError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.current_log_path();
        DailyRotatingFile::open(&path).map_err(|source| LogError::Open { path, source })
    }
}

/// Create the log directory (owner-only on Unix); succeeds if it already exists
fn create_log_dir(dir: &Path) -> io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;
    use std::sync::Arc;

    fn lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_nothing_created_before_first_record() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = ErrorLogger::new(tmp.path().join("logs"), "webhooks.log");
        assert!(!logger.dir().exists());
    }

    #[test]
    fn test_record_failure_writes_correlation_key() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = ErrorLogger::new(tmp.path().join("logs"), "webhooks.log");
        let err = io::Error::other("boom");

        logger
            .record_failure("/v1/error-debug - GET", ExceptionInfo::from_error("Io", &err))
            .unwrap();

        let records = lines(&logger.current_log_path());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["message"], "/v1/error-debug - GET");
        assert_eq!(records[0]["levelname"], "ERROR");
        assert_eq!(records[0]["name"], LOGGER_NAME);
        assert_eq!(records[0]["exc_type"], "Io");
    }

    #[cfg(unix)]
    #[test]
    fn test_log_dir_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let logger = ErrorLogger::new(tmp.path().join("logs"), "webhooks.log");
        logger.log(&LogRecord::new("t", Level::Error, "x")).unwrap();

        let mode = std::fs::metadata(logger.dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_existing_dir_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("logs")).unwrap();
        let logger = ErrorLogger::new(tmp.path().join("logs"), "webhooks.log");
        logger.log(&LogRecord::new("t", Level::Error, "x")).unwrap();
        assert!(logger.current_log_path().exists());
    }

    #[test]
    fn test_template_and_args_through_logger() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = ErrorLogger::new(tmp.path(), "log.txt");
        let record = LogRecord::new("testlogger", Level::Error, "test %s").with_args(["yo"]);
        logger.log(&record).unwrap();

        let records = lines(&tmp.path().join("log.txt"));
        assert_eq!(records[0]["message"], "test yo");
    }

    #[test]
    fn test_records_on_two_utc_days_land_in_two_files() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = ErrorLogger::new(tmp.path(), "webhooks.log");
        let yesterday = Utc::now() - chrono::Duration::days(1);

        // A file last written yesterday is attributed to yesterday
        let file = std::fs::File::create(logger.current_log_path()).unwrap();
        file.set_modified(yesterday.into()).unwrap();
        drop(file);

        logger
            .log(&LogRecord::new("t", Level::Error, "late").with_created(yesterday))
            .unwrap();
        logger.log(&LogRecord::new("t", Level::Error, "today")).unwrap();

        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 2);
        let current = lines(&logger.current_log_path());
        assert_eq!(current.len(), 1);
        assert_eq!(current[0]["message"], "today");

        let rotated = crate::logger::writer::rotated_path(
            &logger.current_log_path(),
            yesterday.date_naive(),
        );
        assert_eq!(lines(&rotated)[0]["message"], "late");
    }

    #[test]
    fn test_unusable_dir_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();

        let logger = ErrorLogger::new(&blocker, "webhooks.log");
        let err = logger
            .record_failure("/v1/x - GET", ExceptionInfo::from_error("Io", &io::Error::other("x")))
            .unwrap_err();
        assert!(matches!(err, LogError::CreateDir { .. }));
        assert!(err.to_string().starts_with("Failed to create log directory"));
    }

    fn boom() -> ExceptionInfo {
        ExceptionInfo::from_error("Deliberate", &io::Error::other("boom"))
    }

    #[test]
    fn test_failure_location_is_the_caller() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = ErrorLogger::new(tmp.path(), "webhooks.log");

        let called_at = line!() + 1;
        let result = logger.record_failure("/v1/error-debug - GET", boom());
        result.unwrap();

        let records = lines(&logger.current_log_path());
        assert_eq!(records[0]["lineno"], called_at);
        assert!(records[0]["pathname"].as_str().unwrap().ends_with("error_log.rs"));
    }

    #[test]
    fn test_concurrent_failures_are_written_in_time_order() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = Arc::new(ErrorLogger::new(tmp.path(), "webhooks.log"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        logger.record_failure("/v1/error-debug - GET", boom()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let created: Vec<f64> = lines(&logger.current_log_path())
            .iter()
            .map(|record| record["created"].as_f64().unwrap())
            .collect();
        assert_eq!(created.len(), 200);
        assert!(created.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_concurrent_first_failures_share_one_writer() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = Arc::new(ErrorLogger::new(tmp.path().join("logs"), "webhooks.log"));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    let record = LogRecord::new("t", Level::Error, "worker %s")
                        .with_args([i.to_string()]);
                    logger.log(&record).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // every record in exactly one line of exactly one file
        assert_eq!(lines(&logger.current_log_path()).len(), 8);
        assert_eq!(std::fs::read_dir(logger.dir()).unwrap().count(), 1);
    }
}
