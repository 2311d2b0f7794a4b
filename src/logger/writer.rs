//! Log writer module
//!
//! Append-only log file that rolls over once per UTC day. When the first record of a
//! new day arrives, the current file is renamed to `<name>.YYYY-MM-DD` (the day it
//! covered) and a fresh file is opened under the original name. Rotated files are
//! never deleted.

use chrono::{DateTime, NaiveDate, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Daily rotating log file
#[derive(Debug)]
pub struct DailyRotatingFile {
    path: PathBuf,
    file: File,
    /// UTC day covered by the file currently open at `path`
    current_day: NaiveDate,
}

impl DailyRotatingFile {
    /// Open or create the log file for appending
    ///
    /// An existing file is attributed to the UTC day of its last modification, so a
    /// file left over from a previous run is rotated on the first write of a later day.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let current_day = existing_file_day(&path).unwrap_or_else(|| Utc::now().date_naive());
        let file = open_log_file(&path)?;
        Ok(Self {
            path,
            file,
            current_day,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[allow(dead_code)] // Used in tests
    pub const fn current_day(&self) -> NaiveDate {
        self.current_day
    }

    /// Append one line stamped at `at`, rolling over first if `at` is on a later day
    pub fn write_line(&mut self, at: DateTime<Utc>, line: &str) -> io::Result<()> {
        let day = at.date_naive();
        if day > self.current_day {
            self.rotate(day)?;
        }
        writeln!(self.file, "{line}")?;
        self.file.flush()
    }

    fn rotate(&mut self, new_day: NaiveDate) -> io::Result<()> {
        // the file may have been removed or archived under us; start a fresh one
        if self.path.exists() {
            let rotated = rotated_path(&self.path, self.current_day);
            if rotated.exists() {
                std::fs::remove_file(&rotated)?;
            }
            std::fs::rename(&self.path, &rotated)?;
        }
        self.file = open_log_file(&self.path)?;
        self.current_day = new_day;
        Ok(())
    }
}

/// Path a log file is moved to when the given day is rotated out
pub fn rotated_path(path: &Path, day: NaiveDate) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", day.format("%Y-%m-%d")));
    PathBuf::from(name)
}

fn existing_file_day(path: &Path) -> Option<NaiveDate> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified).date_naive())
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
