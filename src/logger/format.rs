//! Structured log record and JSON line formatter
//!
//! A record renders to exactly one JSON object per line:
//! - every scalar attribute of the record (`name`, `msg`, `levelname`, `levelno`,
//!   `created`, `process`, `thread_name`, `pathname`, `lineno`, plus any extra
//!   attributes)
//! - `message`: the template with its arguments substituted
//! - `asctime`: the record time in UTC
//! - `exc_type` / `traceback` when an error is attached
//!
//! Derived fields are computed into `Option`s. A field that cannot be derived (a
//! template whose placeholders don't match its arguments, a broken date format) is
//! left out of the line and the rest of the record is still emitted.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::panic::Location;

/// Default `asctime` layout, e.g. `2018-01-13 06:00:00,123`
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Record severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    pub const fn number(self) -> i64 {
        match self {
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// Parse a configured level name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Scalar attribute value attached to a record
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Error details captured alongside a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub traceback: String,
}

impl ExceptionInfo {
    /// Capture an error and its whole `source()` chain
    pub fn from_error(type_name: &str, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut traceback = format!("{type_name}: {error}\n");
        let mut source = error.source();
        while let Some(cause) = source {
            let _ = writeln!(traceback, "  caused by: {cause}");
            source = cause.source();
        }
        Self {
            type_name: type_name.to_string(),
            traceback,
        }
    }
}

/// A single log record
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub name: String,
    pub level: Level,
    /// Message template, `%s` placeholders are filled from `args`
    pub msg: String,
    pub args: Vec<String>,
    pub created: DateTime<Utc>,
    /// Source location that created the record
    pub location: &'static Location<'static>,
    pub exception: Option<ExceptionInfo>,
    pub extra: BTreeMap<String, Scalar>,
}

impl LogRecord {
    #[track_caller]
    pub fn new(name: &str, level: Level, msg: &str) -> Self {
        Self {
            name: name.to_string(),
            level,
            msg: msg.to_string(),
            args: Vec::new(),
            created: Utc::now(),
            location: Location::caller(),
            exception: None,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Render the message template
    ///
    /// Without arguments the template is returned untouched. Otherwise each `%s`
    /// (also `%d`, `%i`, `%r`, `%f`) consumes one argument and `%%` is a literal `%`.
    /// Returns `None` when placeholders and arguments don't line up.
    pub fn message(&self) -> Option<String> {
        if self.args.is_empty() {
            return Some(self.msg.clone());
        }

        let mut out = String::with_capacity(self.msg.len());
        let mut args = self.args.iter();
        let mut chars = self.msg.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next()? {
                '%' => out.push('%'),
                's' | 'd' | 'i' | 'r' | 'f' => out.push_str(args.next()?),
                _ => return None,
            }
        }

        // every argument must be consumed
        args.next().is_none().then_some(out)
    }

    /// Scalar attributes of the record, standard ones first, then extras
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert("name".into(), Value::from(self.name.as_str()));
        attrs.insert("msg".into(), Value::from(self.msg.as_str()));
        attrs.insert("levelname".into(), Value::from(self.level.name()));
        attrs.insert("levelno".into(), Value::from(self.level.number()));
        #[allow(clippy::cast_precision_loss)]
        let created = self.created.timestamp_micros() as f64 / 1_000_000.0;
        attrs.insert("created".into(), Value::from(created));
        attrs.insert("process".into(), Value::from(std::process::id()));
        if let Some(thread_name) = std::thread::current().name() {
            attrs.insert("thread_name".into(), Value::from(thread_name));
        }
        attrs.insert("pathname".into(), Value::from(self.location.file()));
        attrs.insert("lineno".into(), Value::from(self.location.line()));

        for (key, value) in &self.extra {
            let value = match value {
                Scalar::Str(s) => Value::from(s.as_str()),
                Scalar::Int(i) => Value::from(*i),
                Scalar::Float(f) => Value::from(*f),
            };
            attrs.insert(key.clone(), value);
        }
        attrs
    }
}

// Failure records only set an exception; templated and annotated records are built
// by tests and ad-hoc callers
#[allow(dead_code)]
impl LogRecord {
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: impl Into<Scalar>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Renders records as single-line JSON objects
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    datefmt: String,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl JsonFormatter {
    pub fn new(datefmt: Option<&str>) -> Self {
        Self {
            datefmt: datefmt.unwrap_or(DEFAULT_DATE_FORMAT).to_string(),
        }
    }

    /// Format the record time in UTC, `None` if the date format is invalid
    pub fn format_time(&self, record: &LogRecord) -> Option<String> {
        let mut out = String::new();
        write!(out, "{}", record.created.format(&self.datefmt)).ok()?;
        Some(out)
    }

    /// Render one record as a JSON line (without the trailing newline)
    pub fn format(&self, record: &LogRecord) -> String {
        let mut fields = record.attributes();

        if let Some(message) = record.message() {
            fields.insert("message".into(), Value::from(message));
        }
        if let Some(asctime) = self.format_time(record) {
            fields.insert("asctime".into(), Value::from(asctime));
        }
        if let Some(exception) = &record.exception {
            fields.insert("exc_type".into(), Value::from(exception.type_name.as_str()));
            fields.insert("traceback".into(), Value::from(exception.traceback.as_str()));
        }

        Value::Object(fields).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(line: &str) -> Map<String, Value> {
        match serde_json::from_str(line).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_message_template_substitution() {
        let record = LogRecord::new("testlogger", Level::Error, "test %s").with_args(["yo"]);
        let fields = parse(&JsonFormatter::default().format(&record));
        assert_eq!(fields["message"], "test yo");
        assert_eq!(fields["msg"], "test %s");
        assert_eq!(fields["levelname"], "ERROR");
        assert_eq!(fields["levelno"], 40);
        assert_eq!(fields["name"], "testlogger");
        assert!(fields["pathname"].as_str().unwrap().ends_with("format.rs"));
    }

    #[test]
    fn test_message_without_args_is_verbatim() {
        let record = LogRecord::new("l", Level::Info, "100% done");
        assert_eq!(record.message().as_deref(), Some("100% done"));
    }

    #[test]
    fn test_mismatched_args_omit_message_only() {
        let too_few = LogRecord::new("l", Level::Info, "%s and %s").with_args(["a"]);
        assert_eq!(too_few.message(), None);
        let too_many = LogRecord::new("l", Level::Info, "%s").with_args(["a", "b"]);
        assert_eq!(too_many.message(), None);

        let fields = parse(&JsonFormatter::default().format(&too_few));
        assert!(!fields.contains_key("message"));
        assert!(fields.contains_key("asctime"));
        assert_eq!(fields["msg"], "%s and %s");
    }

    #[test]
    fn test_percent_escape() {
        let record = LogRecord::new("l", Level::Info, "%s at 100%%").with_args(["cpu"]);
        assert_eq!(record.message().as_deref(), Some("cpu at 100%"));
    }

    #[test]
    fn test_asctime_is_utc_with_millis() {
        let created = Utc.with_ymd_and_hms(2018, 1, 13, 6, 0, 0).unwrap();
        let record = LogRecord::new("l", Level::Info, "x").with_created(created);
        let fields = parse(&JsonFormatter::default().format(&record));
        assert_eq!(fields["asctime"], "2018-01-13 06:00:00,000");
        assert_eq!(fields["created"], 1_515_823_200.0);
    }

    #[test]
    fn test_invalid_date_format_omits_asctime() {
        let record = LogRecord::new("l", Level::Info, "still here");
        let fields = parse(&JsonFormatter::new(Some("%Q")).format(&record));
        assert!(!fields.contains_key("asctime"));
        assert_eq!(fields["message"], "still here");
    }

    #[test]
    fn test_exception_fields() {
        let inner = std::io::Error::other("disk on fire");
        let info = ExceptionInfo::from_error("Io", &inner);
        let record = LogRecord::new("l", Level::Error, "/v1/x - GET").with_exception(info);
        let fields = parse(&JsonFormatter::default().format(&record));
        assert_eq!(fields["exc_type"], "Io");
        assert!(fields["traceback"].as_str().unwrap().contains("disk on fire"));
    }

    #[test]
    fn test_no_exception_fields_without_error() {
        let record = LogRecord::new("l", Level::Info, "fine");
        let fields = parse(&JsonFormatter::default().format(&record));
        assert!(!fields.contains_key("exc_type"));
        assert!(!fields.contains_key("traceback"));
    }

    #[test]
    fn test_extra_scalar_attributes() {
        let record = LogRecord::new("l", Level::Info, "x")
            .with_attribute("path", "/v1/debug")
            .with_attribute("status", 500_i64)
            .with_attribute("elapsed", 0.5_f64);
        let fields = parse(&JsonFormatter::default().format(&record));
        assert_eq!(fields["path"], "/v1/debug");
        assert_eq!(fields["status"], 500);
        assert_eq!(fields["elapsed"], 0.5);
    }

    #[test]
    fn test_output_is_single_line() {
        let record = LogRecord::new("l", Level::Error, "multi\nline");
        assert!(!JsonFormatter::default().format(&record).contains('\n'));
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("WARN"), Some(Level::Warning));
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse("loud"), None);
    }
}
