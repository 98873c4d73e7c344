//! Append-only operations log.
//!
//! One line per operation, `[<RFC3339>] <OPERATION> -> <target>`, written
//! under a mutex so concurrent callers never interleave or lose lines.
//! No rotation; the log grows without bound.

use crate::error::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The fixed set of loggable operations, spelled the way they appear on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Write,
    Read,
    ListDir,
    Delete,
    Rename,
    Mkdir,
    Copy,
    Properties,
    Search,
    Open,
    ListTree,
    ScreenAgent,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Write => "WRITE",
            Operation::Read => "READ",
            Operation::ListDir => "LIST_DIR",
            Operation::Delete => "DELETE",
            Operation::Rename => "RENAME/MOVE",
            Operation::Mkdir => "MKDIR",
            Operation::Copy => "COPY",
            Operation::Properties => "PROPERTIES",
            Operation::Search => "SEARCH",
            Operation::Open => "OPEN",
            Operation::ListTree => "LIST_TREE",
            Operation::ScreenAgent => "SCREEN_AGENT",
        };
        f.write_str(name)
    }
}

impl Operation {
    fn parse(s: &str) -> Option<Operation> {
        Some(match s {
            "WRITE" => Operation::Write,
            "READ" => Operation::Read,
            "LIST_DIR" => Operation::ListDir,
            "DELETE" => Operation::Delete,
            "RENAME/MOVE" => Operation::Rename,
            "MKDIR" => Operation::Mkdir,
            "COPY" => Operation::Copy,
            "PROPERTIES" => Operation::Properties,
            "SEARCH" => Operation::Search,
            "OPEN" => Operation::Open,
            "LIST_TREE" => Operation::ListTree,
            "SCREEN_AGENT" => Operation::ScreenAgent,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub target: Option<String>,
}

pub struct AuditLog {
    file: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    /// Creates the log directory if missing; the log file itself is created
    /// on first append.
    pub fn new(dir: &Path) -> Result<Self, Error> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            file: dir.join("operations.log"),
            lock: Mutex::new(()),
        })
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn append(&self, operation: Operation, target: Option<&str>) -> Result<(), Error> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = match target {
            Some(target) => format!("[{timestamp}] {operation} -> {target}\n"),
            None => format!("[{timestamp}] {operation}\n"),
        };
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Reads the log back, skipping lines that do not match the format.
    pub fn entries(&self) -> Result<Vec<LogEntry>, Error> {
        if !self.file.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.file)?;
        Ok(data.lines().filter_map(parse_line).collect())
    }
}

/// Parses one `[<RFC3339>] <OPERATION>` line with an optional
/// ` -> <target>` tail. Returns `None` for anything malformed.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let rest = line.strip_prefix('[')?;
    let (stamp, rest) = rest.split_once("] ")?;
    let timestamp = DateTime::parse_from_rfc3339(stamp).ok()?.with_timezone(&Utc);
    let (op, target) = match rest.split_once(" -> ") {
        Some((op, target)) => (op, Some(target.to_string())),
        None => (rest, None),
    };
    Some(LogEntry {
        timestamp,
        operation: Operation::parse(op)?,
        target,
    })
}
