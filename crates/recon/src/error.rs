use std::fmt;

use chrono::NaiveDate;

use crate::model::{RecordKind, SyncStage};

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad channel role, bad currency code, etc.).
    ConfigValidation(String),
    /// A raw record is missing a required field or carries an unusable value.
    /// Rejected records are skipped, never fatal to a sync.
    /// `index` is the row's position in its fetched batch; `line` is its
    /// line in the source file when known.
    MalformedRecord { kind: RecordKind, index: usize, line: Option<usize>, reason: String },
    /// Window start is after its end.
    EmptyWindow { start: NaiveDate, end: NaiveDate },
    /// A sync stage failed; nothing past this stage was produced.
    StageFailed { stage: SyncStage, message: String },
    /// CSV read / header error.
    Csv(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MalformedRecord { kind, index, line: None, reason } => {
                write!(f, "{kind} record #{index}: {reason}")
            }
            Self::MalformedRecord { kind, index, line: Some(line), reason } => {
                write!(f, "{kind} record #{index} (line {line}): {reason}")
            }
            Self::EmptyWindow { start, end } => {
                write!(f, "empty date window: start {start} is after end {end}")
            }
            Self::StageFailed { stage, message } => {
                write!(f, "sync failed at {stage}: {message}")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl ReconError {
    /// The stage a failed sync stopped at, if any.
    pub fn stage(&self) -> Option<SyncStage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
