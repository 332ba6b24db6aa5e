//! Session protocol: how generated code reaches a SAS engine and what comes back.

use std::{fmt, str::FromStr};

use anyhow::Result;
use serde::Serialize;

use crate::error::StatError;

pub mod stdio;

pub use stdio::StdioSession;

/// Captured output of one synchronous submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmitResult {
    pub log: String,
    pub listing: String,
}

/// A two-level SAS table reference (`libref.table`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableHandle {
    pub libref: String,
    pub table: String,
}

impl TableHandle {
    pub fn new(libref: impl Into<String>, table: impl Into<String>) -> Self {
        Self { libref: libref.into(), table: table.into() }
    }
}

impl fmt::Display for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.libref, self.table)
    }
}

impl FromStr for TableHandle {
    type Err = StatError;

    /// One-level names land in `work`, as they do in SAS itself.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (libref, table) = match s.split_once('.') {
            Some((lib, table)) => (lib, table),
            None => ("work", s),
        };
        if libref.is_empty() || table.is_empty() || table.contains('.') {
            return Err(StatError::InvalidTable { reference: s.to_string() });
        }
        Ok(Self::new(libref, table))
    }
}

/// Everything the procedure layer needs from a running SAS session.
///
/// Implementations own the object counter and the explain-only switch; the
/// procedure layer only reads them.
pub trait Session {
    /// Run `code` and wait for its log and listing output.
    fn submit(&self, code: &str) -> Result<SubmitResult>;

    /// Run `code` keeping only the log side effects.
    fn submit_async(&self, code: &str) -> Result<()>;

    /// Next value of the session's monotonic object counter.
    fn next_object_counter(&self) -> String;

    /// When set, code is printed instead of executed.
    fn explain_only(&self) -> bool;

    /// Wrap `table` as a session-side table reference under `scope`.
    fn materialize_table(&self, table: &str, scope: &str) -> Result<TableHandle>;
}
