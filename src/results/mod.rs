//! Lazily fetched results of a procedure run.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::{
    error::{Result, StatError},
    printer::TextPrinter,
    session::{Session, TableHandle},
    stat::template::getdata_call,
};

const EXPLAIN_NOTICE: &str =
    "This result object was created in explain-only mode, so it has no results";

/// Listing output of an attribute fetch, ready to be shown as HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Html(String);

impl Html {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Html {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of [`ProcResults::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Fetched from the engine.
    Payload(Html),
    /// One of the object's own members (`_name`, `_attrs`, `_explain_only`).
    Internal(String),
    /// Explain-only object: a notice was printed and nothing was fetched.
    ExplainOnly,
}

pub struct ProcResults<'s> {
    attrs: Vec<String>,
    name: String,
    session: &'s dyn Session,
    explain_only: bool,
    printer: TextPrinter,
}

impl<'s> ProcResults<'s> {
    pub fn new(attrs: Vec<String>, session: &'s dyn Session, name: String, explain_only: bool) -> Self {
        Self { attrs, name, session, explain_only, printer: TextPrinter::default() }
    }

    pub fn with_printer(mut self, printer: TextPrinter) -> Self {
        self.printer = printer;
        self
    }

    /// Attribute names reported by the engine, in log order.
    pub fn attributes(&self) -> &[String] {
        &self.attrs
    }

    pub fn object_name(&self) -> &str {
        &self.name
    }

    pub fn is_explain_only(&self) -> bool {
        self.explain_only
    }

    /// Fetch `attr`. Names starting with `_` refer to this object's own
    /// members and never reach the engine. Everything else must appear
    /// (upper-cased) in [`attributes`](Self::attributes); every call
    /// re-submits, nothing is cached.
    pub fn get(&self, attr: &str) -> Result<Lookup> {
        if attr.starts_with('_') {
            return self.internal(attr);
        }
        let known = self.attrs.contains(&attr.to_uppercase());
        if self.explain_only {
            self.printer.notice(EXPLAIN_NOTICE);
            return Ok(Lookup::ExplainOnly);
        }
        if !known {
            return Err(self.unknown(attr));
        }
        let code = getdata_call(&self.name, attr);
        debug!(code = %code, "Attribute fetch");
        let res = self.session.submit(&code)?;
        Ok(Lookup::Payload(Html(res.listing)))
    }

    fn internal(&self, attr: &str) -> Result<Lookup> {
        let value = match attr {
            "_name" => self.name.clone(),
            "_attrs" => self.attrs.join(" "),
            "_explain_only" => self.explain_only.to_string(),
            _ => return Err(self.unknown(attr)),
        };
        Ok(Lookup::Internal(value))
    }

    fn unknown(&self, attr: &str) -> StatError {
        StatError::UnknownAttribute { object: self.name.clone(), attribute: attr.to_string() }
    }

    /// Session-side handle on `table`, scoped under `_<object name>`.
    pub fn sasdata(&self, table: &str) -> Result<TableHandle> {
        let scope = format!("_{}", self.name);
        Ok(self.session.materialize_table(table, &scope)?)
    }
}

impl fmt::Debug for ProcResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcResults")
            .field("name", &self.name)
            .field("attrs", &self.attrs)
            .field("explain_only", &self.explain_only)
            .finish()
    }
}
