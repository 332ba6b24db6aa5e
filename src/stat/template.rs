//! Procedure catalog and SAS code templates.

use std::{fmt, str::FromStr};

use crate::{
    error::{Result, StatError},
    session::TableHandle,
};

/// Longest name SAS accepts for a libref, which generated object names become.
pub const MAX_NAME_LEN: usize = 8;

pub const START_MARKER: &str = "startparse9878";
pub const END_MARKER: &str = "endparse9878";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcKind {
    HpSplit,
    Reg,
    Mixed,
    Glm,
    Logistic,
}

#[derive(Debug, Clone, Copy)]
pub struct ProcSpec {
    pub kind: ProcKind,
    pub prefix: &'static str,
    pub keyword: &'static str,
    /// Whether `plots(unpack)=all` is requested instead of `plots=all`.
    pub unpack: bool,
}

pub const PROC_TABLE: &[ProcSpec] = &[
    ProcSpec { kind: ProcKind::HpSplit, prefix: "hps", keyword: "hpsplit", unpack: false },
    ProcSpec { kind: ProcKind::Reg, prefix: "reg", keyword: "reg", unpack: true },
    ProcSpec { kind: ProcKind::Mixed, prefix: "mix", keyword: "mixed", unpack: true },
    ProcSpec { kind: ProcKind::Glm, prefix: "glm", keyword: "glm", unpack: true },
    ProcSpec { kind: ProcKind::Logistic, prefix: "log", keyword: "logistic", unpack: true },
];

impl ProcKind {
    pub const ALL: [ProcKind; 5] = [
        ProcKind::HpSplit,
        ProcKind::Reg,
        ProcKind::Mixed,
        ProcKind::Glm,
        ProcKind::Logistic,
    ];

    pub fn spec(self) -> &'static ProcSpec {
        // Rows are in declaration order.
        &PROC_TABLE[self as usize]
    }

    pub fn keyword(self) -> &'static str {
        self.spec().keyword
    }
}

impl fmt::Display for ProcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ProcKind {
    type Err = StatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        PROC_TABLE
            .iter()
            .find(|spec| spec.keyword == lower)
            .map(|spec| spec.kind)
            .ok_or(StatError::UnknownProcedure { name: s.to_string() })
    }
}

/// Statement fragments for one procedure call. Fragments are pasted into the
/// generated code verbatim; empty fragments count as absent.
#[derive(Debug, Clone)]
pub struct ProcOptions {
    pub data: TableHandle,
    pub model: Option<String>,
    pub cls: Option<String>,
    pub means: Option<String>,
    pub by: Option<String>,
    pub estimate: Option<String>,
    pub weight: Option<String>,
    pub lsmeans: Option<String>,
}

impl ProcOptions {
    pub fn new(data: TableHandle) -> Self {
        Self {
            data,
            model: None,
            cls: None,
            means: None,
            by: None,
            estimate: None,
            weight: None,
            lsmeans: None,
        }
    }

    pub fn model(mut self, v: impl Into<String>) -> Self { self.model = Some(v.into()); self }
    pub fn cls(mut self, v: impl Into<String>) -> Self { self.cls = Some(v.into()); self }
    pub fn means(mut self, v: impl Into<String>) -> Self { self.means = Some(v.into()); self }
    pub fn by(mut self, v: impl Into<String>) -> Self { self.by = Some(v.into()); self }
    pub fn estimate(mut self, v: impl Into<String>) -> Self { self.estimate = Some(v.into()); self }
    pub fn weight(mut self, v: impl Into<String>) -> Self { self.weight = Some(v.into()); self }
    pub fn lsmeans(mut self, v: impl Into<String>) -> Self { self.lsmeans = Some(v.into()); self }
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Prefix plus counter, keeping the counter's trailing characters when the
/// whole would exceed [`MAX_NAME_LEN`]. Truncated counters can collide
/// (`123456` and `23456` both give `reg23456`); sessions keep their counters
/// short enough that this does not happen.
pub fn object_name(kind: ProcKind, counter: &str) -> String {
    let prefix = kind.spec().prefix;
    let room = MAX_NAME_LEN.saturating_sub(prefix.chars().count());
    let skip = counter.chars().count().saturating_sub(room);
    let mut name = String::from(prefix);
    name.extend(counter.chars().skip(skip));
    name
}

/// Render the procedure call. In live mode the step is wrapped in a
/// `%proccall` macro and followed by `%mangobj`, which registers the output
/// under `objname`.
pub fn render_proc_call(kind: ProcKind, objname: &str, opts: &ProcOptions, live: bool) -> String {
    let spec = kind.spec();
    let mut code = String::new();
    if live {
        code.push_str("%macro proccall(d);\n");
    }
    let plots = if spec.unpack { "plots(unpack)=all" } else { "plots=all" };
    code.push_str(&format!("proc {} data={} {};\n", spec.keyword, opts.data, plots));
    if let Some(cls) = present(&opts.cls) {
        code.push_str(&format!("\tclass {};\n", cls));
    }
    if let Some(model) = present(&opts.model) {
        code.push_str(&format!("\tmodel {};\n", model));
    }
    // The means statement is emitted with the class variables, not the
    // `means` fragment itself; `means` only switches the line on.
    if present(&opts.means).is_some() {
        code.push_str(&format!("\tmeans {};\n", opts.cls.as_deref().unwrap_or("")));
    }
    for (stmt, value) in [
        ("by", &opts.by),
        ("weight", &opts.weight),
        ("lsmeans", &opts.lsmeans),
        ("estimate", &opts.estimate),
    ] {
        if let Some(v) = present(value) {
            code.push_str(&format!("\t{} {};\n", stmt, v));
        }
    }
    code.push_str("run; quit; \n");
    if live {
        code.push_str("%mend;\n");
        code.push_str(&format!("%mangobj({},{},{});", objname, spec.keyword, opts.data.table));
    }
    code
}

pub fn listdata_call(objname: &str) -> String {
    format!("%listdata({});", objname)
}

pub fn getdata_call(objname: &str, attr: &str) -> String {
    format!("%getdata({}, {});", objname, attr)
}

/// Lines strictly between the start and end markers, in log order.
pub fn parse_attribute_list(log: &str) -> Result<Vec<String>> {
    let lines: Vec<&str> = log.lines().collect();
    let start = lines
        .iter()
        .position(|l| *l == START_MARKER)
        .ok_or(StatError::MissingMarker { marker: START_MARKER })?;
    let end = lines
        .iter()
        .position(|l| *l == END_MARKER)
        .ok_or(StatError::MissingMarker { marker: END_MARKER })?;
    Ok(lines
        .get(start + 1..end)
        .unwrap_or_default()
        .iter()
        .map(|l| l.to_string())
        .collect())
}
