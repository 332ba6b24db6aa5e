//! Line-mode SAS session: one long-lived `sas -stdio` process.
//!
//! Each submission is bracketed by `proc printto` so its log and listing land
//! in files of their own, then followed by a data step that writes a sentinel
//! line to the default listing (stdout). Reading stdout up to that line is the
//! whole round trip; macros, librefs and WORK tables stay in the process.

use std::{
    cell::{Cell, RefCell},
    fs,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use anyhow::{anyhow, bail, Result};
use tempfile::TempDir;
use tracing::debug;

use super::{Session, SubmitResult, TableHandle};
use crate::config::Config;

/// Counter values stay within five digits so a three-letter prefix plus the
/// counter still fits an eight-character SAS name. `object_name` truncates
/// longer counters to their trailing digits, where distinct counters such as
/// `123456` and `23456` would collide; wrapping here keeps that from happening
/// until 99999 objects have been created in one session.
const COUNTER_LIMIT: u32 = 99_999;

const SENTINEL_PREFIX: &str = "SASSTAT_DONE_";

struct SasProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

pub struct StdioSession {
    executable: String,
    options: Vec<String>,
    explain_only: bool,
    counter: Cell<u32>,
    submissions: Cell<u32>,
    // Started on first submission; explain-only sessions never start one.
    process: RefCell<Option<SasProcess>>,
    workdir: TempDir,
}

impl StdioSession {
    pub fn new(executable: impl Into<String>, options: Vec<String>, explain_only: bool) -> Result<Self> {
        let workdir = tempfile::Builder::new()
            .prefix("sasstat")
            .tempdir()
            .map_err(|e| anyhow!("Failed to create SAS work directory: {}", e))?;
        Ok(Self {
            executable: executable.into(),
            options,
            explain_only,
            counter: Cell::new(0),
            submissions: Cell::new(0),
            process: RefCell::new(None),
            workdir,
        })
    }

    pub fn from_config(cfg: &Config, explain_only: bool) -> Result<Self> {
        let executable = cfg.get("SAS_EXECUTABLE").unwrap_or_else(|| "sas".to_string());
        let options = cfg
            .get("SAS_OPTIONS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Self::new(executable, options, explain_only)
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    fn file(&self, stem: &str, ext: &str) -> PathBuf {
        self.workdir.path().join(format!("{}.{}", stem, ext))
    }

    fn spawn(&self) -> Result<SasProcess> {
        // Output written outside a printto bracket goes here and is not read.
        let stderr = fs::File::create(self.file("session", "log"))?;
        debug!(executable = %self.executable, "Starting SAS session");
        let mut child = Command::new(&self.executable)
            .args(&self.options)
            .arg("-stdio")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| anyhow!("Failed to start '{}': {}", self.executable, e))?;
        let stdin = child.stdin.take().ok_or_else(|| anyhow!("no stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| anyhow!("no stdout"))?;
        Ok(SasProcess { child, stdin, stdout: BufReader::new(stdout) })
    }

    fn run(&self, code: &str) -> Result<SubmitResult> {
        let n = self.submissions.get() + 1;
        self.submissions.set(n);
        let stem = format!("submit{}", n);
        let log = self.file(&stem, "log");
        let lst = self.file(&stem, "lst");
        let tag = format!("{}{}", SENTINEL_PREFIX, n);
        let block = wrap_submission(code, &log, &lst, &tag);

        let mut slot = self.process.borrow_mut();
        if slot.is_none() {
            *slot = Some(self.spawn()?);
        }
        let outcome = match slot.as_mut() {
            Some(sas) => exchange(sas, &block, &tag),
            None => Err(anyhow!("SAS session is not running")),
        };
        if let Err(err) = outcome {
            // A session that lost its place in the stream cannot be reused.
            if let Some(mut dead) = slot.take() {
                let _ = dead.child.kill();
                let _ = dead.child.wait();
            }
            return Err(err);
        }

        Ok(SubmitResult {
            log: fs::read_to_string(&log).unwrap_or_default(),
            listing: fs::read_to_string(&lst).unwrap_or_default(),
        })
    }
}

/// Send `block` and wait for the line carrying `tag`.
fn exchange(sas: &mut SasProcess, block: &str, tag: &str) -> Result<()> {
    sas.stdin.write_all(block.as_bytes())?;
    sas.stdin.flush()?;
    let mut line = String::new();
    loop {
        line.clear();
        if sas.stdout.read_line(&mut line)? == 0 {
            bail!("SAS exited before finishing the submission");
        }
        if line.trim() == tag {
            return Ok(());
        }
    }
}

fn wrap_submission(code: &str, log: &Path, lst: &Path, tag: &str) -> String {
    format!(
        "proc printto log=\"{}\" print=\"{}\" new; run;\n\
         {}\n\
         ;*';*\";*/;\n\
         proc printto; run;\n\
         data _null_; file print notitles; put \"{}\"; run;\n",
        log.display(),
        lst.display(),
        code,
        tag
    )
}

impl Session for StdioSession {
    fn submit(&self, code: &str) -> Result<SubmitResult> {
        self.run(code)
    }

    fn submit_async(&self, code: &str) -> Result<()> {
        let res = self.run(code)?;
        debug!(log = %res.log, "SAS log");
        Ok(())
    }

    fn next_object_counter(&self) -> String {
        let next = if self.counter.get() >= COUNTER_LIMIT { 1 } else { self.counter.get() + 1 };
        self.counter.set(next);
        next.to_string()
    }

    fn explain_only(&self) -> bool {
        self.explain_only
    }

    fn materialize_table(&self, table: &str, scope: &str) -> Result<TableHandle> {
        Ok(TableHandle::new(scope, table))
    }
}

impl Drop for StdioSession {
    fn drop(&mut self) {
        if let Some(mut sas) = self.process.get_mut().take() {
            let _ = sas.stdin.write_all(b"endsas;\n");
            let _ = sas.stdin.flush();
            drop(sas.stdin);
            let _ = sas.child.wait();
        }
    }
}
