//! SAS/STAT procedure invocation.
//!
//! [`Stat`] renders a procedure call for one of the supported kinds, runs it
//! through a [`Session`], and asks the engine which result attributes the
//! produced object exposes. The answer comes back as a [`ProcResults`].

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::{
    error::Result,
    printer::TextPrinter,
    results::ProcResults,
    session::Session,
};

pub mod template;

pub use template::{
    object_name, parse_attribute_list, render_proc_call, ProcKind, ProcOptions, ProcSpec,
    MAX_NAME_LEN, PROC_TABLE,
};

pub struct Stat<'s> {
    session: &'s dyn Session,
    printer: TextPrinter,
}

impl<'s> Stat<'s> {
    /// Load the helper macros (`%listdata`, `%getdata`, `%mangobj`) from
    /// `libname_gen.sas` in `macro_dir`.
    pub fn new(session: &'s dyn Session, macro_dir: &Path) -> Result<Self> {
        Self::with_printer(session, macro_dir, TextPrinter::default())
    }

    pub fn with_printer(session: &'s dyn Session, macro_dir: &Path, printer: TextPrinter) -> Result<Self> {
        let code = prelude(macro_dir);
        if session.explain_only() {
            printer.print(&code);
        } else {
            session.submit_async(&code)?;
            debug!(code = %code, "Initialized SAS macros");
        }
        Ok(Self { session, printer })
    }

    pub fn session(&self) -> &'s dyn Session {
        self.session
    }

    #[instrument(skip_all, fields(kind = %kind))]
    pub fn run(&self, kind: ProcKind, opts: &ProcOptions) -> Result<ProcResults<'s>> {
        let objname = object_name(kind, &self.session.next_object_counter());
        let explain = self.session.explain_only();
        let code = render_proc_call(kind, &objname, opts, !explain);
        debug!(code = %code, "Procedure submission");

        if explain {
            self.printer.print(&code);
            return Ok(ProcResults::new(Vec::new(), self.session, objname, true).with_printer(self.printer));
        }

        self.session.submit_async(&code)?;
        let attrs = match self.object_methods(&objname) {
            Ok(attrs) => attrs,
            Err(err) => {
                warn!(object = %objname, error = %err, "Attribute listing failed, continuing without attributes");
                Vec::new()
            }
        };
        Ok(ProcResults::new(attrs, self.session, objname, false).with_printer(self.printer))
    }

    fn object_methods(&self, objname: &str) -> Result<Vec<String>> {
        let code = template::listdata_call(objname);
        debug!(code = %code, "Object method macro call");
        let res = self.session.submit(&code)?;
        debug!(log = %res.log, "SAS log");
        let attrs = parse_attribute_list(&res.log)?;
        debug!(?attrs, "PROC attribute list");
        Ok(attrs)
    }

    /// PROC HPSPLIT: classification and regression trees.
    pub fn hpsplit(&self, opts: &ProcOptions) -> Result<ProcResults<'s>> {
        self.run(ProcKind::HpSplit, opts)
    }

    pub fn reg(&self, opts: &ProcOptions) -> Result<ProcResults<'s>> {
        self.run(ProcKind::Reg, opts)
    }

    pub fn mixed(&self, opts: &ProcOptions) -> Result<ProcResults<'s>> {
        self.run(ProcKind::Mixed, opts)
    }

    pub fn glm(&self, opts: &ProcOptions) -> Result<ProcResults<'s>> {
        self.run(ProcKind::Glm, opts)
    }

    pub fn logistic(&self, opts: &ProcOptions) -> Result<ProcResults<'s>> {
        self.run(ProcKind::Logistic, opts)
    }
}

fn prelude(macro_dir: &Path) -> String {
    format!(
        "options pagesize=max; %include '{}'; ",
        macro_dir.join("libname_gen.sas").display()
    )
}
