use std::{
    cell::{Cell, RefCell},
    path::Path,
};

use anyhow::{bail, Result};
use sasstat::{
    Lookup, ProcKind, ProcOptions, ProcResults, Session, Stat, StatError, SubmitResult,
    TableHandle,
};

/// Records every submission; answers `%listdata` and `%getdata` calls with
/// canned output.
#[derive(Default)]
struct MockSession {
    explain: bool,
    counter: Cell<u32>,
    submitted: RefCell<Vec<String>>,
    submitted_async: RefCell<Vec<String>>,
    listing_log: Option<String>,
    fail_listing: bool,
}

impl MockSession {
    fn live(attrs: &[&str]) -> Self {
        let log = format!("NOTE: listing\nstartparse9878\n{}\nendparse9878\n", attrs.join("\n"));
        Self { listing_log: Some(log), ..Default::default() }
    }

    fn explain() -> Self {
        Self { explain: true, ..Default::default() }
    }

    fn sync_count(&self) -> usize {
        self.submitted.borrow().len()
    }

    fn total_count(&self) -> usize {
        self.submitted.borrow().len() + self.submitted_async.borrow().len()
    }
}

impl Session for MockSession {
    fn submit(&self, code: &str) -> Result<SubmitResult> {
        self.submitted.borrow_mut().push(code.to_string());
        if code.starts_with("%listdata") {
            if self.fail_listing {
                bail!("connection reset");
            }
            return Ok(SubmitResult { log: self.listing_log.clone().unwrap_or_default(), listing: String::new() });
        }
        Ok(SubmitResult { log: String::new(), listing: format!("<table>{}</table>", code) })
    }

    fn submit_async(&self, code: &str) -> Result<()> {
        self.submitted_async.borrow_mut().push(code.to_string());
        Ok(())
    }

    fn next_object_counter(&self) -> String {
        self.counter.set(self.counter.get() + 1);
        self.counter.get().to_string()
    }

    fn explain_only(&self) -> bool {
        self.explain
    }

    fn materialize_table(&self, table: &str, scope: &str) -> Result<TableHandle> {
        Ok(TableHandle::new(scope, table))
    }
}

fn class_opts() -> ProcOptions {
    ProcOptions::new(TableHandle::new("sashelp", "class"))
}

#[test]
fn test_init_submits_prelude() -> Result<()> {
    let session = MockSession::live(&[]);
    let _stat = Stat::new(&session, Path::new("/macros"))?;
    let sent = session.submitted_async.borrow();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("%include '/macros/libname_gen.sas'"));
    Ok(())
}

#[test]
fn test_live_run_lists_attributes() -> Result<()> {
    let session = MockSession::live(&["PLOT", "FITSTATISTICS"]);
    let stat = Stat::new(&session, Path::new("."))?;
    let res = stat.reg(&class_opts().model("weight=height"))?;

    assert_eq!(res.object_name(), "reg1");
    assert!(!res.is_explain_only());
    assert_eq!(res.attributes(), ["PLOT", "FITSTATISTICS"]);

    let primary = session.submitted_async.borrow()[1].clone();
    assert!(primary.starts_with("%macro proccall(d);"));
    assert!(primary.contains("proc reg data=sashelp.class plots(unpack)=all;"));
    assert!(primary.contains("\tmodel weight=height;"));
    assert!(primary.ends_with("%mangobj(reg1,reg,class);"));
    assert_eq!(session.submitted.borrow().as_slice(), ["%listdata(reg1);"]);
    Ok(())
}

#[test]
fn test_every_kind_uses_its_prefix() -> Result<()> {
    let session = MockSession::live(&[]);
    let stat = Stat::new(&session, Path::new("."))?;
    let names: Vec<String> = [
        stat.hpsplit(&class_opts())?,
        stat.reg(&class_opts())?,
        stat.mixed(&class_opts())?,
        stat.glm(&class_opts())?,
        stat.logistic(&class_opts())?,
    ]
    .iter()
    .map(|r| r.object_name().to_string())
    .collect();
    assert_eq!(names, ["hps1", "reg2", "mix3", "glm4", "log5"]);
    for name in &names {
        assert!(name.len() <= 8);
    }
    Ok(())
}

#[test]
fn test_explain_only_run_submits_nothing() -> Result<()> {
    let session = MockSession::explain();
    let stat = Stat::new(&session, Path::new("."))?;
    let res = stat.run(ProcKind::Glm, &class_opts().cls("sex"))?;

    assert!(res.is_explain_only());
    assert!(res.attributes().is_empty());
    assert_eq!(session.total_count(), 0);

    assert_eq!(res.get("fitstatistics")?, Lookup::ExplainOnly);
    assert_eq!(res.get("bogus")?, Lookup::ExplainOnly);
    assert_eq!(session.total_count(), 0);
    Ok(())
}

#[test]
fn test_explain_only_init_submits_nothing() -> Result<()> {
    let session = MockSession::explain();
    let _stat = Stat::new(&session, Path::new("/macros"))?;
    assert_eq!(session.total_count(), 0);
    Ok(())
}

#[test]
fn test_listing_failure_yields_empty_attributes() -> Result<()> {
    let session = MockSession { fail_listing: true, ..MockSession::live(&["PLOT"]) };
    let stat = Stat::new(&session, Path::new("."))?;
    let res = stat.mixed(&class_opts())?;
    assert!(res.attributes().is_empty());
    assert!(!res.is_explain_only());
    Ok(())
}

#[test]
fn test_missing_markers_yield_empty_attributes() -> Result<()> {
    let session = MockSession { listing_log: Some("ERROR: macro not found".into()), ..Default::default() };
    let stat = Stat::new(&session, Path::new("."))?;
    let res = stat.logistic(&class_opts())?;
    assert!(res.attributes().is_empty());
    Ok(())
}

#[test]
fn test_get_known_attribute_resubmits_every_time() -> Result<()> {
    let session = MockSession::default();
    let res = ProcResults::new(
        vec!["PLOT".to_string(), "FITSTATISTICS".to_string()],
        &session,
        "reg1".to_string(),
        false,
    );

    let first = res.get("plot")?;
    assert_eq!(session.sync_count(), 1);
    match first {
        Lookup::Payload(html) => assert_eq!(html.as_str(), "<table>%getdata(reg1, plot);</table>"),
        other => panic!("expected payload, got {:?}", other),
    }

    res.get("plot")?;
    assert_eq!(session.sync_count(), 2);
    Ok(())
}

#[test]
fn test_get_unknown_attribute_fails_without_submitting() {
    let session = MockSession::default();
    let res = ProcResults::new(vec!["PLOT".to_string()], &session, "reg1".to_string(), false);
    let err = res.get("bogus").unwrap_err();
    assert!(matches!(
        err,
        StatError::UnknownAttribute { ref object, ref attribute } if object == "reg1" && attribute == "bogus"
    ));
    assert_eq!(session.sync_count(), 0);
}

#[test]
fn test_internal_members_bypass_attribute_gate() -> Result<()> {
    let session = MockSession::default();
    let res = ProcResults::new(vec!["PLOT".to_string()], &session, "glm3".to_string(), false);
    assert_eq!(res.get("_name")?, Lookup::Internal("glm3".into()));
    assert_eq!(res.get("_attrs")?, Lookup::Internal("PLOT".into()));
    assert_eq!(res.get("_explain_only")?, Lookup::Internal("false".into()));
    assert!(res.get("_nothing").is_err());
    assert_eq!(session.sync_count(), 0);
    Ok(())
}

#[test]
fn test_submission_failure_propagates() {
    struct Down;
    impl Session for Down {
        fn submit(&self, _code: &str) -> Result<SubmitResult> { bail!("session closed") }
        fn submit_async(&self, _code: &str) -> Result<()> { bail!("session closed") }
        fn next_object_counter(&self) -> String { "1".into() }
        fn explain_only(&self) -> bool { false }
        fn materialize_table(&self, table: &str, scope: &str) -> Result<TableHandle> {
            Ok(TableHandle::new(scope, table))
        }
    }

    let err = Stat::new(&Down, Path::new(".")).err().expect("prelude should fail");
    assert_eq!(err.to_string(), "session closed");
}

#[test]
fn test_sasdata_scopes_under_object_name() -> Result<()> {
    let session = MockSession::default();
    let res = ProcResults::new(vec![], &session, "hps2".to_string(), false);
    let table = res.sasdata("ParameterEstimates")?;
    assert_eq!(table.to_string(), "_hps2.ParameterEstimates");
    Ok(())
}
