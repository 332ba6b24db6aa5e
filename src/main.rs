mod cli;

use std::collections::BTreeMap;

use anyhow::Result;
use sasstat::{
    config::Config, printer::TextPrinter, Html, Lookup, ProcOptions, Stat, StdioSession,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Report<'a> {
    object: &'a str,
    explain_only: bool,
    attributes: &'a [String],
    values: BTreeMap<String, Html>,
}

fn init_logging(cfg: &Config) {
    let level = cfg.get("SASSTAT_LOG").unwrap_or_else(|| "warn".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load config
    let cfg = Config::load();
    init_logging(&cfg);

    let explain = args.explain || cfg.get_bool("SASSTAT_EXPLAIN_ONLY");
    let session = StdioSession::from_config(&cfg, explain)?;
    let printer = TextPrinter::from_config(&cfg);
    let stat = Stat::with_printer(&session, &cfg.macro_path(), printer)?;

    let opts = ProcOptions {
        data: args.data.clone(),
        model: args.model.clone(),
        cls: args.cls.clone(),
        means: args.means.clone(),
        by: args.by.clone(),
        estimate: args.estimate.clone(),
        weight: args.weight.clone(),
        lsmeans: args.lsmeans.clone(),
    };
    let results = stat.run(args.kind, &opts)?;

    let mut values = BTreeMap::new();
    for attr in &args.attr {
        match results.get(attr)? {
            Lookup::Payload(html) => {
                values.insert(attr.clone(), html);
            }
            Lookup::Internal(v) => {
                values.insert(attr.clone(), Html::from(v));
            }
            Lookup::ExplainOnly => {}
        }
    }

    if args.json {
        let report = Report {
            object: results.object_name(),
            explain_only: results.is_explain_only(),
            attributes: results.attributes(),
            values,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !results.is_explain_only() {
        printer.print(&format!("{} attributes:", results.object_name()));
        for a in results.attributes() {
            println!("  {}", a);
        }
    }
    for (attr, html) in values {
        printer.print(&format!("=== {} ===", attr));
        println!("{}", html);
    }
    Ok(())
}
