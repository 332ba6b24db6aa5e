use clap::Parser;
use sasstat::{ProcKind, TableHandle};

#[derive(Parser, Debug, Clone)]
#[command(name = "sasstat", about = "Run SAS/STAT procedures and inspect their results", version)]
pub struct Cli {
    /// Procedure to run (hpsplit, reg, mixed, glm, logistic).
    #[arg(value_name = "PROC")]
    pub kind: ProcKind,

    /// Input table as LIBREF.TABLE (one-level names use WORK).
    #[arg(long)]
    pub data: TableHandle,

    /// MODEL statement body, e.g. "weight=height".
    #[arg(long)]
    pub model: Option<String>,

    /// CLASS variables.
    #[arg(long)]
    pub cls: Option<String>,

    /// Request a MEANS statement.
    #[arg(long)]
    pub means: Option<String>,

    /// BY variables.
    #[arg(long)]
    pub by: Option<String>,

    /// ESTIMATE statement body.
    #[arg(long)]
    pub estimate: Option<String>,

    /// WEIGHT variable.
    #[arg(long)]
    pub weight: Option<String>,

    /// LSMEANS statement body.
    #[arg(long)]
    pub lsmeans: Option<String>,

    /// Print the generated code instead of running it.
    #[arg(long)]
    pub explain: bool,

    /// Fetch a result attribute after the run.
    /// Can be used multiple times: --attr fitstatistics --attr parameterestimates
    #[arg(long = "attr", action = clap::ArgAction::Append)]
    pub attr: Vec<String>,

    /// Print the attribute list and fetched attributes as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
