//! Build SAS/STAT procedure calls, run them through a SAS session, and fetch
//! their results on demand.

pub mod config;
pub mod error;
pub mod printer;
pub mod results;
pub mod session;
pub mod stat;

pub use error::StatError;
pub use results::{Html, Lookup, ProcResults};
pub use session::{Session, StdioSession, SubmitResult, TableHandle};
pub use stat::{ProcKind, ProcOptions, Stat};
