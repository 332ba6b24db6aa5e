//! Error types for procedure invocation and result lookup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatError {
    /// A live result object was asked for an attribute the engine never listed.
    #[error("result object '{object}' has no attribute '{attribute}'")]
    UnknownAttribute { object: String, attribute: String },

    /// The attribute listing in the log was not delimited as expected.
    #[error("marker line '{marker}' not found in SAS log")]
    MissingMarker { marker: &'static str },

    #[error("unknown procedure '{name}' (expected one of: hpsplit, reg, mixed, glm, logistic)")]
    UnknownProcedure { name: String },

    #[error("invalid table reference '{reference}': expected LIBREF.TABLE or TABLE")]
    InvalidTable { reference: String },

    /// Failures raised by the session while running code, passed through as-is.
    #[error(transparent)]
    Session(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StatError>;
