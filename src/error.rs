//! Error taxonomy for the ETL run.
//!
//! Malformed dates and amounts are per-record: under the default policy they
//! degrade the field to NULL and the run continues. Schema and store errors
//! are fatal; there is no partial-write recovery.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    /// A Release_Date value that is not day-month-year formatted.
    #[error("line {line}: unparseable release date '{value}'")]
    MalformedDate { line: usize, value: String },

    /// A Budget/Revenue value with non-numeric residue after stripping the
    /// currency symbol and thousands separators.
    #[error("line {line}: unparseable {field} amount '{value}'")]
    MalformedCurrency {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// A stored table whose column layout does not match the movie schema.
    #[error("table '{table}' does not match the expected movie layout: {details}")]
    SchemaMismatch { table: String, details: String },

    /// A table name that is not a plain SQL identifier.
    #[error("invalid table name '{name}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidTableName { name: String },

    /// The persistent store could not be opened or created.
    #[error("cannot open movie store at {path:?}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}
