use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed JSON snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write CSV output: {0}")]
    Export(#[from] csv::Error),
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{kind} {id}: {field} = {value} is out of range")]
    OutOfRange {
        kind: &'static str,
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("payment {id} has a non-positive amount")]
    NonPositiveAmount { id: String },
    #[error("unknown {kind} value {value:?}")]
    UnknownStatus { kind: &'static str, value: String },
    #[error("unknown facet {value:?} for {domain}")]
    UnknownFacet { domain: &'static str, value: String },
    #[error("unknown domain {0:?}")]
    UnknownDomain(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
