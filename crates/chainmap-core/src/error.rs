use thiserror::Error;

/// Top-level error type for chainmap.
///
/// Only structural failures are errors. Unknown vulnerability types (in the
/// default lenient mode), rejected cycle edges, truncated enumeration, and
/// empty results all degrade to warnings or flags on the analysis result.
#[derive(Error, Debug)]
pub enum ChainmapError {
    #[error("Invalid scan input: {0}")]
    InvalidInput(String),

    #[error("Duplicate vulnerability id in scan: {id}")]
    DuplicateVulnerabilityId { id: String },

    #[error("Unknown vulnerability type {vuln_type:?} on {vulnerability_id} (strict mode)")]
    UnknownVulnerabilityType {
        vulnerability_id: String,
        vuln_type: String,
    },

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChainmapError>;
