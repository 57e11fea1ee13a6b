use std::path::PathBuf;

use thiserror::Error;

use crate::model::AdaptationSetId;

/// Invalid input or settings. Aborts the current decision cycle.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("adaptation set {0} has no representations")]
    EmptyAdaptationSet(AdaptationSetId),
    #[error("unknown ABR strategy: {0:?}")]
    UnknownStrategy(String),
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Internal inconsistency in the controller. Always a bug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error(
        "rate map of adaptation set {adaptation_set} selected bitrate {bitrate} \
         which no representation carries"
    )]
    BitrateNotFound {
        adaptation_set: AdaptationSetId,
        bitrate: u64,
    },
}

#[derive(Debug, Error)]
pub enum AbrError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),
}
