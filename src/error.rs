//! Error types for each engine boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Horizon;

/// Errors raised while processing a single instrument or driving a cycle.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("processing failed for {instrument}: {reason}")]
    InstrumentProcessing { instrument: String, reason: String },

    #[error("non-finite {horizon} super score for {instrument}")]
    NonFiniteScore { instrument: String, horizon: Horizon },

    #[error("universe error: {0}")]
    Universe(#[from] UniverseError),

    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

/// Errors from instrument-universe providers.
#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("source '{0}' returned no instruments")]
    Empty(String),

    #[error("every universe source failed")]
    Exhausted,
}

/// Errors from reading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: String, value: String },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from reporting sinks.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
