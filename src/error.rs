//! Error types for the detector.
//!
//! The taxonomy separates caller mistakes (no model loaded, bad dataset)
//! from artifact problems (missing file, corrupt contents, version skew)
//! so the CLI and HTTP layers can map each to a precise response instead
//! of a generic failure message.

use std::path::PathBuf;
use thiserror::Error;

/// Detector error taxonomy.
#[derive(Error, Debug)]
pub enum DetectorError {
    /// Prediction requested before a model was trained or loaded
    #[error("model not loaded: train a model or load one from disk first")]
    ModelNotLoaded,

    /// Model file could not be read or written
    #[error("model file {path}: {source}")]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model artifact failed to (de)serialize
    #[error("model artifact is corrupt: {0}")]
    ModelFormat(#[source] serde_json::Error),

    /// Config file could not be read
    #[error("config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("config file {path} is malformed: {source}")]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Artifact was written by an incompatible release
    #[error("model artifact format version {found} is not supported (expected {expected})")]
    ModelVersion { expected: u32, found: u32 },

    /// Artifact carries no feature schema to project against
    #[error("model artifact carries an empty feature schema")]
    EmptySchema,

    /// Dataset file could not be read or written
    #[error("dataset file {path}: {source}")]
    DatasetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset CSV has a malformed header or row
    #[error("dataset parse error at line {line}: {message}")]
    DatasetParse { line: usize, message: String },

    /// Training requested on an empty dataset
    #[error("dataset contains no samples")]
    EmptyDataset,
}

/// Result type alias for detector operations.
pub type Result<T> = std::result::Result<T, DetectorError>;
