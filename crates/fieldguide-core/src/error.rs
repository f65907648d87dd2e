//! Error types for the content pipeline.
//!
//! Only [`ConfigError`] is fatal. Upstream, integrity and catalog failures are reported to the
//! caller so a build can degrade to empty or partial tables.

use std::path::PathBuf;

use thiserror::Error;

/// Missing or unreadable configuration. Aborts startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingSecret(&'static str),
    #[error("config load failed: {0}")]
    Load(#[from] config::ConfigError),
    #[error("page manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },
}

/// Failure talking to the knowledge-base API. Recoverable: the dataset becomes an empty table.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("knowledge base returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("knowledge base request failed: {0}")]
    Transport(String),
    #[error("knowledge base request timed out after {0}s")]
    Timeout(u64),
    #[error("knowledge base response could not be decoded: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status when the failure came from a non-200 response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A knowledge-base record without a property the normalizer requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("record {record_id}: missing property {property}")]
    MissingProperty { record_id: String, property: String },
}

/// Notebook corpus could not be scanned at all.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("content root {0} does not exist or is not a directory")]
    ContentRoot(PathBuf),
    #[error("invalid notebook glob '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Invalid tag filter request.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("at least one non-empty tag is required")]
    NoTags,
    #[error("tag pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}
