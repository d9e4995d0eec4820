//! Error types for the timeline core

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the timeline core
#[derive(Debug, Error)]
pub enum Error {
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Glossary matcher error: {0}")]
    Matcher(#[from] regex::Error),
}

/// Errors raised while loading the content documents
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {document}: {source}")]
    Parse {
        document: String,
        source: serde_json::Error,
    },
}

/// Errors raised while loading or validating a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
