//! Error types for configuration loading and decoding.
//!
//! Accessors (`get`, typed getters, `is_set`) are total functions and never
//! return these errors; absence and coercion failure resolve to `None` or a
//! zero value instead. Errors only arise from loading, merging, and
//! structured decoding.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or decoding configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No candidate file was found on the search path.
    ///
    /// Informational: callers may ignore it and proceed on defaults.
    #[error("configuration file {name:?} not found in {locations:?}")]
    NotFound {
        /// The configured base name of the file (without extension).
        name: String,
        /// The directories that were searched.
        locations: Vec<PathBuf>,
    },

    /// The requested format is not one the decoder recognizes.
    #[error("unsupported configuration format: {0:?}")]
    UnsupportedFormat(String),

    /// A config file could not be read from disk.
    #[error("failed to read configuration file: {path}")]
    Read {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A document could not be parsed. The existing trees are left
    /// unmodified when this is returned from a read or merge.
    #[error("failed to parse {format} configuration: {message}")]
    Decode {
        /// The format that was being parsed.
        format: String,
        /// Parser diagnostic.
        message: String,
    },

    /// Deserializing the resolved settings into the caller's type failed.
    #[error("failed to decode settings into target type: {0}")]
    DecodeTarget(#[from] serde_json::Error),

    /// Strict decode found input keys with no matching destination field.
    #[error("settings contain keys with no matching field: {}", unmatched.join(", "))]
    StrictDecode {
        /// Every unconsumed key, sorted.
        unmatched: Vec<String>,
    },
}

impl ConfigError {
    /// File-not-found error for a search over `locations`.
    pub fn not_found(name: impl Into<String>, locations: Vec<PathBuf>) -> Self {
        Self::NotFound {
            name: name.into(),
            locations,
        }
    }

    /// Read failure for a concrete path.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Parse failure in the named format.
    pub fn decode(format: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            format: format.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error is the informational "no file found" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias used throughout the crate.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
