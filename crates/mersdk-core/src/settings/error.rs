//! Error types for the settings document

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the settings document
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The file exists but could not be read
    #[error("Settings file not readable: {path}: {source}")]
    Unreadable {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written
    #[error("Failed to write settings file {path}: {source}")]
    WriteFailed {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Other I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed XML that is not a settings document
    #[error("Invalid settings document: {0}")]
    InvalidFormat(String),

    /// Document older than the supported schema
    #[error("Unsupported settings version {found} (minimum {minimum})")]
    UnsupportedVersion {
        /// Version in the file
        found: i64,
        /// Oldest supported version
        minimum: i64,
    },
}
