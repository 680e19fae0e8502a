//! Error types for `XliffSync`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `XliffSync` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A synchronized file could not be moved into place.
    #[error("failed to persist {path}: {message}")]
    PersistError {
        /// The destination path.
        path: PathBuf,
        /// The underlying error message.
        message: String,
    },

    // ==================== Document Errors ====================
    /// The text is not well-formed XML (unbalanced tags, invalid entities, ...).
    #[error("malformed document: {message}")]
    MalformedDocument {
        /// Description of what is malformed, with the byte position if known.
        message: String,
    },

    /// The root `version` attribute is absent or not one of 1.2 / 2.0.
    #[error("unsupported XLIFF version: {}", version.as_deref().unwrap_or("(none)"))]
    UnsupportedVersion {
        /// The version found in the document, if any.
        version: Option<String>,
    },

    /// The document does not declare a source language.
    #[error("XLIFF document has no source language")]
    MissingSourceLanguage,

    // ==================== Synchronization Errors ====================
    /// Synchronization produced nothing that could be written.
    #[error("no output generated: {reason}")]
    NoOutputGenerated {
        /// Why no output could be produced.
        reason: String,
    },

    /// Neither a target document nor a target language was supplied.
    #[error("no target file or target language specified")]
    NoTargetSpecified,

    /// No base (generated) translation file could be resolved.
    #[error("no base translation file found in {dir}")]
    BaseFileNotFound {
        /// The directory that was searched.
        dir: PathBuf,
    },

    // ==================== Configuration Errors ====================
    /// A setting has a value that cannot be used.
    #[error("invalid setting '{key}': {message}")]
    InvalidSetting {
        /// The settings key.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// A needs-work rule name that is not known.
    #[error("unknown translation rule: {0}")]
    UnknownRule(String),

    /// An equivalent-language pattern is not a valid regular expression.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // ==================== Parsing Errors ====================
    /// XML writer error.
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    // ==================== File System Errors ====================
    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    /// Shorthand for a [`Error::MalformedDocument`].
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            message: message.into(),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `XliffSync` operations.
pub type Result<T> = std::result::Result<T, Error>;
