//! Error types for memorizer
//!
//! All modules use `MemoResult<T>` as their return type. Failures of the
//! memoized function itself are not `MemoError`s; they travel through
//! [`CallError::Inner`] untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for memorizer operations
pub type MemoResult<T> = Result<T, MemoError>;

/// All errors that can occur in memorizer
#[derive(Error, Debug)]
pub enum MemoError {
    // Fingerprint errors
    #[error("Arguments for {function} cannot be serialized: {source}")]
    UnserializableArgs {
        function: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to canonicalize key material: {0}")]
    Canonicalize(String),

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    // Store errors
    #[error("Cached result for {fingerprint} does not match the expected type: {source}")]
    ResultDecode {
        fingerprint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save state to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid state file {path}: {reason}")]
    StateInvalid { path: PathBuf, reason: String },

    #[error("No cache entry matches: {0}")]
    EntryNotFound(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl MemoError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a state validation error
    pub fn state_invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StateInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Attribute an argument serialization failure to a named function
    pub(crate) fn for_function(self, name: &str) -> Self {
        match self {
            Self::UnserializableArgs { source, .. } => Self::UnserializableArgs {
                function: name.to_string(),
                source,
            },
            other => other,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnserializableArgs { .. } => {
                Some("Arguments must be JSON-representable (maps need string keys)")
            }
            Self::ResultDecode { .. } => {
                Some("Use a source-backed identity so signature changes miss the cache")
            }
            Self::EntryNotFound(_) => Some("Run: memorizer list"),
            Self::StateInvalid { .. } => {
                Some("A corrupt state file loads as an empty cache; delete it to start fresh")
            }
            Self::ConfigInvalid { .. } => Some("Run: memorizer config init --force"),
            _ => None,
        }
    }
}

/// Error returned by fallible memoized calls
///
/// Keeps the wrapped function's own error type intact so callers can match
/// on it exactly as they would without memoization.
#[derive(Error, Debug)]
pub enum CallError<E> {
    /// The memoization layer failed (arguments or cached value unusable)
    #[error(transparent)]
    Memo(#[from] MemoError),

    /// The wrapped function returned an error
    #[error("{0}")]
    Inner(E),
}

impl<E> CallError<E> {
    /// Return the wrapped function's error, if that is what this is
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Memo(_) => None,
        }
    }
}
