//! Error types for label storage and the policy backend

use aus_core::{AusError, InputError, PatternError};

/// Errors decoding labels into policy entities
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    /// Key outside the AUS namespace or with an unknown suffix
    #[error("unsupported label key '{0}'")]
    UnknownKey(String),

    /// Value that does not decode for its key
    #[error("invalid value '{value}' for label '{key}': {reason}")]
    InvalidValue {
        /// Full label key
        key: String,
        /// Raw label value
        value: String,
        /// Decoder message
        reason: String,
    },
}

impl LabelError {
    /// Create invalid value error
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors talking to the label store or directory
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Store could not be reached or refused the credentials
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Entity lookup returned nothing
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Entity kind, e.g. `subscription`
        kind: &'static str,
        /// Lookup key
        name: String,
    },

    /// Entity lookup returned more than one match
    #[error("{count} {kind}s found for '{name}', expected one")]
    Ambiguous {
        /// Entity kind
        kind: &'static str,
        /// Lookup key
        name: String,
        /// Number of matches
        count: usize,
    },

    /// Unexpected HTTP status
    #[error("unexpected status {status} from {url}: {message}")]
    Http {
        /// Response status code
        status: u16,
        /// Request URL
        url: String,
        /// Response body or reason
        message: String,
    },

    /// Response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Backend name not supported
    #[error("unknown backend type: {0}")]
    UnknownBackend(String),

    /// Stored label could not be decoded
    #[error(transparent)]
    Label(#[from] LabelError),

    /// Invalid operator input
    #[error(transparent)]
    Input(#[from] InputError),

    /// Invalid blocked version expression
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Dump serialization failure
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl BackendError {
    /// Create not found error
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create ambiguous match error
    pub fn ambiguous(kind: &'static str, name: impl Into<String>, count: usize) -> Self {
        Self::Ambiguous {
            kind,
            name: name.into(),
            count,
        }
    }

    /// Check if the error is a missing entity
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Http { status: 404, .. })
    }
}

impl From<AusError> for BackendError {
    fn from(err: AusError) -> Self {
        match err {
            AusError::Input(e) => Self::Input(e),
            AusError::Pattern(e) => Self::Pattern(e),
        }
    }
}

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
