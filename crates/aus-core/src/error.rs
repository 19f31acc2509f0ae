//! Error types for AUS Core
//!
//! Provides error handling for:
//! - Malformed operator input (flags, JSON documents, policies)
//! - Blocked version expressions that do not compile

/// Errors in operator-supplied input
///
/// Detected before any backend call is made.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Sector representation without a name
    #[error("invalid sector '{repr}': sector name must not be empty")]
    EmptySectorName {
        /// The offending flag value
        repr: String,
    },

    /// Parallelism cap that is not an unsigned integer
    #[error("invalid max parallel upgrades '{value}' for sector '{sector}'")]
    InvalidMaxParallelUpgrades {
        /// Sector the cap was given for
        sector: String,
        /// The offending value
        value: String,
    },

    /// Policy without a cluster name
    #[error("cluster name is required")]
    MissingClusterName,

    /// Negative soak period
    #[error("soak-days must be >= 0 (got {0})")]
    NegativeSoakDays(i64),

    /// Policy without workloads
    #[error("workloads are required")]
    MissingWorkloads,

    /// Policy without schedule
    #[error("schedule is required")]
    MissingSchedule,

    /// Schedule that is neither a preset nor a cron expression
    #[error("invalid schedule '{schedule}': {reason}")]
    InvalidSchedule {
        /// The offending schedule
        schedule: String,
        /// Parser message
        reason: String,
    },

    /// Nothing to block or unblock
    #[error("none of block-version or unblock-version flags were provided")]
    NoVersionBlockChanges,

    /// Version stream that is not `major.minor`
    #[error("invalid version '{0}': expected a y-stream like 4.14")]
    InvalidYStream(String),

    /// JSON document on stdin could not be decoded
    #[error("failed to decode input: {0}")]
    Decode(#[from] serde_json::Error),
}

impl InputError {
    /// Create empty sector name error
    pub fn empty_sector_name(repr: impl Into<String>) -> Self {
        Self::EmptySectorName { repr: repr.into() }
    }

    /// Create invalid schedule error
    pub fn invalid_schedule(schedule: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidSchedule {
            schedule: schedule.into(),
            reason: reason.to_string(),
        }
    }
}

/// A blocked version expression that is not a valid regular expression
#[derive(Debug, thiserror::Error)]
#[error("invalid blocked version expression '{pattern}': {source}")]
pub struct PatternError {
    /// The literal that failed to compile
    pub pattern: String,
    /// Regex compiler error
    #[source]
    pub source: regex::Error,
}

/// Combined core error
#[derive(Debug, thiserror::Error)]
pub enum AusError {
    /// Invalid operator input
    #[error(transparent)]
    Input(#[from] InputError),

    /// Invalid blocked version expression
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Result type alias for core operations
pub type AusResult<T> = Result<T, AusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_display() {
        let err = InputError::empty_sector_name("=a,b");
        assert_eq!(
            err.to_string(),
            "invalid sector '=a,b': sector name must not be empty"
        );
    }

    #[test]
    fn soak_days_display() {
        assert_eq!(
            InputError::NegativeSoakDays(-2).to_string(),
            "soak-days must be >= 0 (got -2)"
        );
    }

    #[test]
    fn pattern_error_names_literal() {
        let source = regex::Regex::new("4.12.(").unwrap_err();
        let err = PatternError {
            pattern: "4.12.(".to_string(),
            source,
        };
        assert!(err.to_string().contains("'4.12.('"));
    }

    #[test]
    fn error_conversions_are_transparent() {
        let err: AusError = InputError::MissingWorkloads.into();
        assert!(matches!(err, AusError::Input(_)));
        assert_eq!(err.to_string(), "workloads are required");
    }
}
