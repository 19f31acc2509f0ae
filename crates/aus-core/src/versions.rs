//! Blocked version expressions
//!
//! A blocked version expression is a regular expression matched against the
//! raw version id of a cluster (e.g. `4.12.3`). Matching is unanchored: an
//! expression blocks a version if it matches anywhere in it.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::io::Read;

use regex::Regex;

use crate::error::{InputError, PatternError};

/// A compiled blocked version expression
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    /// Compile a single expression
    ///
    /// # Errors
    /// Returns [`PatternError`] naming the literal if it is not a valid regex
    pub fn new(expression: &str) -> Result<Self, PatternError> {
        Regex::new(expression)
            .map(|regex| Self { regex })
            .map_err(|source| PatternError {
                pattern: expression.to_string(),
                source,
            })
    }

    /// The expression this pattern was compiled from
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Check if the pattern matches anywhere in `version`
    #[inline]
    #[must_use]
    pub fn is_match(&self, version: &str) -> bool {
        self.regex.is_match(version)
    }
}

impl Display for CompiledPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile every expression, failing on the first invalid one
///
/// # Errors
/// Returns [`PatternError`] for the first expression that does not compile.
/// No partial result is returned.
pub fn compile<I, S>(expressions: I) -> Result<Vec<CompiledPattern>, PatternError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    expressions
        .into_iter()
        .map(|expression| CompiledPattern::new(expression.as_ref()))
        .collect()
}

/// Check if any pattern blocks `version`
#[must_use]
pub fn is_blocked(version: &str, patterns: &[CompiledPattern]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(version))
}

/// Normalize a raw expression
///
/// Trims surrounding whitespace and commas. Returns `None` when nothing is
/// left, signalling that the entry should be dropped.
#[must_use]
pub fn normalize(raw: &str) -> Option<String> {
    let normalized = raw.trim_matches(|c: char| c == ',' || c.is_whitespace());
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

/// Split a comma separated list, normalizing and dropping empty entries
#[must_use]
pub fn split_csv(value: &str) -> Vec<String> {
    value.split(',').filter_map(normalize).collect()
}

/// Sort expressions lexicographically
#[must_use]
pub fn sorted(mut expressions: Vec<String>) -> Vec<String> {
    expressions.sort();
    expressions
}

/// Major and minor number of a release version
///
/// `4.13.2` yields `(4, 13)`. Pre-releases such as `4.13.0-rc.1` and
/// malformed versions yield `None`.
#[must_use]
pub fn y_stream(version: &str) -> Option<(u64, u64)> {
    let version = version.trim();
    if version.contains('-') {
        return None;
    }
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Parse a y-stream given as `major.minor`
///
/// # Errors
/// Returns [`InputError::InvalidYStream`] for anything else
pub fn parse_y_stream(value: &str) -> Result<String, InputError> {
    let value = value.trim();
    match y_stream(value) {
        Some((major, minor)) if value.split('.').count() == 2 => Ok(format!("{major}.{minor}")),
        _ => Err(InputError::InvalidYStream(value.to_string())),
    }
}

/// Y-streams above the one of `current` reached by `upgrades`
///
/// Returned as `major.minor` in version order. Nothing is returned when the
/// current version does not parse.
#[must_use]
pub fn y_stream_upgrades<'a, I>(current: &str, upgrades: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let Some(current) = y_stream(current) else {
        return Vec::new();
    };
    upgrades
        .into_iter()
        .filter_map(y_stream)
        .filter(|stream| *stream > current)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|(major, minor)| format!("{major}.{minor}"))
        .collect()
}

/// Read a JSON list of expressions
///
/// # Errors
/// Returns [`InputError::Decode`] if the document is not a list of strings
pub fn read_expressions<R: Read>(reader: R) -> Result<Vec<String>, InputError> {
    Ok(serde_json::from_reader(reader)?)
}
