//! Cross-organization version data inheritance
//!
//! An organization can inherit version data (soak progress) from other
//! organizations and publish its own to others. Whether a publishing
//! organization lists the inheriting one is not validated here.

use std::collections::BTreeSet;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::versions::split_csv;

/// Inheritance links of one organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceConfig {
    /// Organizations version data is pulled from
    #[serde(rename = "inherit", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub inheriting_from: BTreeSet<String>,

    /// Organizations version data is pushed to
    #[serde(rename = "publish", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub publishing_to: BTreeSet<String>,
}

impl InheritanceConfig {
    /// Create empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from flag values, each a comma separated list of org ids
    #[must_use]
    pub fn from_flag_values<S: AsRef<str>>(inherit: &[S], publish: &[S]) -> Self {
        let collect = |values: &[S]| {
            values
                .iter()
                .flat_map(|value| split_csv(value.as_ref()))
                .collect::<BTreeSet<_>>()
        };
        Self {
            inheriting_from: collect(inherit),
            publishing_to: collect(publish),
        }
    }

    /// With organizations to inherit from
    #[must_use]
    pub fn with_inheriting_from<I, S>(mut self, orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inheriting_from.extend(orgs.into_iter().map(Into::into));
        self
    }

    /// With organizations to publish to
    #[must_use]
    pub fn with_publishing_to<I, S>(mut self, orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.publishing_to.extend(orgs.into_iter().map(Into::into));
        self
    }

    /// Check if no links are configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inheriting_from.is_empty() && self.publishing_to.is_empty()
    }
}

/// Read an inheritance configuration document
///
/// # Errors
/// Returns [`InputError::Decode`] for malformed documents
pub fn read_inheritance<R: Read>(reader: R) -> Result<InheritanceConfig, InputError> {
    Ok(serde_json::from_reader(reader)?)
}
