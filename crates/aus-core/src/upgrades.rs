//! Upgrade candidate filtering
//!
//! Removes versions blocked by a cluster's policy or by organization-wide
//! blocked version expressions from the list of upgrades a cluster offers.

use crate::error::PatternError;
use crate::policy::ClusterUpgradePolicy;
use crate::versions::{self, CompiledPattern};

/// Blocked version filter for one organization
#[derive(Debug, Clone, Default)]
pub struct UpgradeFilter {
    organization: Vec<CompiledPattern>,
}

impl UpgradeFilter {
    /// Create filter from organization-wide expressions
    ///
    /// # Errors
    /// Returns [`PatternError`] if an expression does not compile
    pub fn new<I, S>(organization_blocked: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            organization: versions::compile(organization_blocked)?,
        })
    }

    /// Check if a version is blocked organization-wide
    #[inline]
    #[must_use]
    pub fn is_blocked_for_organization(&self, version: &str) -> bool {
        versions::is_blocked(version, &self.organization)
    }

    /// Available upgrades that are blocked neither by policy nor organization
    ///
    /// # Errors
    /// Returns [`PatternError`] if the policy holds an invalid expression
    pub fn available_upgrades<'a>(
        &self,
        candidates: &'a [String],
        policy: Option<&ClusterUpgradePolicy>,
    ) -> Result<Vec<&'a str>, PatternError> {
        let cluster = match policy {
            Some(policy) => policy.blocked_version_patterns()?,
            None => Vec::new(),
        };
        Ok(candidates
            .iter()
            .map(String::as_str)
            .filter(|version| !versions::is_blocked(version, &cluster))
            .filter(|version| !self.is_blocked_for_organization(version))
            .collect())
    }
}
