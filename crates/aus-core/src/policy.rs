//! Cluster upgrade policies
//!
//! A policy tells the upgrade service when (schedule), after how much soak
//! time and under which constraints (sector, mutexes, blocked versions) a
//! cluster may be upgraded.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{AusResult, InputError, PatternError};
use crate::versions::{self, CompiledPattern};

/// Upgrade policy of a single cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterUpgradePolicy {
    /// Cluster display name
    #[serde(rename = "name")]
    pub cluster_name: String,

    /// Cron expression of the upgrade window
    #[serde(default)]
    pub schedule: String,

    /// Workload identifiers running on the cluster
    #[serde(default)]
    pub workloads: Vec<String>,

    /// Upgrade conditions
    #[serde(default)]
    pub conditions: PolicyConditions,
}

/// Conditions that gate an upgrade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConditions {
    /// Days a version must soak on preceding clusters
    #[serde(default)]
    pub soak_days: i64,

    /// Sector the cluster belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Mutexes the cluster must hold while upgrading
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutexes: Vec<String>,

    /// Version expressions this cluster must not upgrade to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_versions: Vec<String>,
}

impl ClusterUpgradePolicy {
    /// Create policy for a cluster
    #[inline]
    #[must_use]
    pub fn new(cluster_name: impl Into<String>, schedule: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            schedule: schedule.into(),
            ..Self::default()
        }
    }

    /// With workloads
    #[must_use]
    pub fn with_workloads<I, S>(mut self, workloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workloads.extend(workloads.into_iter().map(Into::into));
        self
    }

    /// With soak days
    #[inline]
    #[must_use]
    pub fn with_soak_days(mut self, soak_days: i64) -> Self {
        self.conditions.soak_days = soak_days;
        self
    }

    /// With sector; a blank name leaves the sector unset
    #[inline]
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        let sector = sector.into().trim().to_string();
        self.conditions.sector = (!sector.is_empty()).then_some(sector);
        self
    }

    /// With mutexes
    #[must_use]
    pub fn with_mutexes<I, S>(mut self, mutexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions
            .mutexes
            .extend(mutexes.into_iter().map(Into::into));
        self
    }

    /// With blocked version expressions (normalized, empty entries dropped)
    #[must_use]
    pub fn with_blocked_versions<I, S>(mut self, blocked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.conditions.blocked_versions.extend(
            blocked
                .into_iter()
                .filter_map(|expression| versions::normalize(expression.as_ref())),
        );
        self
    }

    /// Drop a blank sector and normalize blocked version expressions
    #[must_use]
    fn normalized(mut self) -> Self {
        let sector = self.conditions.sector.take().unwrap_or_default();
        let blocked = std::mem::take(&mut self.conditions.blocked_versions);
        self.with_sector(sector).with_blocked_versions(blocked)
    }

    /// Validate the policy
    ///
    /// # Errors
    /// Returns [`InputError`] for missing or out of range fields and
    /// [`PatternError`] for blocked versions that do not compile
    pub fn validate(&self) -> AusResult<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(InputError::MissingClusterName.into());
        }
        if self.conditions.soak_days < 0 {
            return Err(InputError::NegativeSoakDays(self.conditions.soak_days).into());
        }
        if self.workloads.is_empty() {
            return Err(InputError::MissingWorkloads.into());
        }
        if self.schedule.trim().is_empty() {
            return Err(InputError::MissingSchedule.into());
        }
        self.blocked_version_patterns()?;
        Ok(())
    }

    /// Compile the policy's blocked version expressions
    ///
    /// # Errors
    /// Returns [`PatternError`] for the first expression that does not compile
    pub fn blocked_version_patterns(&self) -> Result<Vec<CompiledPattern>, PatternError> {
        versions::compile(&self.conditions.blocked_versions)
    }
}

/// Sort policies by cluster name
pub fn sort_policies(policies: &mut [ClusterUpgradePolicy]) {
    policies.sort_by(|a, b| a.cluster_name.cmp(&b.cluster_name));
}

/// Read a JSON list of policies
///
/// Policies are normalized the same way as policies built from flags.
///
/// # Errors
/// Returns [`InputError::Decode`] for malformed documents
pub fn read_policies<R: Read>(reader: R) -> Result<Vec<ClusterUpgradePolicy>, InputError> {
    let policies: Vec<ClusterUpgradePolicy> = serde_json::from_reader(reader)?;
    Ok(policies
        .into_iter()
        .map(ClusterUpgradePolicy::normalized)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AusError;

    fn valid_policy() -> ClusterUpgradePolicy {
        ClusterUpgradePolicy::new("prod-1", "* * * * 1-4")
            .with_workloads(["api"])
            .with_soak_days(2)
    }

    #[test]
    fn valid_policy_passes() {
        assert!(valid_policy().validate().is_ok());
    }

    #[test]
    fn missing_cluster_name() {
        let mut policy = valid_policy();
        policy.cluster_name = String::new();
        assert!(matches!(
            policy.validate(),
            Err(AusError::Input(InputError::MissingClusterName))
        ));
    }

    #[test]
    fn negative_soak_days() {
        let policy = valid_policy().with_soak_days(-1);
        assert!(matches!(
            policy.validate(),
            Err(AusError::Input(InputError::NegativeSoakDays(-1)))
        ));
    }

    #[test]
    fn missing_workloads() {
        let policy = ClusterUpgradePolicy::new("prod-1", "* * * * *");
        assert!(matches!(
            policy.validate(),
            Err(AusError::Input(InputError::MissingWorkloads))
        ));
    }

    #[test]
    fn missing_schedule() {
        let policy = ClusterUpgradePolicy::new("prod-1", "").with_workloads(["api"]);
        assert!(matches!(
            policy.validate(),
            Err(AusError::Input(InputError::MissingSchedule))
        ));
    }

    #[test]
    fn invalid_blocked_version() {
        let policy = valid_policy().with_blocked_versions(["4.12.("]);
        assert!(matches!(policy.validate(), Err(AusError::Pattern(_))));
    }

    #[test]
    fn read_policies_normalizes_conditions() {
        let input = r#"[{
            "name": "a",
            "schedule": "anytime",
            "workloads": ["api"],
            "conditions": {"soak_days": 0, "sector": " ", "blocked_versions": [" 4.12.1,", "", "4.13.*"]}
        }]"#;
        let policies = read_policies(input.as_bytes()).unwrap();
        assert!(policies[0].conditions.sector.is_none());
        assert_eq!(policies[0].conditions.blocked_versions, vec!["4.12.1", "4.13.*"]);
    }

    #[test]
    fn with_sector_ignores_empty() {
        assert!(valid_policy().with_sector("").conditions.sector.is_none());
        assert!(valid_policy().with_sector("  ").conditions.sector.is_none());
        assert_eq!(
            valid_policy().with_sector("prod").conditions.sector.as_deref(),
            Some("prod")
        );
    }

    #[test]
    fn json_shape() {
        let policy = valid_policy().with_sector("prod");
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json["name"], "prod-1");
        assert_eq!(json["conditions"]["soak_days"], 2);
        assert_eq!(json["conditions"]["sector"], "prod");
        assert!(json["conditions"].get("mutexes").is_none());
    }

    #[test]
    fn read_policies_from_json() {
        let input = r#"[{
            "name": "b",
            "schedule": "anytime",
            "workloads": ["w"],
            "conditions": {"soak_days": 1, "mutexes": ["m"]}
        }, {
            "name": "a",
            "schedule": "* * * * *",
            "workloads": ["w"],
            "conditions": {"soak_days": 0}
        }]"#;
        let mut policies = read_policies(input.as_bytes()).unwrap();
        sort_policies(&mut policies);
        assert_eq!(policies[0].cluster_name, "a");
        assert_eq!(policies[1].conditions.mutexes, vec!["m"]);
    }
}
