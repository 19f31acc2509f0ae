//! Organization, subscription and cluster lookups, and version gate
//! agreements of clusters

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};
use crate::label::Label;

/// A cloud organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// External id, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// A managed cluster subscription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription id
    pub id: String,
    /// Cluster display name
    pub display_name: String,
    /// Id of the cluster behind the subscription
    #[serde(default)]
    pub cluster_id: String,
    /// Labels attached to the subscription
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// A ready managed cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Cluster id
    pub id: String,
    /// Cluster name
    pub name: String,
    /// Raw version id, e.g. `4.12.3`
    #[serde(default)]
    pub version: String,
    /// Versions the cluster could upgrade to
    #[serde(default)]
    pub available_upgrades: Vec<String>,
    /// Whether the cluster uses AWS STS
    #[serde(default)]
    pub sts_enabled: bool,
}

/// A condition that must be acknowledged before upgrading into a y-stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionGate {
    /// Gate id
    pub id: String,
    /// Y-stream the gate applies to, e.g. `4.14`
    pub version_raw_id_prefix: String,
    /// What has to be acknowledged
    #[serde(default)]
    pub description: String,
    /// Where the change is documented
    #[serde(default)]
    pub documentation_url: String,
    /// Only relevant for STS clusters
    #[serde(default)]
    pub sts_only: bool,
}

impl VersionGate {
    /// Check if the gate must be acknowledged by `cluster`
    #[inline]
    #[must_use]
    pub fn applies_to(&self, cluster: &Cluster) -> bool {
        !self.sts_only || cluster.sts_enabled
    }
}

/// Organizations, subscriptions, clusters and version gates
pub trait Directory: std::fmt::Debug {
    /// Organization of the authenticated account
    ///
    /// # Errors
    /// Returns `BackendError` if the account cannot be fetched
    fn current_organization_id(&self) -> BackendResult<String>;

    /// Organization details
    ///
    /// # Errors
    /// Returns `BackendError::NotFound` for unknown ids
    fn organization(&self, organization_id: &str) -> BackendResult<Organization>;

    /// Active managed subscriptions with their labels
    ///
    /// When `display_name` is set only subscriptions with that display name
    /// are returned.
    ///
    /// # Errors
    /// Returns `BackendError` if the listing fails
    fn subscriptions(
        &self,
        organization_id: &str,
        display_name: Option<&str>,
    ) -> BackendResult<Vec<Subscription>>;

    /// Ready managed clusters
    ///
    /// # Errors
    /// Returns `BackendError` if the listing fails
    fn clusters(&self, organization_id: &str) -> BackendResult<Vec<Cluster>>;

    /// Every published version gate
    ///
    /// # Errors
    /// Returns `BackendError` if the listing fails
    fn version_gates(&self) -> BackendResult<Vec<VersionGate>>;

    /// Ids of the gates a cluster has acknowledged
    ///
    /// # Errors
    /// Returns `BackendError` if the listing fails
    fn gate_agreements(&self, cluster_id: &str) -> BackendResult<Vec<String>>;

    /// Acknowledge a gate for a cluster
    ///
    /// # Errors
    /// Returns `BackendError` if the agreement cannot be created
    fn add_gate_agreement(
        &self,
        cluster_id: &str,
        gate_id: &str,
        dry_run: bool,
    ) -> BackendResult<()>;
}

impl<T: Directory + ?Sized> Directory for &T {
    fn current_organization_id(&self) -> BackendResult<String> {
        (**self).current_organization_id()
    }

    fn organization(&self, organization_id: &str) -> BackendResult<Organization> {
        (**self).organization(organization_id)
    }

    fn subscriptions(
        &self,
        organization_id: &str,
        display_name: Option<&str>,
    ) -> BackendResult<Vec<Subscription>> {
        (**self).subscriptions(organization_id, display_name)
    }

    fn clusters(&self, organization_id: &str) -> BackendResult<Vec<Cluster>> {
        (**self).clusters(organization_id)
    }

    fn version_gates(&self) -> BackendResult<Vec<VersionGate>> {
        (**self).version_gates()
    }

    fn gate_agreements(&self, cluster_id: &str) -> BackendResult<Vec<String>> {
        (**self).gate_agreements(cluster_id)
    }

    fn add_gate_agreement(
        &self,
        cluster_id: &str,
        gate_id: &str,
        dry_run: bool,
    ) -> BackendResult<()> {
        (**self).add_gate_agreement(cluster_id, gate_id, dry_run)
    }
}

/// Find the single subscription with a display name
///
/// # Errors
/// Returns [`BackendError::NotFound`] for no match and
/// [`BackendError::Ambiguous`] for several
pub fn find_subscription<D: Directory + ?Sized>(
    directory: &D,
    organization_id: &str,
    display_name: &str,
) -> BackendResult<Subscription> {
    let mut matches = directory.subscriptions(organization_id, Some(display_name))?;
    match matches.len() {
        0 => Err(BackendError::not_found("subscription", display_name)),
        1 => Ok(matches.remove(0)),
        count => Err(BackendError::ambiguous("subscription", display_name, count)),
    }
}
