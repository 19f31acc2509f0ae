//! Policy backend
//!
//! [`PolicyBackend`] is what the command layer talks to. The only
//! implementation, [`LabelsPolicyBackend`], persists everything as labels
//! through a [`LabelStore`] and resolves organizations and clusters through
//! a [`Directory`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use aus_core::{
    sort_policies, versions, ClusterUpgradePolicy, InheritanceConfig, Sector, UpgradeFilter,
};
use serde::Serialize;

use crate::codec;
use crate::container::{dry_run_prefix, LabelsContainer, ReconcileSummary};
use crate::directory::{
    find_subscription, Cluster, Directory, Organization, Subscription, VersionGate,
};
use crate::error::{BackendError, BackendResult};
use crate::key::{self, LabelKey};
use crate::label::{Label, LabelScope};
use crate::store::LabelStore;

/// Supported backend implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Policies stored as OCM labels
    #[default]
    OcmLabels,
}

impl BackendKind {
    /// Backend name as accepted on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OcmLabels => "ocmlabels",
        }
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ocmlabels" | "" => Ok(Self::OcmLabels),
            other => Err(BackendError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How desired state is handed to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOptions {
    /// Return the desired state instead of reconciling
    pub dump: bool,
    /// Report label operations without performing them
    pub dry_run: bool,
}

impl ApplyOptions {
    /// Create options
    #[inline]
    #[must_use]
    pub fn new(dump: bool, dry_run: bool) -> Self {
        Self { dump, dry_run }
    }
}

/// Result of an apply call
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Desired state, returned instead of being applied
    Dumped(serde_json::Value),
    /// Label operations issued
    Reconciled(ReconcileSummary),
}

impl ApplyOutcome {
    fn dumped<T: Serialize + ?Sized>(value: &T) -> BackendResult<Self> {
        Ok(Self::Dumped(serde_json::to_value(value)?))
    }
}

/// A cluster together with its policy and upgrade options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterStatus {
    /// Cluster name
    pub name: String,
    /// Cluster id
    pub cluster_id: String,
    /// Subscription id
    pub subscription_id: String,
    /// Current version
    pub version: String,
    /// Policy, `None` when no schedule is stored
    pub policy: Option<ClusterUpgradePolicy>,
    /// Upgrades not blocked by the policy or the organization
    pub available_upgrades: Vec<String>,
}

/// Organization wide policy overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Organization
    pub organization: Organization,
    /// Organization wide blocked version expressions
    pub blocked_versions: Vec<String>,
    /// Sector graph with placeholders for referenced sectors
    pub sectors: Vec<Sector>,
    /// Inheritance links
    pub inheritance: InheritanceConfig,
    /// Clusters sorted by name
    pub clusters: Vec<ClusterStatus>,
}

/// A version gate a cluster has not acknowledged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingGate {
    /// Cluster name
    pub cluster_name: String,
    /// Current version of the cluster
    pub cluster_version: String,
    /// The gate
    pub gate: VersionGate,
}

/// Unacknowledged version gates of an organization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateReport {
    /// Organization
    pub organization: Organization,
    /// Organization wide blocked version expressions
    pub blocked_versions: Vec<String>,
    /// Missing agreements sorted by cluster name, then y-stream
    pub missing: Vec<MissingGate>,
}

/// Storage of upgrade policies and organization configuration
///
/// `organization_id` of `None` selects the organization of the current
/// account.
pub trait PolicyBackend: fmt::Debug {
    /// Resolve an optional organization id
    ///
    /// # Errors
    /// Returns `BackendError` if the current account cannot be fetched
    fn resolve_organization(&self, organization_id: Option<&str>) -> BackendResult<String>;

    /// Policies of an organization sorted by cluster name
    ///
    /// # Errors
    /// Returns `BackendError` if listing or decoding fails
    fn list_policies(
        &self,
        organization_id: Option<&str>,
        show_clusters_without_policy: bool,
    ) -> BackendResult<Vec<ClusterUpgradePolicy>>;

    /// Apply policies, one subscription at a time
    ///
    /// # Errors
    /// Returns the first `BackendError`; earlier policies stay applied
    fn apply_policies(
        &self,
        organization_id: Option<&str>,
        policies: &[ClusterUpgradePolicy],
        options: ApplyOptions,
    ) -> BackendResult<ApplyOutcome>;

    /// Remove every AUS label from a cluster's subscription
    ///
    /// # Errors
    /// Returns `BackendError` if the cluster cannot be resolved or a delete fails
    fn delete_policy(
        &self,
        organization_id: Option<&str>,
        cluster_name: &str,
        dry_run: bool,
    ) -> BackendResult<ReconcileSummary>;

    /// Organization wide blocked version expressions, sorted
    ///
    /// # Errors
    /// Returns `BackendError` if listing fails
    fn list_blocked_versions(&self, organization_id: Option<&str>) -> BackendResult<Vec<String>>;

    /// Store organization wide blocked version expressions
    ///
    /// # Errors
    /// Returns `BackendError` if reconciliation fails
    fn apply_blocked_versions(
        &self,
        organization_id: Option<&str>,
        expressions: &[String],
        options: ApplyOptions,
    ) -> BackendResult<ApplyOutcome>;

    /// Sector configuration sorted by name
    ///
    /// # Errors
    /// Returns `BackendError` if listing fails
    fn list_sectors(&self, organization_id: Option<&str>) -> BackendResult<Vec<Sector>>;

    /// Store sector configuration
    ///
    /// # Errors
    /// Returns `BackendError` if reconciliation fails
    fn apply_sectors(
        &self,
        organization_id: Option<&str>,
        sectors: &[Sector],
        options: ApplyOptions,
    ) -> BackendResult<ApplyOutcome>;

    /// Version data inheritance configuration
    ///
    /// # Errors
    /// Returns `BackendError` if listing fails
    fn get_inheritance(&self, organization_id: Option<&str>) -> BackendResult<InheritanceConfig>;

    /// Store version data inheritance configuration
    ///
    /// # Errors
    /// Returns `BackendError` if reconciliation fails
    fn apply_inheritance(
        &self,
        organization_id: Option<&str>,
        inheritance: &InheritanceConfig,
        options: ApplyOptions,
    ) -> BackendResult<ApplyOutcome>;

    /// Organization overview
    ///
    /// # Errors
    /// Returns `BackendError` if any lookup fails or stored expressions do
    /// not compile
    fn status(
        &self,
        organization_id: Option<&str>,
        show_clusters_without_policy: bool,
    ) -> BackendResult<StatusReport>;

    /// Version gates STS clusters still have to acknowledge
    ///
    /// Only y-streams reachable through upgrades that are not blocked by
    /// the organization or the cluster's policy are considered.
    ///
    /// # Errors
    /// Returns `BackendError` if any lookup fails or stored expressions do
    /// not compile
    fn missing_gate_agreements(&self, organization_id: Option<&str>) -> BackendResult<GateReport>;

    /// Acknowledge every missing gate of a y-stream on one cluster
    ///
    /// Returns the acknowledged gates.
    ///
    /// # Errors
    /// Returns `BackendError` for an invalid y-stream, an unknown cluster or
    /// a failed agreement; earlier agreements stay in place
    fn apply_gate_agreements(
        &self,
        organization_id: Option<&str>,
        cluster_name: &str,
        y_stream: &str,
        dry_run: bool,
    ) -> BackendResult<Vec<VersionGate>>;
}

/// Create a backend of the given kind
#[must_use]
pub fn new_policy_backend<S, D>(kind: BackendKind, store: S, directory: D) -> Box<dyn PolicyBackend>
where
    S: LabelStore + 'static,
    D: Directory + 'static,
{
    match kind {
        BackendKind::OcmLabels => Box::new(LabelsPolicyBackend::new(store, directory)),
    }
}

/// Backend persisting policies as labels
#[derive(Debug, Clone)]
pub struct LabelsPolicyBackend<S, D> {
    store: S,
    directory: D,
}

impl<S: LabelStore, D: Directory> LabelsPolicyBackend<S, D> {
    /// Create backend
    #[inline]
    #[must_use]
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    fn organization_labels(&self, organization_id: &str, prefix: &str) -> BackendResult<Vec<Label>> {
        self.store
            .list_labels(&LabelScope::Organization(organization_id.to_string()), prefix)
    }

    fn sector_labels(&self, organization_id: &str) -> BackendResult<Vec<Label>> {
        let mut labels = self.organization_labels(organization_id, &key::sector_deps_prefix())?;
        labels.extend(
            self.organization_labels(organization_id, &key::sector_max_parallel_upgrades_prefix())?,
        );
        Ok(labels)
    }

    fn blocked_versions_for(&self, organization_id: &str) -> BackendResult<Vec<String>> {
        let labels =
            self.organization_labels(organization_id, &LabelKey::BlockedVersions.key())?;
        Ok(codec::blocked_versions_from_labels(&labels))
    }

    fn policies_for(
        &self,
        subscriptions: &[Subscription],
        show_clusters_without_policy: bool,
    ) -> BackendResult<BTreeMap<String, ClusterUpgradePolicy>> {
        let mut policies = BTreeMap::new();
        for subscription in subscriptions {
            let aus_labels: Vec<Label> = subscription
                .labels
                .iter()
                .filter(|label| label.key.starts_with(key::aus_prefix()))
                .cloned()
                .collect();
            if !show_clusters_without_policy && !codec::has_policy(&aus_labels) {
                continue;
            }
            let policy = codec::policy_from_labels(&subscription.display_name, &aus_labels)?;
            policies.insert(subscription.id.clone(), policy);
        }
        Ok(policies)
    }

    fn apply_policy(
        &self,
        organization_id: &str,
        policy: &ClusterUpgradePolicy,
        dry_run: bool,
    ) -> BackendResult<ReconcileSummary> {
        policy.validate()?;
        let subscription =
            find_subscription(&self.directory, organization_id, &policy.cluster_name)?;
        let scope = LabelScope::Subscription(subscription.id);

        let current = self.store.list_labels(&scope, key::aus_prefix())?;
        let mut container = LabelsContainer::new(scope, current);
        container.add_labels(codec::policy_to_labels(policy));

        tracing::info!(
            "{}Apply cluster upgrade policy to {}",
            dry_run_prefix(dry_run),
            policy.cluster_name
        );
        container.reconcile(&self.store, dry_run)
    }
}

fn gates_by_y_stream(gates: Vec<VersionGate>) -> BTreeMap<String, Vec<VersionGate>> {
    let mut by_y_stream: BTreeMap<String, Vec<VersionGate>> = BTreeMap::new();
    for gate in gates {
        by_y_stream
            .entry(gate.version_raw_id_prefix.clone())
            .or_default()
            .push(gate);
    }
    by_y_stream
}

/// Gates of `y_streams` that apply to `cluster` and are not acknowledged
fn missing_gates<'a>(
    cluster: &Cluster,
    y_streams: &[String],
    gates: &'a BTreeMap<String, Vec<VersionGate>>,
    agreements: &[String],
) -> Vec<&'a VersionGate> {
    y_streams
        .iter()
        .filter_map(|y_stream| gates.get(y_stream))
        .flatten()
        .filter(|gate| gate.applies_to(cluster))
        .filter(|gate| !agreements.contains(&gate.id))
        .collect()
}

impl<S: LabelStore, D: Directory> PolicyBackend for LabelsPolicyBackend<S, D> {
    fn resolve_organization(&self, organization_id: Option<&str>) -> BackendResult<String> {
        match organization_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Ok(id.to_string()),
            None => {
                let id = self.directory.current_organization_id()?;
                tracing::debug!(organization = %id, "using organization of current account");
                Ok(id)
            }
        }
    }

    fn list_policies(
        &self,
        organization_id: Option<&str>,
        show_clusters_without_policy: bool,
    ) -> BackendResult<Vec<ClusterUpgradePolicy>> {
        let organization_id = self.resolve_organization(organization_id)?;
        let subscriptions = self.directory.subscriptions(&organization_id, None)?;
        let mut policies: Vec<_> = self
            .policies_for(&subscriptions, show_clusters_without_policy)?
            .into_values()
            .collect();
        sort_policies(&mut policies);
        Ok(policies)
    }

    fn apply_policies(
        &self,
        organization_id: Option<&str>,
        policies: &[ClusterUpgradePolicy],
        options: ApplyOptions,
    ) -> BackendResult<ApplyOutcome> {
        if options.dump {
            return ApplyOutcome::dumped(policies);
        }
        let organization_id = self.resolve_organization(organization_id)?;
        let mut summary = ReconcileSummary::default();
        for policy in policies {
            summary = summary.merge(self.apply_policy(&organization_id, policy, options.dry_run)?);
        }
        Ok(ApplyOutcome::Reconciled(summary))
    }

    fn delete_policy(
        &self,
        organization_id: Option<&str>,
        cluster_name: &str,
        dry_run: bool,
    ) -> BackendResult<ReconcileSummary> {
        let organization_id = self.resolve_organization(organization_id)?;
        let subscription = find_subscription(&self.directory, &organization_id, cluster_name)?;
        let scope = LabelScope::Subscription(subscription.id);

        let current = self.store.list_labels(&scope, key::aus_prefix())?;
        tracing::info!(
            "{}Delete cluster upgrade policy of {cluster_name}",
            dry_run_prefix(dry_run)
        );
        LabelsContainer::new(scope, current).reconcile(&self.store, dry_run)
    }

    fn list_blocked_versions(&self, organization_id: Option<&str>) -> BackendResult<Vec<String>> {
        let organization_id = self.resolve_organization(organization_id)?;
        self.blocked_versions_for(&organization_id)
    }

    fn apply_blocked_versions(
        &self,
        organization_id: Option<&str>,
        expressions: &[String],
        options: ApplyOptions,
    ) -> BackendResult<ApplyOutcome> {
        if options.dump {
            return ApplyOutcome::dumped(expressions);
        }
        aus_core::versions::compile(expressions)?;

        let organization_id = self.resolve_organization(organization_id)?;
        let key = LabelKey::BlockedVersions.key();
        let current = self.organization_labels(&organization_id, &key)?;
        let mut container = LabelsContainer::restricting(
            LabelScope::Organization(organization_id.clone()),
            current,
            [key],
        );
        if let Some(label) = codec::blocked_versions_to_label(expressions) {
            container.add_label(label);
        }

        tracing::info!(
            "{}Apply blocked version labels to organization {organization_id}",
            dry_run_prefix(options.dry_run)
        );
        Ok(ApplyOutcome::Reconciled(
            container.reconcile(&self.store, options.dry_run)?,
        ))
    }

    fn list_sectors(&self, organization_id: Option<&str>) -> BackendResult<Vec<Sector>> {
        let organization_id = self.resolve_organization(organization_id)?;
        Ok(codec::sectors_from_labels(&self.sector_labels(&organization_id)?))
    }

    fn apply_sectors(
        &self,
        organization_id: Option<&str>,
        sectors: &[Sector],
        options: ApplyOptions,
    ) -> BackendResult<ApplyOutcome> {
        if options.dump {
            return ApplyOutcome::dumped(sectors);
        }
        let organization_id = self.resolve_organization(organization_id)?;
        let current = self.sector_labels(&organization_id)?;
        let mut container =
            LabelsContainer::new(LabelScope::Organization(organization_id.clone()), current);
        container.add_labels(codec::sectors_to_labels(sectors));

        tracing::info!(
            "{}Apply sector configuration to organization {organization_id}",
            dry_run_prefix(options.dry_run)
        );
        Ok(ApplyOutcome::Reconciled(
            container.reconcile(&self.store, options.dry_run)?,
        ))
    }

    fn get_inheritance(&self, organization_id: Option<&str>) -> BackendResult<InheritanceConfig> {
        let organization_id = self.resolve_organization(organization_id)?;
        let labels = self.organization_labels(&organization_id, &key::version_data_prefix())?;
        Ok(codec::inheritance_from_labels(&labels))
    }

    fn apply_inheritance(
        &self,
        organization_id: Option<&str>,
        inheritance: &InheritanceConfig,
        options: ApplyOptions,
    ) -> BackendResult<ApplyOutcome> {
        if options.dump {
            return ApplyOutcome::dumped(inheritance);
        }
        let organization_id = self.resolve_organization(organization_id)?;
        let current = self.organization_labels(&organization_id, &key::version_data_prefix())?;
        let mut container = LabelsContainer::restricting(
            LabelScope::Organization(organization_id.clone()),
            current,
            [LabelKey::VersionDataInherit.key(), LabelKey::VersionDataPublish.key()],
        );
        container.add_labels(codec::inheritance_to_labels(inheritance));

        tracing::info!(
            "{}Apply version data inheritance configuration to organization {organization_id}",
            dry_run_prefix(options.dry_run)
        );
        Ok(ApplyOutcome::Reconciled(
            container.reconcile(&self.store, options.dry_run)?,
        ))
    }

    fn status(
        &self,
        organization_id: Option<&str>,
        show_clusters_without_policy: bool,
    ) -> BackendResult<StatusReport> {
        let organization_id = self.resolve_organization(organization_id)?;
        let organization = self.directory.organization(&organization_id)?;

        let blocked_versions = self.blocked_versions_for(&organization.id)?;
        let filter = UpgradeFilter::new(&blocked_versions)?;

        let subscriptions = self.directory.subscriptions(&organization.id, None)?;
        let mut policies = self.policies_for(&subscriptions, show_clusters_without_policy)?;
        let clusters: BTreeMap<String, Cluster> = self
            .directory
            .clusters(&organization.id)?
            .into_iter()
            .map(|cluster| (cluster.id.clone(), cluster))
            .collect();

        let mut cluster_status = Vec::new();
        for subscription in &subscriptions {
            let Some(cluster) = clusters.get(&subscription.cluster_id) else {
                continue;
            };
            let Some(policy) = policies.remove(&subscription.id) else {
                continue;
            };
            let policy = (!policy.schedule.is_empty()).then_some(policy);
            let available_upgrades = filter
                .available_upgrades(&cluster.available_upgrades, policy.as_ref())?
                .into_iter()
                .map(str::to_string)
                .collect();
            cluster_status.push(ClusterStatus {
                name: cluster.name.clone(),
                cluster_id: cluster.id.clone(),
                subscription_id: subscription.id.clone(),
                version: cluster.version.clone(),
                policy,
                available_upgrades,
            });
        }
        cluster_status.sort_by(|a, b| a.name.cmp(&b.name));

        let sectors = aus_core::complete_graph(codec::sectors_from_labels(
            &self.sector_labels(&organization.id)?,
        ));
        let labels = self.organization_labels(&organization.id, &key::version_data_prefix())?;

        Ok(StatusReport {
            organization,
            blocked_versions,
            sectors,
            inheritance: codec::inheritance_from_labels(&labels),
            clusters: cluster_status,
        })
    }

    fn missing_gate_agreements(&self, organization_id: Option<&str>) -> BackendResult<GateReport> {
        let organization_id = self.resolve_organization(organization_id)?;
        let organization = self.directory.organization(&organization_id)?;

        let blocked_versions = self.blocked_versions_for(&organization.id)?;
        let filter = UpgradeFilter::new(&blocked_versions)?;
        let gates = gates_by_y_stream(self.directory.version_gates()?);

        let subscriptions = self.directory.subscriptions(&organization.id, None)?;
        let policies = self.policies_for(&subscriptions, false)?;
        let clusters: BTreeMap<String, Cluster> = self
            .directory
            .clusters(&organization.id)?
            .into_iter()
            .map(|cluster| (cluster.id.clone(), cluster))
            .collect();

        let mut missing = Vec::new();
        for subscription in &subscriptions {
            let Some(cluster) = clusters.get(&subscription.cluster_id) else {
                continue;
            };
            if !cluster.sts_enabled {
                continue;
            }
            let upgrades = filter
                .available_upgrades(&cluster.available_upgrades, policies.get(&subscription.id))?;
            let y_streams = versions::y_stream_upgrades(&cluster.version, upgrades);
            if y_streams.is_empty() {
                continue;
            }
            let agreements = self.directory.gate_agreements(&cluster.id)?;
            missing.extend(
                missing_gates(cluster, &y_streams, &gates, &agreements)
                    .into_iter()
                    .map(|gate| MissingGate {
                        cluster_name: cluster.name.clone(),
                        cluster_version: cluster.version.clone(),
                        gate: gate.clone(),
                    }),
            );
        }
        missing.sort_by(|a, b| a.cluster_name.cmp(&b.cluster_name));

        Ok(GateReport {
            organization,
            blocked_versions,
            missing,
        })
    }

    fn apply_gate_agreements(
        &self,
        organization_id: Option<&str>,
        cluster_name: &str,
        y_stream: &str,
        dry_run: bool,
    ) -> BackendResult<Vec<VersionGate>> {
        let y_stream = versions::parse_y_stream(y_stream)?;
        let organization_id = self.resolve_organization(organization_id)?;
        let subscription = find_subscription(&self.directory, &organization_id, cluster_name)?;
        let cluster = self
            .directory
            .clusters(&organization_id)?
            .into_iter()
            .find(|cluster| cluster.id == subscription.cluster_id)
            .ok_or_else(|| BackendError::not_found("cluster", cluster_name))?;

        let gates = gates_by_y_stream(self.directory.version_gates()?);
        let agreements = self.directory.gate_agreements(&cluster.id)?;
        let y_streams: Vec<String> = versions::y_stream_upgrades(
            &cluster.version,
            cluster.available_upgrades.iter().map(String::as_str),
        )
        .into_iter()
        .filter(|candidate| *candidate == y_stream)
        .collect();

        let missing = missing_gates(&cluster, &y_streams, &gates, &agreements);
        if missing.is_empty() {
            tracing::info!("No unacknowledged {y_stream} gates on cluster {}", cluster.name);
        }
        for gate in &missing {
            tracing::info!(
                "{}Apply agreement for gate {} to cluster {}",
                dry_run_prefix(dry_run),
                gate.id,
                cluster.name
            );
            self.directory.add_gate_agreement(&cluster.id, &gate.id, dry_run)?;
        }
        Ok(missing.into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_parsing() {
        assert_eq!("ocmlabels".parse::<BackendKind>().unwrap(), BackendKind::OcmLabels);
        assert_eq!("".parse::<BackendKind>().unwrap(), BackendKind::OcmLabels);
        assert!(matches!(
            "etcd".parse::<BackendKind>(),
            Err(BackendError::UnknownBackend(_))
        ));
        assert_eq!(BackendKind::default().to_string(), "ocmlabels");
    }

    #[test]
    fn apply_options() {
        let options = ApplyOptions::new(true, false);
        assert!(options.dump);
        assert!(!options.dry_run);
        assert_eq!(ApplyOptions::default(), ApplyOptions::new(false, false));
    }

    fn gate(id: &str, y_stream: &str, sts_only: bool) -> VersionGate {
        VersionGate {
            id: id.to_string(),
            version_raw_id_prefix: y_stream.to_string(),
            sts_only,
            ..VersionGate::default()
        }
    }

    #[test]
    fn missing_gates_skip_acknowledged_and_sts_only() {
        let gates = gates_by_y_stream(vec![
            gate("g1", "4.13", false),
            gate("g2", "4.13", true),
            gate("g3", "4.14", false),
            gate("g4", "4.15", false),
        ]);
        let cluster = Cluster {
            id: "c1".to_string(),
            ..Cluster::default()
        };
        let y_streams = vec!["4.13".to_string(), "4.14".to_string()];

        let ids = |cluster: &Cluster, agreements: &[String]| -> Vec<String> {
            missing_gates(cluster, &y_streams, &gates, agreements)
                .into_iter()
                .map(|gate| gate.id.clone())
                .collect()
        };
        assert_eq!(ids(&cluster, &[]), vec!["g1", "g3"]);
        assert_eq!(ids(&cluster, &["g3".to_string()]), vec!["g1"]);

        let sts = Cluster {
            sts_enabled: true,
            ..cluster.clone()
        };
        assert_eq!(ids(&sts, &[]), vec!["g1", "g2", "g3"]);
    }
}
