//! Testing utilities for AUS workspace
//!
//! Shared fixtures and in-memory stand-ins for the OCM API.

#![allow(missing_docs)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use aus_core::{ClusterUpgradePolicy, Sector};
use aus_labels::{
    BackendError, BackendResult, Cluster, Directory, Label, LabelScope, LabelStore, Organization,
    Subscription, VersionGate,
};

pub const ORG_ID: &str = "org-1";

pub fn org_scope() -> LabelScope {
    LabelScope::Organization(ORG_ID.to_string())
}

pub fn subscription_scope(id: &str) -> LabelScope {
    LabelScope::Subscription(id.to_string())
}

pub fn sector(name: &str, dependencies: &[&str]) -> Sector {
    Sector::new(name).with_dependencies(dependencies.iter().copied())
}

pub fn sector_with_cap(name: &str, dependencies: &[&str], cap: u32) -> Sector {
    sector(name, dependencies).with_max_parallel_upgrades(cap.to_string())
}

pub fn policy(cluster_name: &str) -> ClusterUpgradePolicy {
    ClusterUpgradePolicy::new(cluster_name, "* * * * 1-4")
        .with_workloads(["api"])
        .with_soak_days(1)
}

/// A label write or delete seen by [`MemoryOcm`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOperation {
    Upsert {
        scope: LabelScope,
        key: String,
        value: String,
        dry_run: bool,
    },
    Delete {
        scope: LabelScope,
        key: String,
        dry_run: bool,
    },
}

impl LabelOperation {
    pub fn key(&self) -> &str {
        match self {
            Self::Upsert { key, .. } | Self::Delete { key, .. } => key,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

pub fn version_gate(id: &str, y_stream: &str) -> VersionGate {
    VersionGate {
        id: id.to_string(),
        version_raw_id_prefix: y_stream.to_string(),
        description: format!("acknowledge {y_stream} changes"),
        documentation_url: format!("https://docs.example.test/{id}"),
        sts_only: false,
    }
}

/// A gate agreement created through [`MemoryOcm`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateAgreement {
    pub cluster_id: String,
    pub gate_id: String,
    pub dry_run: bool,
}

/// In-memory organization with subscriptions, clusters and labels
///
/// Implements both [`LabelStore`] and [`Directory`] over the same label map,
/// so labels written through the store show up on listed subscriptions.
/// Dry-run operations are recorded but not applied.
#[derive(Debug)]
pub struct MemoryOcm {
    organization: Organization,
    subscriptions: Vec<Subscription>,
    clusters: Vec<Cluster>,
    gates: Vec<VersionGate>,
    labels: RefCell<BTreeMap<LabelScope, BTreeMap<String, String>>>,
    operations: RefCell<Vec<LabelOperation>>,
    agreements: RefCell<Vec<GateAgreement>>,
}

impl Default for MemoryOcm {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOcm {
    pub fn new() -> Self {
        Self {
            organization: Organization {
                id: ORG_ID.to_string(),
                name: "Test Org".to_string(),
                external_id: None,
            },
            subscriptions: Vec::new(),
            clusters: Vec::new(),
            gates: Vec::new(),
            labels: RefCell::new(BTreeMap::new()),
            operations: RefCell::new(Vec::new()),
            agreements: RefCell::new(Vec::new()),
        }
    }

    /// Add a ready cluster with its subscription `sub-<name>`
    pub fn with_cluster(mut self, name: &str, version: &str, available_upgrades: &[&str]) -> Self {
        let cluster_id = format!("cluster-{name}");
        self.subscriptions.push(Subscription {
            id: format!("sub-{name}"),
            display_name: name.to_string(),
            cluster_id: cluster_id.clone(),
            labels: Vec::new(),
        });
        self.clusters.push(Cluster {
            id: cluster_id,
            name: name.to_string(),
            version: version.to_string(),
            available_upgrades: available_upgrades.iter().map(ToString::to_string).collect(),
            sts_enabled: false,
        });
        self
    }

    /// Add a ready STS cluster with its subscription `sub-<name>`
    pub fn with_sts_cluster(self, name: &str, version: &str, available_upgrades: &[&str]) -> Self {
        let mut ocm = self.with_cluster(name, version, available_upgrades);
        if let Some(cluster) = ocm.clusters.last_mut() {
            cluster.sts_enabled = true;
        }
        ocm
    }

    pub fn with_version_gate(mut self, gate: VersionGate) -> Self {
        self.gates.push(gate);
        self
    }

    /// Record an existing agreement of cluster `cluster-<name>`
    pub fn with_gate_agreement(self, cluster_name: &str, gate_id: &str) -> Self {
        self.agreements.borrow_mut().push(GateAgreement {
            cluster_id: format!("cluster-{cluster_name}"),
            gate_id: gate_id.to_string(),
            dry_run: false,
        });
        self
    }

    /// Agreements created or seeded, including dry-run ones
    pub fn gate_agreements_of(&self, cluster_name: &str) -> Vec<GateAgreement> {
        let cluster_id = format!("cluster-{cluster_name}");
        self.agreements
            .borrow()
            .iter()
            .filter(|agreement| agreement.cluster_id == cluster_id)
            .cloned()
            .collect()
    }

    /// Add a subscription without a ready cluster
    pub fn with_subscription(mut self, id: &str, display_name: &str) -> Self {
        self.subscriptions.push(Subscription {
            id: id.to_string(),
            display_name: display_name.to_string(),
            cluster_id: format!("cluster-{id}"),
            labels: Vec::new(),
        });
        self
    }

    pub fn with_label(self, scope: LabelScope, key: &str, value: &str) -> Self {
        self.labels
            .borrow_mut()
            .entry(scope)
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn labels_of(&self, scope: &LabelScope) -> Vec<Label> {
        self.labels
            .borrow()
            .get(scope)
            .map(|labels| {
                labels
                    .iter()
                    .map(|(key, value)| Label::new(key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn value(&self, scope: &LabelScope, key: &str) -> Option<String> {
        self.labels
            .borrow()
            .get(scope)
            .and_then(|labels| labels.get(key).cloned())
    }

    pub fn operations(&self) -> Vec<LabelOperation> {
        self.operations.borrow().clone()
    }
}

impl LabelStore for MemoryOcm {
    fn list_labels(&self, scope: &LabelScope, key_prefix: &str) -> BackendResult<Vec<Label>> {
        Ok(self
            .labels_of(scope)
            .into_iter()
            .filter(|label| label.key.starts_with(key_prefix))
            .collect())
    }

    fn upsert_label(
        &self,
        scope: &LabelScope,
        key: &str,
        value: &str,
        dry_run: bool,
    ) -> BackendResult<()> {
        self.operations.borrow_mut().push(LabelOperation::Upsert {
            scope: scope.clone(),
            key: key.to_string(),
            value: value.to_string(),
            dry_run,
        });
        if !dry_run {
            self.labels
                .borrow_mut()
                .entry(scope.clone())
                .or_default()
                .insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn delete_label(&self, scope: &LabelScope, key: &str, dry_run: bool) -> BackendResult<()> {
        self.operations.borrow_mut().push(LabelOperation::Delete {
            scope: scope.clone(),
            key: key.to_string(),
            dry_run,
        });
        if self.value(scope, key).is_none() {
            return Err(BackendError::not_found("label", key));
        }
        if !dry_run {
            if let Some(labels) = self.labels.borrow_mut().get_mut(scope) {
                labels.remove(key);
            }
        }
        Ok(())
    }
}

impl Directory for MemoryOcm {
    fn current_organization_id(&self) -> BackendResult<String> {
        Ok(self.organization.id.clone())
    }

    fn organization(&self, organization_id: &str) -> BackendResult<Organization> {
        if organization_id == self.organization.id {
            Ok(self.organization.clone())
        } else {
            Err(BackendError::not_found("organization", organization_id))
        }
    }

    fn subscriptions(
        &self,
        organization_id: &str,
        display_name: Option<&str>,
    ) -> BackendResult<Vec<Subscription>> {
        if organization_id != self.organization.id {
            return Ok(Vec::new());
        }
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| display_name.map_or(true, |name| s.display_name == name))
            .map(|s| Subscription {
                labels: self.labels_of(&subscription_scope(&s.id)),
                ..s.clone()
            })
            .collect())
    }

    fn clusters(&self, organization_id: &str) -> BackendResult<Vec<Cluster>> {
        if organization_id != self.organization.id {
            return Ok(Vec::new());
        }
        Ok(self.clusters.clone())
    }

    fn version_gates(&self) -> BackendResult<Vec<VersionGate>> {
        Ok(self.gates.clone())
    }

    fn gate_agreements(&self, cluster_id: &str) -> BackendResult<Vec<String>> {
        Ok(self
            .agreements
            .borrow()
            .iter()
            .filter(|agreement| agreement.cluster_id == cluster_id && !agreement.dry_run)
            .map(|agreement| agreement.gate_id.clone())
            .collect())
    }

    fn add_gate_agreement(
        &self,
        cluster_id: &str,
        gate_id: &str,
        dry_run: bool,
    ) -> BackendResult<()> {
        if !self.clusters.iter().any(|cluster| cluster.id == cluster_id) {
            return Err(BackendError::not_found("cluster", cluster_id));
        }
        self.agreements.borrow_mut().push(GateAgreement {
            cluster_id: cluster_id.to_string(),
            gate_id: gate_id.to_string(),
            dry_run,
        });
        Ok(())
    }
}

/// Store and directory that fail every call
#[derive(Debug, Default)]
pub struct FailingOcm;

impl FailingOcm {
    fn error() -> BackendError {
        BackendError::Unavailable("connection refused".to_string())
    }
}

impl LabelStore for FailingOcm {
    fn list_labels(&self, _scope: &LabelScope, _key_prefix: &str) -> BackendResult<Vec<Label>> {
        Err(Self::error())
    }

    fn upsert_label(
        &self,
        _scope: &LabelScope,
        _key: &str,
        _value: &str,
        _dry_run: bool,
    ) -> BackendResult<()> {
        Err(Self::error())
    }

    fn delete_label(&self, _scope: &LabelScope, _key: &str, _dry_run: bool) -> BackendResult<()> {
        Err(Self::error())
    }
}

impl Directory for FailingOcm {
    fn current_organization_id(&self) -> BackendResult<String> {
        Err(Self::error())
    }

    fn organization(&self, _organization_id: &str) -> BackendResult<Organization> {
        Err(Self::error())
    }

    fn subscriptions(
        &self,
        _organization_id: &str,
        _display_name: Option<&str>,
    ) -> BackendResult<Vec<Subscription>> {
        Err(Self::error())
    }

    fn clusters(&self, _organization_id: &str) -> BackendResult<Vec<Cluster>> {
        Err(Self::error())
    }

    fn version_gates(&self) -> BackendResult<Vec<VersionGate>> {
        Err(Self::error())
    }

    fn gate_agreements(&self, _cluster_id: &str) -> BackendResult<Vec<String>> {
        Err(Self::error())
    }

    fn add_gate_agreement(
        &self,
        _cluster_id: &str,
        _gate_id: &str,
        _dry_run: bool,
    ) -> BackendResult<()> {
        Err(Self::error())
    }
}
