//! Entity to label encoding
//!
//! List values are stored as comma separated strings. Empty collections are
//! not encoded at all, so reconciliation deletes their label.

use std::collections::BTreeMap;

use aus_core::versions::split_csv;
use aus_core::{ClusterUpgradePolicy, InheritanceConfig, Sector};

use crate::error::LabelError;
use crate::key::LabelKey;
use crate::label::Label;

fn join<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Labels of a sector configuration
///
/// One dependency label per sector with dependencies and one cap label per
/// sector with a cap.
#[must_use]
pub fn sectors_to_labels(sectors: &[Sector]) -> Vec<Label> {
    let mut labels = Vec::new();
    for sector in sectors {
        if !sector.dependencies.is_empty() {
            labels.push(Label::from_key(
                &LabelKey::SectorDeps(sector.name.clone()),
                join(&sector.dependencies),
            ));
        }
        if let Some(max) = &sector.max_parallel_upgrades {
            labels.push(Label::from_key(
                &LabelKey::SectorMaxParallelUpgrades(sector.name.clone()),
                max.clone(),
            ));
        }
    }
    labels
}

/// Sectors from organization labels, sorted by name
///
/// Dependency and cap labels of the same sector are merged. Labels with
/// other keys are skipped.
#[must_use]
pub fn sectors_from_labels(labels: &[Label]) -> Vec<Sector> {
    let mut sectors: BTreeMap<String, Sector> = BTreeMap::new();
    for label in labels {
        match label.typed_key() {
            Some(LabelKey::SectorDeps(name)) => {
                let sector = sectors
                    .remove(&name)
                    .unwrap_or_else(|| Sector::new(name.clone()));
                sectors.insert(name, sector.add_dependencies(split_csv(&label.value)));
            }
            Some(LabelKey::SectorMaxParallelUpgrades(name)) => {
                let value = label.value.trim();
                if value.is_empty() {
                    continue;
                }
                sectors
                    .entry(name)
                    .or_insert_with_key(|name| Sector::new(name.clone()))
                    .max_parallel_upgrades = Some(value.to_string());
            }
            _ => {}
        }
    }
    sectors.into_values().collect()
}

/// Organization label of blocked version expressions, `None` when empty
#[must_use]
pub fn blocked_versions_to_label(expressions: &[String]) -> Option<Label> {
    if expressions.is_empty() {
        return None;
    }
    Some(Label::from_key(&LabelKey::BlockedVersions, join(expressions)))
}

/// Blocked version expressions from labels, sorted
#[must_use]
pub fn blocked_versions_from_labels(labels: &[Label]) -> Vec<String> {
    let mut expressions: Vec<String> = labels
        .iter()
        .filter(|label| label.typed_key() == Some(LabelKey::BlockedVersions))
        .flat_map(|label| split_csv(&label.value))
        .collect();
    expressions.sort();
    expressions.dedup();
    expressions
}

/// Labels of an inheritance configuration
#[must_use]
pub fn inheritance_to_labels(config: &InheritanceConfig) -> Vec<Label> {
    let mut labels = Vec::new();
    if !config.inheriting_from.is_empty() {
        labels.push(Label::from_key(
            &LabelKey::VersionDataInherit,
            join(&config.inheriting_from),
        ));
    }
    if !config.publishing_to.is_empty() {
        labels.push(Label::from_key(
            &LabelKey::VersionDataPublish,
            join(&config.publishing_to),
        ));
    }
    labels
}

/// Inheritance configuration from labels
#[must_use]
pub fn inheritance_from_labels(labels: &[Label]) -> InheritanceConfig {
    labels
        .iter()
        .fold(InheritanceConfig::new(), |config, label| match label.typed_key() {
            Some(LabelKey::VersionDataInherit) => {
                config.with_inheriting_from(split_csv(&label.value))
            }
            Some(LabelKey::VersionDataPublish) => config.with_publishing_to(split_csv(&label.value)),
            _ => config,
        })
}

/// Subscription labels of a policy
///
/// Sector, mutexes and blocked versions are omitted when unset.
#[must_use]
pub fn policy_to_labels(policy: &ClusterUpgradePolicy) -> Vec<Label> {
    let conditions = &policy.conditions;
    let mut labels = vec![
        Label::from_key(&LabelKey::SoakDays, conditions.soak_days.to_string()),
        Label::from_key(&LabelKey::Workloads, join(&policy.workloads)),
        Label::from_key(&LabelKey::Schedule, policy.schedule.clone()),
    ];
    let sector = conditions.sector.as_deref().map(str::trim);
    if let Some(sector) = sector.filter(|sector| !sector.is_empty()) {
        labels.push(Label::from_key(&LabelKey::Sector, sector));
    }
    if !conditions.mutexes.is_empty() {
        labels.push(Label::from_key(&LabelKey::Mutexes, join(&conditions.mutexes)));
    }
    if !conditions.blocked_versions.is_empty() {
        labels.push(Label::from_key(
            &LabelKey::BlockedVersions,
            join(&conditions.blocked_versions),
        ));
    }
    labels
}

/// Policy of a cluster from its subscription labels
///
/// Missing labels leave the corresponding field at its default; a policy
/// without schedule label has an empty schedule.
///
/// # Errors
/// Returns [`LabelError::InvalidValue`] if the soak days label is not an
/// integer
pub fn policy_from_labels(
    cluster_name: &str,
    labels: &[Label],
) -> Result<ClusterUpgradePolicy, LabelError> {
    let mut policy = ClusterUpgradePolicy::new(cluster_name, "");
    for label in labels {
        let Some(key) = label.typed_key() else {
            continue;
        };
        match key {
            LabelKey::Schedule => policy.schedule.clone_from(&label.value),
            LabelKey::Workloads => policy.workloads = split_csv(&label.value),
            LabelKey::Mutexes => policy.conditions.mutexes = split_csv(&label.value),
            LabelKey::BlockedVersions => {
                policy.conditions.blocked_versions = split_csv(&label.value);
            }
            LabelKey::Sector => {
                let sector = label.value.trim();
                policy.conditions.sector = (!sector.is_empty()).then(|| sector.to_string());
            }
            LabelKey::SoakDays => {
                policy.conditions.soak_days = label
                    .value
                    .trim()
                    .parse()
                    .map_err(|e| LabelError::invalid_value(&label.key, &label.value, e))?;
            }
            _ => {}
        }
    }
    Ok(policy)
}

/// Check if labels carry a policy (a schedule)
#[must_use]
pub fn has_policy(labels: &[Label]) -> bool {
    labels
        .iter()
        .any(|label| label.typed_key() == Some(LabelKey::Schedule) && !label.value.is_empty())
}
