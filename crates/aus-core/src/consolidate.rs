//! Consolidation engine
//!
//! Merges a desired delta (additions, removals, overrides) into the current
//! remote state, producing the state to persist. All merges are set-like:
//! adding something present or removing something absent is a no-op.
//!
//! Replace semantics need no separate algorithm: callers pass an empty
//! current state (see [`UpdateMode`]) and the add/prune phases do the rest.

use std::collections::{BTreeMap, BTreeSet};

use crate::inheritance::InheritanceConfig;
use crate::sector::Sector;
use crate::versions;

/// How desired state relates to current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Merge into the current state
    #[default]
    Modify,
    /// Discard the current state
    Replace,
}

impl UpdateMode {
    /// Mode selected by a `--replace` flag
    #[inline]
    #[must_use]
    pub fn from_replace_flag(replace: bool) -> Self {
        if replace {
            Self::Replace
        } else {
            Self::Modify
        }
    }

    /// Check if current state must be fetched
    #[inline]
    #[must_use]
    pub fn needs_current(self) -> bool {
        matches!(self, Self::Modify)
    }
}

/// Which sectors are dropped by [`SectorMap::prune`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneRule {
    /// No dependencies and no parallelism cap
    Obsolete,
    /// No dependencies, regardless of parallelism cap
    EmptyDependencies,
}

/// Working set of sectors keyed by name
///
/// Each phase consumes the map and returns the next one, so no entry is
/// ever aliased while another phase iterates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectorMap(BTreeMap<String, Sector>);

impl SectorMap {
    /// Index sectors by name; a later entry replaces an earlier one
    #[must_use]
    pub fn from_sectors<I>(sectors: I) -> Self
    where
        I: IntoIterator<Item = Sector>,
    {
        Self(
            sectors
                .into_iter()
                .map(|sector| (sector.name.clone(), sector))
                .collect(),
        )
    }

    /// Overwrite parallelism caps, inserting sectors that do not exist yet
    #[must_use]
    pub fn apply_max_parallel_overrides(mut self, overrides: &[Sector]) -> Self {
        for sector in overrides {
            match self.0.get_mut(&sector.name) {
                Some(current) => {
                    current
                        .max_parallel_upgrades
                        .clone_from(&sector.max_parallel_upgrades);
                }
                None => {
                    self.0.insert(
                        sector.name.clone(),
                        Sector {
                            max_parallel_upgrades: sector.max_parallel_upgrades.clone(),
                            ..Sector::new(sector.name.clone())
                        },
                    );
                }
            }
        }
        self
    }

    /// Merge dependencies of known sectors, insert unknown ones
    ///
    /// The cap of a known sector is only overwritten when the incoming one
    /// is set.
    #[must_use]
    pub fn apply_additions(mut self, additions: &[Sector]) -> Self {
        for sector in additions {
            let merged = match self.0.remove(&sector.name) {
                Some(current) => {
                    let mut merged =
                        current.add_dependencies(sector.dependencies.iter().cloned());
                    if sector.has_max_parallel_upgrades() {
                        merged
                            .max_parallel_upgrades
                            .clone_from(&sector.max_parallel_upgrades);
                    }
                    merged
                }
                None => sector.clone(),
            };
            self.0.insert(sector.name.clone(), merged);
        }
        self
    }

    /// Remove listed dependencies; unknown sectors are ignored
    #[must_use]
    pub fn apply_removals(mut self, removals: &[Sector]) -> Self {
        for sector in removals {
            if let Some(current) = self.0.remove(&sector.name) {
                let reduced = sector
                    .dependencies
                    .iter()
                    .fold(current, |acc, dependency| acc.delete_dependency(dependency));
                self.0.insert(sector.name.clone(), reduced);
            } else {
                tracing::debug!(sector = %sector.name, "ignoring removal for unknown sector");
            }
        }
        self
    }

    /// Drop sectors matching the rule
    #[must_use]
    pub fn prune(self, rule: PruneRule) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|(_, sector)| match rule {
                    PruneRule::Obsolete => !sector.is_obsolete(),
                    PruneRule::EmptyDependencies => !sector.dependencies.is_empty(),
                })
                .collect(),
        )
    }

    /// Number of sectors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no sector is left
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sectors sorted by name
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<Sector> {
        self.0.into_values().collect()
    }
}

/// Consolidate sectors with dependencies and parallelism caps
///
/// Phases: index current, apply cap overrides, apply additions, apply
/// removals, prune obsolete sectors. Result is sorted by name.
#[must_use]
pub fn consolidate_sectors(
    current: Vec<Sector>,
    to_add: &[Sector],
    to_remove: &[Sector],
    max_parallel_overrides: &[Sector],
) -> Vec<Sector> {
    SectorMap::from_sectors(current)
        .apply_max_parallel_overrides(max_parallel_overrides)
        .apply_additions(to_add)
        .apply_removals(to_remove)
        .prune(PruneRule::Obsolete)
        .into_sorted_vec()
}

/// Consolidate sector dependencies only
///
/// Like [`consolidate_sectors`] without cap overrides; sectors are pruned
/// as soon as their dependencies are empty.
#[must_use]
pub fn consolidate_sector_dependencies(
    current: Vec<Sector>,
    to_add: &[Sector],
    to_remove: &[Sector],
) -> Vec<Sector> {
    SectorMap::from_sectors(current)
        .apply_additions(to_add)
        .apply_removals(to_remove)
        .prune(PruneRule::EmptyDependencies)
        .into_sorted_vec()
}

/// Consolidate blocked version expressions
///
/// Computes `(current ∪ to_block) \ to_unblock` over normalized entries.
/// Result is sorted lexicographically.
#[must_use]
pub fn consolidate_version_blocks<S: AsRef<str>>(
    current: &[S],
    to_block: &[S],
    to_unblock: &[S],
) -> Vec<String> {
    let normalized = |entries: &[S]| -> Vec<String> {
        entries
            .iter()
            .filter_map(|entry| versions::normalize(entry.as_ref()))
            .collect()
    };

    let mut blocked: BTreeSet<String> = normalized(current).into_iter().collect();
    blocked.extend(normalized(to_block));
    for entry in normalized(to_unblock) {
        blocked.remove(&entry);
    }
    blocked.into_iter().collect()
}

/// Consolidate inheritance configurations
///
/// Additive only: the result is the per-field union.
#[must_use]
pub fn consolidate_inheritance(
    current: &InheritanceConfig,
    desired: &InheritanceConfig,
) -> InheritanceConfig {
    InheritanceConfig {
        inheriting_from: current
            .inheriting_from
            .union(&desired.inheriting_from)
            .cloned()
            .collect(),
        publishing_to: current
            .publishing_to
            .union(&desired.publishing_to)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sector(name: &str, deps: &[&str]) -> Sector {
        Sector::new(name).with_dependencies(deps.iter().copied())
    }

    fn deps(sector: &Sector) -> Vec<&str> {
        sector.dependencies.iter().map(String::as_str).collect()
    }

    #[test]
    fn update_mode_from_flag() {
        assert_eq!(UpdateMode::from_replace_flag(true), UpdateMode::Replace);
        assert!(UpdateMode::from_replace_flag(false).needs_current());
        assert!(!UpdateMode::Replace.needs_current());
    }

    #[test]
    fn additions_merge_dependencies() {
        let result = consolidate_sectors(vec![sector("a", &["b"])], &[sector("a", &["c"])], &[], &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(deps(&result[0]), vec!["b", "c"]);
    }

    #[test]
    fn removal_prunes_empty_sector() {
        let result = consolidate_sectors(vec![sector("a", &["b"])], &[], &[sector("a", &["b"])], &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn removal_keeps_sector_with_cap() {
        let current = vec![sector("a", &["b"]).with_max_parallel_upgrades("2")];
        let result = consolidate_sectors(current, &[], &[sector("a", &["b"])], &[]);
        assert_eq!(result.len(), 1);
        assert!(result[0].dependencies.is_empty());
        assert_eq!(result[0].max_parallel_upgrades.as_deref(), Some("2"));
    }

    #[test]
    fn removal_of_unknown_sector_is_ignored() {
        let result = consolidate_sectors(vec![sector("a", &["b"])], &[], &[sector("x", &["y"])], &[]);
        assert_eq!(result, vec![sector("a", &["b"])]);
    }

    #[test]
    fn additions_insert_new_sectors() {
        let result = consolidate_sectors(vec![], &[sector("b", &["a"]), sector("a", &["c"])], &[], &[]);
        let names: Vec<_> = result.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn addition_without_cap_keeps_current_cap() {
        let current = vec![sector("a", &["b"]).with_max_parallel_upgrades("3")];
        let result = consolidate_sectors(current, &[sector("a", &["c"])], &[], &[]);
        assert_eq!(result[0].max_parallel_upgrades.as_deref(), Some("3"));
    }

    #[test]
    fn addition_with_cap_overwrites() {
        let current = vec![sector("a", &["b"]).with_max_parallel_upgrades("3")];
        let add = [sector("a", &[]).with_max_parallel_upgrades("5")];
        let result = consolidate_sectors(current, &add, &[], &[]);
        assert_eq!(result[0].max_parallel_upgrades.as_deref(), Some("5"));
    }

    #[test]
    fn override_sets_cap_on_existing_sector() {
        let overrides = [Sector::new("a").with_max_parallel_upgrades("1")];
        let result = consolidate_sectors(vec![sector("a", &["b"])], &[], &[], &overrides);
        assert_eq!(deps(&result[0]), vec!["b"]);
        assert_eq!(result[0].max_parallel_upgrades.as_deref(), Some("1"));
    }

    #[test]
    fn override_inserts_cap_only_sector() {
        let overrides = [Sector::new("z").with_max_parallel_upgrades("4")];
        let result = consolidate_sectors(vec![], &[], &[], &overrides);
        assert_eq!(result, vec![Sector::new("z").with_max_parallel_upgrades("4")]);
    }

    #[test]
    fn unset_override_clears_cap() {
        let current = vec![Sector::new("a").with_max_parallel_upgrades("4")];
        let result = consolidate_sectors(current, &[], &[], &[Sector::new("a")]);
        assert!(result.is_empty());
    }

    #[test]
    fn dependency_only_variant_prunes_cap_only_sectors() {
        let current = vec![
            Sector::new("a").with_max_parallel_upgrades("2"),
            sector("b", &["a"]),
        ];
        let result = consolidate_sector_dependencies(current, &[], &[]);
        assert_eq!(result, vec![sector("b", &["a"])]);
    }

    #[test]
    fn sector_map_phases() {
        let map = SectorMap::from_sectors(vec![sector("a", &["b"])])
            .apply_additions(&[sector("c", &["a"])])
            .prune(PruneRule::Obsolete);
        assert_eq!(map.len(), 2);
        assert!(!map.is_empty());
    }

    #[test]
    fn version_blocks_set_algebra() {
        let result = consolidate_version_blocks(&["4.12.*"], &["4.13.*"], &["4.12.*"]);
        assert_eq!(result, vec!["4.13.*"]);
    }

    #[test]
    fn version_blocks_normalize_entries() {
        let result = consolidate_version_blocks(&[" 4.12.1,", ""], &["4.12.1", ", "], &[]);
        assert_eq!(result, vec!["4.12.1"]);
    }

    #[test]
    fn version_blocks_unblock_absent_is_noop() {
        let result = consolidate_version_blocks(&["b", "a"], &[], &["c"]);
        assert_eq!(result, vec!["a", "b"]);
    }

    #[test]
    fn inheritance_union() {
        let current = InheritanceConfig::new().with_inheriting_from(["org1"]);
        let desired = InheritanceConfig::new()
            .with_inheriting_from(["org1", "org2"])
            .with_publishing_to(["org3"]);
        let result = consolidate_inheritance(&current, &desired);
        assert_eq!(
            result.inheriting_from.iter().collect::<Vec<_>>(),
            vec!["org1", "org2"]
        );
        assert_eq!(result.publishing_to.len(), 1);
    }

    #[test]
    fn inheritance_replace_uses_empty_current() {
        let desired = InheritanceConfig::new().with_publishing_to(["org9"]);
        let result = consolidate_inheritance(&InheritanceConfig::default(), &desired);
        assert_eq!(result, desired);
    }
}
