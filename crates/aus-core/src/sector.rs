//! Sector graph model
//!
//! Sectors group clusters for staged rollouts. A sector may depend on other
//! sectors (its clusters upgrade only after the dependencies soaked) and may
//! cap the number of clusters upgrading concurrently.
//!
//! Flag representation: `name` or `name=dep1,dep2`.

use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::InputError;

/// A named node of the sector dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    /// Unique name within an organization
    pub name: String,

    /// Sectors this sector depends on, in first-seen order
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub dependencies: IndexSet<String>,

    /// Limit on concurrent upgrades within the sector, `None` when unset
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_max_parallel_upgrades"
    )]
    pub max_parallel_upgrades: Option<String>,
}

impl Sector {
    /// Create sector without dependencies
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: IndexSet::new(),
            max_parallel_upgrades: None,
        }
    }

    /// With dependencies
    #[inline]
    #[must_use]
    pub fn with_dependencies<I, S>(self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_dependencies(dependencies)
    }

    /// With parallelism cap
    #[inline]
    #[must_use]
    pub fn with_max_parallel_upgrades(mut self, max: impl Into<String>) -> Self {
        self.max_parallel_upgrades = Some(max.into());
        self
    }

    /// Parse `name` or `name=dep1,dep2`
    ///
    /// Splits on the first `=`. Empty dependency entries are dropped.
    ///
    /// # Errors
    /// Returns [`InputError::EmptySectorName`] if the name is empty
    pub fn parse(repr: &str) -> Result<Self, InputError> {
        let (name, dependencies) = split_repr(repr)?;
        let dependencies = dependencies
            .map(|deps| {
                deps.split(',')
                    .map(str::trim)
                    .filter(|dep| !dep.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(Self::new(name).with_dependencies(dependencies))
    }

    /// Parse `name=N` into a sector carrying only a parallelism cap
    ///
    /// `name` alone yields an unset cap, which clears an existing one when
    /// used as an override.
    ///
    /// # Errors
    /// Returns [`InputError`] if the name is empty or `N` is not an unsigned
    /// integer
    pub fn parse_max_parallel_upgrades(repr: &str) -> Result<Self, InputError> {
        let (name, value) = split_repr(repr)?;
        let mut sector = Self::new(name);
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            if value.parse::<u32>().is_err() {
                return Err(InputError::InvalidMaxParallelUpgrades {
                    sector: name.to_string(),
                    value: value.to_string(),
                });
            }
            sector.max_parallel_upgrades = Some(value.to_string());
        }
        Ok(sector)
    }

    /// Check if `candidate` is a direct dependency
    #[inline]
    #[must_use]
    pub fn depends_on(&self, candidate: &str) -> bool {
        self.dependencies.contains(candidate)
    }

    /// Append dependencies not yet present, keeping first-seen order
    #[must_use]
    pub fn add_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dependency in dependencies {
            self.dependencies.insert(dependency.into());
        }
        self
    }

    /// Remove a dependency; absent dependencies are ignored
    #[must_use]
    pub fn delete_dependency(mut self, target: &str) -> Self {
        self.dependencies.shift_remove(target);
        self
    }

    /// Check if the parallelism cap is set
    #[inline]
    #[must_use]
    pub fn has_max_parallel_upgrades(&self) -> bool {
        self.max_parallel_upgrades.is_some()
    }

    /// A sector without dependencies and without cap carries no information
    #[inline]
    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        self.dependencies.is_empty() && !self.has_max_parallel_upgrades()
    }
}

impl FromStr for Sector {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split_repr(repr: &str) -> Result<(&str, Option<&str>), InputError> {
    let (name, rest) = match repr.split_once('=') {
        Some((name, rest)) => (name.trim(), Some(rest)),
        None => (repr.trim(), None),
    };
    if name.is_empty() {
        return Err(InputError::empty_sector_name(repr));
    }
    Ok((name, rest))
}

fn deserialize_max_parallel_upgrades<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Some(Raw::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Parse a list of flag representations, sorted by name
///
/// # Errors
/// Returns the first [`InputError`] encountered
pub fn parse_sector_list<I, S>(reprs: I) -> Result<Vec<Sector>, InputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sectors = reprs
        .into_iter()
        .map(|repr| Sector::parse(repr.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    sort_sectors(&mut sectors);
    Ok(sectors)
}

/// Parse a list of `name=N` cap overrides, sorted by name
///
/// # Errors
/// Returns the first [`InputError`] encountered
pub fn parse_max_parallel_upgrades_list<I, S>(reprs: I) -> Result<Vec<Sector>, InputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sectors = reprs
        .into_iter()
        .map(|repr| Sector::parse_max_parallel_upgrades(repr.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    sort_sectors(&mut sectors);
    Ok(sectors)
}

/// Sort sectors by name
pub fn sort_sectors(sectors: &mut [Sector]) {
    sectors.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Make every referenced sector explicit
///
/// Each dependency name without a sector of its own gets an empty
/// placeholder. Result is sorted by name. Cycles are not checked.
#[must_use]
pub fn complete_graph<I>(sectors: I) -> Vec<Sector>
where
    I: IntoIterator<Item = Sector>,
{
    let mut graph: BTreeMap<String, Sector> = sectors
        .into_iter()
        .map(|sector| (sector.name.clone(), sector))
        .collect();

    let referenced: Vec<String> = graph
        .values()
        .flat_map(|sector| sector.dependencies.iter().cloned())
        .collect();
    for name in referenced {
        graph
            .entry(name)
            .or_insert_with_key(|name| Sector::new(name.clone()));
    }

    graph.into_values().collect()
}

/// Read a JSON list of sectors
///
/// # Errors
/// Returns [`InputError::Decode`] for malformed documents and
/// [`InputError::EmptySectorName`] for unnamed entries
pub fn read_sectors<R: Read>(reader: R) -> Result<Vec<Sector>, InputError> {
    let sectors: Vec<Sector> = serde_json::from_reader(reader)?;
    if let Some(unnamed) = sectors.iter().find(|s| s.name.trim().is_empty()) {
        return Err(InputError::empty_sector_name(unnamed.name.clone()));
    }
    Ok(sectors)
}
