//! Typed label keys
//!
//! Every AUS label key is `sre-capabilities.aus.<suffix>`. Sector keys carry
//! the sector name after a fixed infix, e.g.
//! `sre-capabilities.aus.sector-deps.prod`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::LabelError;

/// Namespace shared by all AUS label keys
pub const LABEL_PREFIX: &str = "sre-capabilities.aus.";

const BLOCKED_VERSIONS: &str = "blocked-versions";
const SECTOR_DEPS: &str = "sector-deps.";
const SECTOR_MAX_PARALLEL_UPGRADES: &str = "sector-max-parallel-upgrades.";
const VERSION_DATA: &str = "version-data.";
const VERSION_DATA_INHERIT: &str = "version-data.inherit";
const VERSION_DATA_PUBLISH: &str = "version-data.publish";
const SCHEDULE: &str = "schedule";
const WORKLOADS: &str = "workloads";
const SOAK_DAYS: &str = "soak-days";
const SECTOR: &str = "sector";
const MUTEXES: &str = "mutexes";

/// A known AUS label key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelKey {
    /// Blocked version expressions (organization or subscription)
    BlockedVersions,
    /// Dependencies of a sector
    SectorDeps(String),
    /// Parallelism cap of a sector
    SectorMaxParallelUpgrades(String),
    /// Organizations version data is inherited from
    VersionDataInherit,
    /// Organizations version data is published to
    VersionDataPublish,
    /// Upgrade schedule of a cluster
    Schedule,
    /// Workloads of a cluster
    Workloads,
    /// Soak days of a cluster
    SoakDays,
    /// Sector of a cluster
    Sector,
    /// Mutexes of a cluster
    Mutexes,
}

impl LabelKey {
    /// Suffix after [`LABEL_PREFIX`]
    #[must_use]
    pub fn suffix(&self) -> String {
        match self {
            Self::BlockedVersions => BLOCKED_VERSIONS.to_string(),
            Self::SectorDeps(name) => format!("{SECTOR_DEPS}{name}"),
            Self::SectorMaxParallelUpgrades(name) => {
                format!("{SECTOR_MAX_PARALLEL_UPGRADES}{name}")
            }
            Self::VersionDataInherit => VERSION_DATA_INHERIT.to_string(),
            Self::VersionDataPublish => VERSION_DATA_PUBLISH.to_string(),
            Self::Schedule => SCHEDULE.to_string(),
            Self::Workloads => WORKLOADS.to_string(),
            Self::SoakDays => SOAK_DAYS.to_string(),
            Self::Sector => SECTOR.to_string(),
            Self::Mutexes => MUTEXES.to_string(),
        }
    }

    /// Full key including the namespace
    #[must_use]
    pub fn key(&self) -> String {
        format!("{LABEL_PREFIX}{}", self.suffix())
    }

    /// Sector name for sector scoped keys
    #[must_use]
    pub fn sector_name(&self) -> Option<&str> {
        match self {
            Self::SectorDeps(name) | Self::SectorMaxParallelUpgrades(name) => Some(name),
            _ => None,
        }
    }

    /// Parse a full key
    ///
    /// # Errors
    /// Returns [`LabelError::UnknownKey`] for keys outside the namespace,
    /// unknown suffixes and sector keys without a sector name
    pub fn parse(key: &str) -> Result<Self, LabelError> {
        let unknown = || LabelError::UnknownKey(key.to_string());
        let suffix = key.strip_prefix(LABEL_PREFIX).ok_or_else(unknown)?;

        let sector_key = |infix: &str, build: fn(String) -> Self| {
            suffix
                .strip_prefix(infix)
                .filter(|name| !name.is_empty())
                .map(|name| build(name.to_string()))
        };
        if let Some(parsed) = sector_key(SECTOR_DEPS, Self::SectorDeps) {
            return Ok(parsed);
        }
        if let Some(parsed) = sector_key(
            SECTOR_MAX_PARALLEL_UPGRADES,
            Self::SectorMaxParallelUpgrades,
        ) {
            return Ok(parsed);
        }

        match suffix {
            BLOCKED_VERSIONS => Ok(Self::BlockedVersions),
            VERSION_DATA_INHERIT => Ok(Self::VersionDataInherit),
            VERSION_DATA_PUBLISH => Ok(Self::VersionDataPublish),
            SCHEDULE => Ok(Self::Schedule),
            WORKLOADS => Ok(Self::Workloads),
            SOAK_DAYS => Ok(Self::SoakDays),
            SECTOR => Ok(Self::Sector),
            MUTEXES => Ok(Self::Mutexes),
            _ => Err(unknown()),
        }
    }
}

impl Display for LabelKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{LABEL_PREFIX}{}", self.suffix())
    }
}

impl FromStr for LabelKey {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Prefix of every AUS label
#[must_use]
pub fn aus_prefix() -> &'static str {
    LABEL_PREFIX
}

/// Prefix of sector dependency labels
#[must_use]
pub fn sector_deps_prefix() -> String {
    format!("{LABEL_PREFIX}{SECTOR_DEPS}")
}

/// Prefix of sector parallelism cap labels
#[must_use]
pub fn sector_max_parallel_upgrades_prefix() -> String {
    format!("{LABEL_PREFIX}{SECTOR_MAX_PARALLEL_UPGRADES}")
}

/// Prefix of version data inheritance labels
#[must_use]
pub fn version_data_prefix() -> String {
    format!("{LABEL_PREFIX}{VERSION_DATA}")
}
