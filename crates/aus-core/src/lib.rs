//! AUS Core
//!
//! Domain model and merge logic for fleet upgrade policies.
//!
//! # Core Concepts
//!
//! - [`Sector`]: Node of the staged rollout graph with an optional parallelism cap
//! - [`ClusterUpgradePolicy`]: Schedule, soak period and constraints of one cluster
//! - [`InheritanceConfig`]: Version data links between organizations
//! - [`versions`]: Blocked version expressions and matching
//! - [`consolidate_sectors`] and friends: Merge desired deltas into current state
//!
//! # Example
//!
//! ```rust,ignore
//! use aus_core::{consolidate_sectors, parse_sector_list, UpdateMode};
//!
//! let to_add = parse_sector_list(["prod=stage"])?;
//! let current = if UpdateMode::from_replace_flag(replace).needs_current() {
//!     fetch_current()?
//! } else {
//!     Vec::new()
//! };
//! let sectors = consolidate_sectors(current, &to_add, &[], &[]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod consolidate;
mod error;
mod inheritance;
mod policy;
mod sector;
mod upgrades;

pub mod schedule;
pub mod versions;

// Re-exports
pub use consolidate::{
    consolidate_inheritance, consolidate_sector_dependencies, consolidate_sectors,
    consolidate_version_blocks, PruneRule, SectorMap, UpdateMode,
};
pub use error::{AusError, AusResult, InputError, PatternError};
pub use inheritance::{read_inheritance, InheritanceConfig};
pub use policy::{read_policies, sort_policies, ClusterUpgradePolicy, PolicyConditions};
pub use sector::{
    complete_graph, parse_max_parallel_upgrades_list, parse_sector_list, read_sectors,
    sort_sectors, Sector,
};
pub use upgrades::UpgradeFilter;
pub use versions::CompiledPattern;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
