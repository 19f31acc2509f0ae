//! AUS Labels
//!
//! Persists AUS policies as key/value labels on organizations and
//! subscriptions.
//!
//! # Core Concepts
//!
//! - [`LabelStore`]: Seam to the remote label API
//! - [`Directory`]: Organization, subscription and cluster lookups, version gates
//! - [`LabelKey`]: Typed label keys under `sre-capabilities.aus.`
//! - [`LabelsContainer`]: Diff of current and desired labels, reconciliation
//! - [`PolicyBackend`]: Policy level operations used by the command layer
//!
//! # Example
//!
//! ```rust,ignore
//! use aus_labels::{ApplyOptions, LabelsPolicyBackend, PolicyBackend};
//!
//! let backend = LabelsPolicyBackend::new(&client, &client);
//! let current = backend.list_sectors(None)?;
//! let desired = aus_core::consolidate_sectors(current, &to_add, &[], &[]);
//! backend.apply_sectors(None, &desired, ApplyOptions::new(false, true))?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod backend;
mod container;
mod directory;
mod error;
mod key;
mod label;
mod store;

pub mod codec;

// Re-exports
pub use backend::{
    new_policy_backend, ApplyOptions, ApplyOutcome, BackendKind, ClusterStatus, GateReport,
    LabelsPolicyBackend, MissingGate, PolicyBackend, StatusReport,
};
pub use container::{dry_run_prefix, LabelsContainer, ReconcileSummary};
pub use directory::{
    find_subscription, Cluster, Directory, Organization, Subscription, VersionGate,
};
pub use error::{BackendError, BackendResult, LabelError};
pub use key::{
    aus_prefix, sector_deps_prefix, sector_max_parallel_upgrades_prefix, version_data_prefix,
    LabelKey, LABEL_PREFIX,
};
pub use label::{Label, LabelScope};
pub use store::LabelStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
