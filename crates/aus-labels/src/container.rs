//! Label reconciliation
//!
//! A [`LabelsContainer`] holds the labels currently stored on one entity and
//! the labels that should be stored there. [`LabelsContainer::reconcile`]
//! upserts every desired label and deletes every current label that is not
//! desired anymore.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::BackendResult;
use crate::label::{Label, LabelScope};
use crate::store::LabelStore;

/// Log prefix for actions that are only reported
#[must_use]
pub fn dry_run_prefix(dry_run: bool) -> &'static str {
    if dry_run {
        "[dry-run] "
    } else {
        ""
    }
}

/// Counts of label operations issued by a reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Labels created or overwritten
    pub upserted: usize,
    /// Labels deleted
    pub deleted: usize,
}

impl ReconcileSummary {
    /// Combine two summaries
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            upserted: self.upserted + other.upserted,
            deleted: self.deleted + other.deleted,
        }
    }
}

/// Current and desired labels of one entity
#[derive(Debug, Clone)]
pub struct LabelsContainer {
    scope: LabelScope,
    supported_keys: Option<BTreeSet<String>>,
    current: BTreeMap<String, Label>,
    desired: BTreeMap<String, Label>,
}

impl LabelsContainer {
    /// Container considering every current label
    #[must_use]
    pub fn new(scope: LabelScope, current: Vec<Label>) -> Self {
        Self::build(scope, None, current)
    }

    /// Container restricted to a set of keys
    ///
    /// Current labels outside the set are neither kept nor deleted, desired
    /// labels outside the set are rejected by [`add_label`](Self::add_label).
    #[must_use]
    pub fn restricting<I, S>(scope: LabelScope, current: Vec<Label>, supported_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let supported = supported_keys.into_iter().map(Into::into).collect();
        Self::build(scope, Some(supported), current)
    }

    fn build(
        scope: LabelScope,
        supported_keys: Option<BTreeSet<String>>,
        current: Vec<Label>,
    ) -> Self {
        let mut container = Self {
            scope,
            supported_keys,
            current: BTreeMap::new(),
            desired: BTreeMap::new(),
        };
        for label in current {
            if container.supports(&label.key) {
                container.current.insert(label.key.clone(), label);
            }
        }
        container
    }

    /// Entity the labels belong to
    #[inline]
    #[must_use]
    pub fn scope(&self) -> &LabelScope {
        &self.scope
    }

    /// Check if a key is handled by this container
    #[must_use]
    pub fn supports(&self, key: &str) -> bool {
        self.supported_keys
            .as_ref()
            .map_or(true, |supported| supported.contains(key))
    }

    /// Add a desired label; a later label with the same key wins
    ///
    /// Returns `false` if the key is not supported.
    pub fn add_label(&mut self, label: Label) -> bool {
        if !self.supports(&label.key) {
            tracing::warn!(key = %label.key, scope = %self.scope, "ignoring unsupported label");
            return false;
        }
        self.desired.insert(label.key.clone(), label);
        true
    }

    /// Add desired labels, stopping at the first unsupported one
    ///
    /// Returns `false` if a key is not supported.
    pub fn add_labels<I>(&mut self, labels: I) -> bool
    where
        I: IntoIterator<Item = Label>,
    {
        labels.into_iter().all(|label| self.add_label(label))
    }

    /// Desired labels in key order
    pub fn desired(&self) -> impl Iterator<Item = &Label> {
        self.desired.values()
    }

    /// Current labels that are not desired, in key order
    pub fn obsolete(&self) -> impl Iterator<Item = &Label> {
        self.current
            .values()
            .filter(|label| !self.desired.contains_key(&label.key))
    }

    /// Upsert desired labels, then delete obsolete ones
    ///
    /// Desired labels are written unconditionally, even when unchanged.
    ///
    /// # Errors
    /// Returns the first store error; operations already issued are not
    /// rolled back
    pub fn reconcile<S>(&self, store: &S, dry_run: bool) -> BackendResult<ReconcileSummary>
    where
        S: LabelStore + ?Sized,
    {
        let prefix = dry_run_prefix(dry_run);
        let mut summary = ReconcileSummary::default();

        for label in self.desired() {
            tracing::debug!("{prefix}add label {} to {}", label.key, self.scope);
            store.upsert_label(&self.scope, &label.key, &label.value, dry_run)?;
            summary.upserted += 1;
        }

        for label in self.obsolete() {
            tracing::debug!("{prefix}delete label {} from {}", label.key, self.scope);
            store.delete_label(&self.scope, &label.key, dry_run)?;
            summary.deleted += 1;
        }

        Ok(summary)
    }
}
