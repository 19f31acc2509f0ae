//! Label store seam
//!
//! Provides the [`LabelStore`] trait the reconciliation adapter talks to.
//! Implementations perform blocking calls; there is no retry and no
//! concurrency token, so concurrent writers race and the last one wins.

use crate::error::BackendResult;
use crate::label::{Label, LabelScope};

/// Key/value label storage attached to organizations and subscriptions
pub trait LabelStore: std::fmt::Debug {
    /// List labels of an entity whose key starts with `key_prefix`
    ///
    /// # Errors
    /// Returns `BackendError::Unavailable` if the store cannot be reached and
    /// `BackendError::NotFound` if the entity does not exist
    fn list_labels(&self, scope: &LabelScope, key_prefix: &str) -> BackendResult<Vec<Label>>;

    /// Create or overwrite a label
    ///
    /// With `dry_run` the call is only reported.
    ///
    /// # Errors
    /// Returns `BackendError` if the store rejects the write
    fn upsert_label(
        &self,
        scope: &LabelScope,
        key: &str,
        value: &str,
        dry_run: bool,
    ) -> BackendResult<()>;

    /// Delete a label
    ///
    /// With `dry_run` the call is only reported.
    ///
    /// # Errors
    /// Returns `BackendError` if the store rejects the delete
    fn delete_label(&self, scope: &LabelScope, key: &str, dry_run: bool) -> BackendResult<()>;
}

impl<T: LabelStore + ?Sized> LabelStore for &T {
    fn list_labels(&self, scope: &LabelScope, key_prefix: &str) -> BackendResult<Vec<Label>> {
        (**self).list_labels(scope, key_prefix)
    }

    fn upsert_label(
        &self,
        scope: &LabelScope,
        key: &str,
        value: &str,
        dry_run: bool,
    ) -> BackendResult<()> {
        (**self).upsert_label(scope, key, value, dry_run)
    }

    fn delete_label(&self, scope: &LabelScope, key: &str, dry_run: bool) -> BackendResult<()> {
        (**self).delete_label(scope, key, dry_run)
    }
}
