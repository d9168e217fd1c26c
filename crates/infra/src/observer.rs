//! Observer seam for notable update-cycle events.
//!
//! The surrounding system once logged through process-wide state; here the
//! update cycle notifies an injected observer instead, so embedders decide
//! what reaches their logs, metrics, or UI.

use std::time::Duration;

use authmap_core::MapOperation;

use crate::store::ResourceKey;

/// Callbacks invoked by the update cycle at its notable points.
///
/// All methods default to no-ops; implement only what you care about.
pub trait UpdateObserver: Send + Sync {
    /// The operation changed the document and the write was committed.
    fn applied(&self, _key: &ResourceKey, _operation: &MapOperation, _attempts: u32) {}

    /// A removal matched zero bindings; nothing was written.
    fn no_match(&self, _key: &ResourceKey, _operation: &MapOperation) {}

    /// A conditional write lost to a concurrent writer; the cycle will
    /// re-fetch and retry after `delay`.
    fn conflict_retry(&self, _key: &ResourceKey, _attempt: u32, _delay: Duration) {}

    /// Conflicts persisted past the attempt budget; the cycle gave up.
    fn conflict_exhausted(&self, _key: &ResourceKey, _attempts: u32) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl UpdateObserver for NoopObserver {}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl UpdateObserver for TracingObserver {
    fn applied(&self, key: &ResourceKey, operation: &MapOperation, attempts: u32) {
        tracing::info!(%key, %operation, attempts, "auth document updated");
    }

    fn no_match(&self, key: &ResourceKey, operation: &MapOperation) {
        tracing::warn!(%key, %operation, "could not find exact match, nothing removed");
    }

    fn conflict_retry(&self, key: &ResourceKey, attempt: u32, delay: Duration) {
        tracing::warn!(%key, attempt, ?delay, "write conflict, retrying after backoff");
    }

    fn conflict_exhausted(&self, key: &ResourceKey, attempts: u32) {
        tracing::error!(%key, attempts, "write conflicts exhausted retry budget");
    }
}
