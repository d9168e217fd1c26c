//! The update cycle: fetch, mutate, conditional write, retry on conflict.
//!
//! ```text
//! Operation
//!   ↓
//! 1. Validate operation (and retry policy, when supplied)
//!   ↓
//! 2. Fetch document + version token from the store
//!   ↓
//! 3. Apply the mutation to the fetched document (pure)
//!   ↓
//! 4. Conditional write guarded by the fetched token
//!   ↓
//! Done | conflict → backoff, re-fetch, re-apply | fatal error
//! ```
//!
//! Multiple invocations may race against the same external resource; the
//! store's token check is the only coordination. Whichever writer commits
//! first wins, the loser re-fetches and re-applies its operation against the
//! fresh state: last-committed-wins with safe re-application, never a blind
//! overwrite of a concurrent writer's change.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use authmap_core::{DomainError, MapOperation};

use crate::observer::UpdateObserver;
use crate::retry::RetryPolicy;
use crate::store::{DocumentStore, ResourceKey, StoreError};

/// Update cycle error.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The operation (or retry policy) is malformed. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A removal matched zero bindings. Distinct from success.
    #[error("no matching binding: {0}")]
    NoMatch(String),

    /// Write conflicts persisted past the attempt budget. Terminal.
    #[error("write conflicts exhausted after {attempts} attempt(s)")]
    ConflictExhausted { attempts: u32 },

    /// The caller's cancellation flag was set before a fetch or a sleep.
    #[error("update cancelled")]
    Cancelled,

    /// Fetch or write failed for reasons unrelated to concurrency.
    /// Never retried by this layer.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for UpdateError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => UpdateError::Validation(msg),
            DomainError::NoMatch(msg) => UpdateError::NoMatch(msg),
        }
    }
}

/// Successful outcome of one update-cycle invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The mutated document was committed; `attempts` counts write attempts
    /// including the successful one.
    Applied { attempts: u32 },

    /// An upsert found the document already in the desired state; no write
    /// was performed.
    Unchanged,
}

/// Conflict-safe mutator of the externally-owned auth document.
///
/// Composes a [`DocumentStore`] with an [`UpdateObserver`]; all coordination
/// with concurrent writers happens through the store's version-token check.
/// The cycle is a synchronous sequence of blocking calls; the only
/// suspension besides the store calls is the backoff sleep between retries.
#[derive(Debug)]
pub struct MapUpdater<S, O> {
    store: S,
    observer: O,
    cancel: Option<Arc<AtomicBool>>,
}

impl<S, O> MapUpdater<S, O> {
    pub fn new(store: S, observer: O) -> Self {
        Self {
            store,
            observer,
            cancel: None,
        }
    }

    /// Attach a cancellation flag, checked before each fetch and each
    /// backoff sleep.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn into_parts(self) -> (S, O) {
        (self.store, self.observer)
    }

    fn ensure_not_cancelled(&self) -> Result<(), UpdateError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(UpdateError::Cancelled),
            _ => Ok(()),
        }
    }
}

impl<S, O> MapUpdater<S, O>
where
    S: DocumentStore,
    O: UpdateObserver,
{
    /// Apply `operation` to the document at `key`.
    ///
    /// Without a retry policy the cycle performs exactly one
    /// fetch/mutate/write attempt and surfaces a conflict immediately as
    /// [`UpdateError::ConflictExhausted`]. With a policy, only write
    /// conflicts are retried; fetch, decode, and transport failures always
    /// propagate on first occurrence.
    pub fn apply(
        &self,
        key: &ResourceKey,
        operation: &MapOperation,
        retry: Option<&RetryPolicy>,
    ) -> Result<UpdateOutcome, UpdateError> {
        operation.validate()?;
        if let Some(policy) = retry {
            policy.validate()?;
        }

        let mut attempt: u32 = 1;
        loop {
            self.ensure_not_cancelled()?;

            let fetched = self.store.fetch(key)?;
            let outcome = operation.apply(&fetched.document);

            if !outcome.changed {
                if operation.is_removal() {
                    self.observer.no_match(key, operation);
                    return Err(UpdateError::NoMatch(format!(
                        "failed to {operation}, found zero matches"
                    )));
                }
                tracing::debug!(%key, %operation, "document already in desired state");
                return Ok(UpdateOutcome::Unchanged);
            }

            match self
                .store
                .conditional_write(key, &outcome.document, &fetched.token)
            {
                Ok(_) => {
                    self.observer.applied(key, operation, attempt);
                    return Ok(UpdateOutcome::Applied { attempts: attempt });
                }
                Err(StoreError::Conflict(message)) => match retry {
                    Some(policy) if attempt < policy.max_attempts => {
                        let delay = policy.delay_for(attempt);
                        tracing::debug!(%key, attempt, %message, "stale token, backing off");
                        self.observer.conflict_retry(key, attempt, delay);

                        self.ensure_not_cancelled()?;
                        std::thread::sleep(delay);
                        attempt += 1;
                        // Loop back to fetch: the mutation must be re-applied
                        // against the fresh state, not the stale document.
                    }
                    _ => {
                        self.observer.conflict_exhausted(key, attempt);
                        return Err(UpdateError::ConflictExhausted { attempts: attempt });
                    }
                },
                Err(other) => return Err(UpdateError::Store(other)),
            }
        }
    }
}
