//! Infrastructure layer: document store boundary, retry policy, update cycle.

pub mod observer;
pub mod retry;
pub mod store;
pub mod updater;


pub use observer::{NoopObserver, TracingObserver, UpdateObserver};
pub use retry::RetryPolicy;
pub use store::{
    DocumentStore, InMemoryDocumentStore, ResourceKey, StoreError, VersionToken, VersionedDocument,
};
pub use updater::{MapUpdater, UpdateError, UpdateOutcome};
