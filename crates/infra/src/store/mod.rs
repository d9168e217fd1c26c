//! Versioned document store boundary.
//!
//! This module defines an infrastructure-facing abstraction for fetching and
//! conditionally writing the auth document without making any storage
//! assumptions. Real deployments back this with the cluster's key-value
//! resource; tests and development use the in-memory implementation.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{DocumentStore, ResourceKey, StoreError, VersionToken, VersionedDocument};
