use serde::{Deserialize, Serialize};
use thiserror::Error;

use authmap_core::AuthDocument;
use std::sync::Arc;

/// Coordinates of the externally-owned resource holding the auth document.
///
/// The document is a single value inside a shared namespace/name-addressed
/// key-value resource; these are its coordinates, not an identity this layer
/// owns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Default for ResourceKey {
    /// The conventional location of the cluster auth document.
    fn default() -> Self {
        Self::new("kube-system", "aws-auth")
    }
}

impl core::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Opaque revision marker supplied by the external store.
///
/// Must be presented unchanged on write; the store rejects a write whose
/// token no longer matches the resource's current token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched document together with the token required to write it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedDocument {
    pub document: AuthDocument,
    pub token: VersionToken,
}

/// Document store operation error.
///
/// These are **infrastructure errors**; domain failures (validation, no
/// match) live in `authmap-core`. Only `Conflict` is ever eligible for
/// retry, and only by the update cycle.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The presented version token no longer matches the resource.
    #[error("write conflict: {0}")]
    Conflict(String),

    /// The resource does not exist at the given coordinates.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The stored payload could not be decoded into an `AuthDocument`.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Fetch or write failed for reasons unrelated to concurrency.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Versioned store holding the auth document.
///
/// ## Contract
///
/// - `fetch` returns the current document together with an opaque version
///   token representing the revision it was read at.
/// - `conditional_write` persists the full document iff the presented token
///   still matches the resource's current token, returning the new token;
///   otherwise it fails with `StoreError::Conflict` and persists nothing.
/// - Implementations must round-trip documents structurally:
///   `decode(encode(d)) == d`.
///
/// There is no partial success: a write either replaces the whole document
/// or leaves the resource untouched.
pub trait DocumentStore: Send + Sync {
    /// Fetch the current document and its version token.
    fn fetch(&self, key: &ResourceKey) -> Result<VersionedDocument, StoreError>;

    /// Conditionally replace the document, guarded by the version token.
    fn conditional_write(
        &self,
        key: &ResourceKey,
        document: &AuthDocument,
        token: &VersionToken,
    ) -> Result<VersionToken, StoreError>;
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn fetch(&self, key: &ResourceKey) -> Result<VersionedDocument, StoreError> {
        (**self).fetch(key)
    }

    fn conditional_write(
        &self,
        key: &ResourceKey,
        document: &AuthDocument,
        token: &VersionToken,
    ) -> Result<VersionToken, StoreError> {
        (**self).conditional_write(key, document, token)
    }
}
