use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use authmap_core::AuthDocument;

use super::r#trait::{DocumentStore, ResourceKey, StoreError, VersionToken, VersionedDocument};

#[derive(Debug, Clone)]
struct StoredRevision {
    payload: JsonValue,
    revision: u64,
    updated_at: DateTime<Utc>,
}

/// In-memory versioned document store.
///
/// Intended for tests/dev. Documents round-trip through their encoded form on
/// every fetch and write, so decode failures surface here the same way they
/// would against a real backend.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    resources: RwLock<HashMap<ResourceKey, StoredRevision>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the resource (or replace it wholesale), bypassing the token
    /// check. Returns the token of the seeded revision.
    pub fn seed(&self, key: &ResourceKey, document: &AuthDocument) -> Result<VersionToken, StoreError> {
        let payload = encode(document)?;
        let mut resources = lock_write(&self.resources)?;
        let revision = resources.get(key).map(|r| r.revision + 1).unwrap_or(1);
        resources.insert(
            key.clone(),
            StoredRevision {
                payload,
                revision,
                updated_at: Utc::now(),
            },
        );
        Ok(VersionToken::new(revision.to_string()))
    }

    /// When the stored revision was last written. `None` if absent.
    pub fn updated_at(&self, key: &ResourceKey) -> Option<DateTime<Utc>> {
        self.resources
            .read()
            .ok()
            .and_then(|resources| resources.get(key).map(|r| r.updated_at))
    }
}

fn encode(document: &AuthDocument) -> Result<JsonValue, StoreError> {
    serde_json::to_value(document).map_err(|e| StoreError::Decode(e.to_string()))
}

fn lock_write<'a, T>(
    lock: &'a RwLock<T>,
) -> Result<std::sync::RwLockWriteGuard<'a, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Transport("lock poisoned".to_string()))
}

impl DocumentStore for InMemoryDocumentStore {
    fn fetch(&self, key: &ResourceKey) -> Result<VersionedDocument, StoreError> {
        let resources = self
            .resources
            .read()
            .map_err(|_| StoreError::Transport("lock poisoned".to_string()))?;

        let stored = resources
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let document: AuthDocument = serde_json::from_value(stored.payload.clone())
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(VersionedDocument {
            document,
            token: VersionToken::new(stored.revision.to_string()),
        })
    }

    fn conditional_write(
        &self,
        key: &ResourceKey,
        document: &AuthDocument,
        token: &VersionToken,
    ) -> Result<VersionToken, StoreError> {
        let payload = encode(document)?;
        let mut resources = lock_write(&self.resources)?;

        let stored = resources
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        if token.as_str() != stored.revision.to_string() {
            return Err(StoreError::Conflict(format!(
                "{key}: presented token {token}, current revision {}",
                stored.revision
            )));
        }

        stored.payload = payload;
        stored.revision += 1;
        stored.updated_at = Utc::now();
        Ok(VersionToken::new(stored.revision.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authmap_core::RoleBinding;

    fn document() -> AuthDocument {
        AuthDocument {
            role_bindings: vec![
                RoleBinding::new("arn:aws:iam::111:role/admin")
                    .with_username("admin")
                    .with_groups(["system:masters"]),
            ],
            user_bindings: vec![],
        }
    }

    #[test]
    fn fetch_of_missing_resource_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let result = store.fetch(&ResourceKey::default());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn seeded_document_round_trips_structurally() {
        let store = InMemoryDocumentStore::new();
        let key = ResourceKey::default();
        store.seed(&key, &document()).unwrap();

        let fetched = store.fetch(&key).unwrap();
        assert_eq!(fetched.document, document());
    }

    #[test]
    fn write_with_current_token_succeeds_and_bumps_revision() {
        let store = InMemoryDocumentStore::new();
        let key = ResourceKey::default();
        let token = store.seed(&key, &document()).unwrap();

        let next = AuthDocument::new();
        let new_token = store.conditional_write(&key, &next, &token).unwrap();
        assert_ne!(new_token, token);

        let fetched = store.fetch(&key).unwrap();
        assert_eq!(fetched.document, next);
        assert_eq!(fetched.token, new_token);
    }

    #[test]
    fn write_with_stale_token_conflicts_and_persists_nothing() {
        let store = InMemoryDocumentStore::new();
        let key = ResourceKey::default();
        let stale = store.seed(&key, &document()).unwrap();

        // A concurrent writer advances the revision.
        let current = store.fetch(&key).unwrap();
        store
            .conditional_write(&key, &AuthDocument::new(), &current.token)
            .unwrap();

        let result = store.conditional_write(&key, &document(), &stale);
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        // The conflicting write left the winning revision untouched.
        let fetched = store.fetch(&key).unwrap();
        assert_eq!(fetched.document, AuthDocument::new());
    }

    #[test]
    fn write_to_missing_resource_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let result = store.conditional_write(
            &ResourceKey::default(),
            &document(),
            &VersionToken::new("1"),
        );
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn seed_overwrites_and_advances_revision() {
        let store = InMemoryDocumentStore::new();
        let key = ResourceKey::new("kube-system", "test-map");

        let first = store.seed(&key, &document()).unwrap();
        let second = store.seed(&key, &AuthDocument::new()).unwrap();
        assert_ne!(first, second);

        assert!(store.updated_at(&key).is_some());
        assert_eq!(store.fetch(&key).unwrap().document, AuthDocument::new());
    }
}
