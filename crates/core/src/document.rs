//! The auth-mapping document: all role and user bindings for one cluster.

use serde::{Deserialize, Serialize};

use crate::binding::{RoleBinding, UserBinding};

/// Aggregate of every binding the cluster's authentication layer consults.
///
/// Sequences keep insertion order; mutation rebuilds them by filtering, which
/// compacts rather than marking in place. The model enforces no uniqueness:
/// duplicate identifiers may coexist, and the matcher (not a schema) decides
/// equivalence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDocument {
    #[serde(rename = "mapRoles", default, skip_serializing_if = "Vec::is_empty")]
    pub role_bindings: Vec<RoleBinding>,
    #[serde(rename = "mapUsers", default, skip_serializing_if = "Vec::is_empty")]
    pub user_bindings: Vec<UserBinding>,
}

impl AuthDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bindings across both sequences.
    pub fn len(&self) -> usize {
        self.role_bindings.len() + self.user_bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.role_bindings.is_empty() && self.user_bindings.is_empty()
    }
}

impl core::fmt::Display for AuthDocument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for binding in &self.role_bindings {
            write!(f, "{binding}")?;
        }
        for binding in &self.user_bindings {
            write!(f, "{binding}")?;
        }
        Ok(())
    }
}
