//! Mutation operations against the auth document.
//!
//! Operations are pure: `apply` turns one document into another and reports
//! whether anything changed. Validation is eager and returns errors; exit
//! behavior is the caller's decision, never this layer's.

use serde::{Deserialize, Serialize};

use crate::binding::{Binding, RoleBinding, UserBinding};
use crate::document::AuthDocument;
use crate::error::{DomainError, DomainResult};
use crate::mutate;

/// A single mutation of the auth document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapOperation {
    /// Remove role bindings matching the candidate (partial specification).
    RemoveRoles(RoleBinding),
    /// Remove user bindings matching the candidate (partial specification).
    RemoveUsers(UserBinding),
    /// Remove every binding (role and user) mapped to this username.
    RemoveByUsername(String),
    /// Insert the role binding, or replace the one sharing its ARN.
    UpsertRole(RoleBinding),
    /// Insert the user binding, or replace the one sharing its ARN.
    UpsertUser(UserBinding),
}

/// Result of applying an operation to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub document: AuthDocument,
    pub changed: bool,
}

impl MapOperation {
    /// Reject malformed operations before any IO happens.
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            MapOperation::RemoveRoles(candidate) => {
                if candidate.role_arn.is_empty() {
                    return Err(DomainError::validation("rolearn not provided"));
                }
            }
            MapOperation::RemoveUsers(candidate) => {
                if candidate.user_arn.is_empty() {
                    return Err(DomainError::validation("userarn not provided"));
                }
            }
            MapOperation::RemoveByUsername(username) => {
                if username.is_empty() {
                    return Err(DomainError::validation("username not provided"));
                }
            }
            MapOperation::UpsertRole(binding) => {
                if binding.role_arn.is_empty() {
                    return Err(DomainError::validation("rolearn not provided"));
                }
                if binding.username.is_empty() {
                    return Err(DomainError::validation("username not provided"));
                }
            }
            MapOperation::UpsertUser(binding) => {
                if binding.user_arn.is_empty() {
                    return Err(DomainError::validation("userarn not provided"));
                }
                if binding.username.is_empty() {
                    return Err(DomainError::validation("username not provided"));
                }
            }
        }
        Ok(())
    }

    /// Apply this operation to `document`, producing a new document.
    pub fn apply(&self, document: &AuthDocument) -> MutationOutcome {
        match self {
            MapOperation::RemoveRoles(candidate) => {
                let (role_bindings, changed) =
                    mutate::remove_matching(&document.role_bindings, candidate);
                MutationOutcome {
                    document: AuthDocument {
                        role_bindings,
                        user_bindings: document.user_bindings.clone(),
                    },
                    changed,
                }
            }
            MapOperation::RemoveUsers(candidate) => {
                let (user_bindings, changed) =
                    mutate::remove_matching(&document.user_bindings, candidate);
                MutationOutcome {
                    document: AuthDocument {
                        role_bindings: document.role_bindings.clone(),
                        user_bindings,
                    },
                    changed,
                }
            }
            MapOperation::RemoveByUsername(username) => {
                // Operates on both sequences, unlike the targeted removals.
                let (role_bindings, roles_changed) =
                    mutate::remove_by_username(&document.role_bindings, username);
                let (user_bindings, users_changed) =
                    mutate::remove_by_username(&document.user_bindings, username);
                MutationOutcome {
                    document: AuthDocument {
                        role_bindings,
                        user_bindings,
                    },
                    changed: roles_changed || users_changed,
                }
            }
            MapOperation::UpsertRole(binding) => {
                let (role_bindings, changed) = mutate::upsert(&document.role_bindings, binding);
                MutationOutcome {
                    document: AuthDocument {
                        role_bindings,
                        user_bindings: document.user_bindings.clone(),
                    },
                    changed,
                }
            }
            MapOperation::UpsertUser(binding) => {
                let (user_bindings, changed) = mutate::upsert(&document.user_bindings, binding);
                MutationOutcome {
                    document: AuthDocument {
                        role_bindings: document.role_bindings.clone(),
                        user_bindings,
                    },
                    changed,
                }
            }
        }
    }

    /// Whether a `changed = false` outcome means "no matching binding".
    ///
    /// For upserts an unchanged document is a successful no-op instead.
    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            MapOperation::RemoveRoles(_)
                | MapOperation::RemoveUsers(_)
                | MapOperation::RemoveByUsername(_)
        )
    }

    /// The value this operation targets, for error messages and logs.
    pub fn target(&self) -> &str {
        match self {
            MapOperation::RemoveRoles(c) => &c.role_arn,
            MapOperation::RemoveUsers(c) => &c.user_arn,
            MapOperation::RemoveByUsername(username) => username,
            MapOperation::UpsertRole(b) => &b.role_arn,
            MapOperation::UpsertUser(b) => &b.user_arn,
        }
    }
}

impl core::fmt::Display for MapOperation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MapOperation::RemoveRoles(c) => write!(f, "remove role bindings for {}", c.role_arn),
            MapOperation::RemoveUsers(c) => write!(f, "remove user bindings for {}", c.user_arn),
            MapOperation::RemoveByUsername(username) => {
                write!(f, "remove bindings for username {username}")
            }
            MapOperation::UpsertRole(b) => write!(f, "upsert role binding for {}", b.role_arn),
            MapOperation::UpsertUser(b) => write!(f, "upsert user binding for {}", b.user_arn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> AuthDocument {
        AuthDocument {
            role_bindings: vec![
                RoleBinding::new("arn:aws:iam::111:role/admin")
                    .with_username("admin")
                    .with_groups(["system:masters"]),
                RoleBinding::new("arn:aws:iam::111:role/dev").with_username("shared"),
            ],
            user_bindings: vec![
                UserBinding::new("arn:aws:iam::111:user/ops").with_username("shared"),
                UserBinding::new("arn:aws:iam::111:user/ci").with_username("ci"),
            ],
        }
    }

    #[test]
    fn validate_rejects_empty_identifiers() {
        let cases = [
            MapOperation::RemoveRoles(RoleBinding::new("")),
            MapOperation::RemoveUsers(UserBinding::new("")),
            MapOperation::RemoveByUsername(String::new()),
            MapOperation::UpsertRole(RoleBinding::new("").with_username("x")),
            MapOperation::UpsertUser(UserBinding::new("arn:x")),
        ];

        for operation in cases {
            assert!(
                matches!(operation.validate(), Err(DomainError::Validation(_))),
                "expected validation failure for {operation:?}"
            );
        }
    }

    #[test]
    fn validate_accepts_partial_removal_candidates() {
        // Identifier alone is a legal removal candidate.
        let operation = MapOperation::RemoveRoles(RoleBinding::new("arn:aws:iam::111:role/admin"));
        assert!(operation.validate().is_ok());
    }

    #[test]
    fn remove_roles_touches_only_role_bindings() {
        let operation = MapOperation::RemoveRoles(RoleBinding::new("arn:aws:iam::111:role/admin"));
        let outcome = operation.apply(&document());

        assert!(outcome.changed);
        assert_eq!(outcome.document.role_bindings.len(), 1);
        assert_eq!(outcome.document.user_bindings, document().user_bindings);
    }

    #[test]
    fn remove_with_wrong_groups_reports_unchanged() {
        // The spec.md example: identifier matches but groups disagree.
        let operation = MapOperation::RemoveRoles(
            RoleBinding::new("arn:aws:iam::111:role/admin").with_groups(["other"]),
        );
        let outcome = operation.apply(&document());

        assert!(!outcome.changed);
        assert_eq!(outcome.document, document());
    }

    #[test]
    fn remove_by_username_spans_both_sequences() {
        let operation = MapOperation::RemoveByUsername("shared".to_string());
        let outcome = operation.apply(&document());

        assert!(outcome.changed);
        assert_eq!(outcome.document.role_bindings.len(), 1);
        assert_eq!(outcome.document.user_bindings.len(), 1);
        assert_eq!(outcome.document.role_bindings[0].username, "admin");
        assert_eq!(outcome.document.user_bindings[0].username, "ci");
    }

    #[test]
    fn remove_by_username_with_no_matches_reports_unchanged() {
        let operation = MapOperation::RemoveByUsername("ghost".to_string());
        let outcome = operation.apply(&document());

        assert!(!outcome.changed);
        assert_eq!(outcome.document, document());
    }

    #[test]
    fn upsert_user_appends_new_binding() {
        let binding = UserBinding::new("arn:aws:iam::111:user/new").with_username("new");
        let operation = MapOperation::UpsertUser(binding.clone());
        let outcome = operation.apply(&document());

        assert!(outcome.changed);
        assert_eq!(outcome.document.user_bindings.len(), 3);
        assert_eq!(outcome.document.user_bindings[2], binding);
    }

    #[test]
    fn upsert_identical_binding_reports_unchanged() {
        let binding = UserBinding::new("arn:aws:iam::111:user/ci").with_username("ci");
        let operation = MapOperation::UpsertUser(binding);
        let outcome = operation.apply(&document());

        assert!(!outcome.changed);
        assert_eq!(outcome.document, document());
    }

    #[test]
    fn removal_classification_drives_no_match_semantics() {
        assert!(MapOperation::RemoveByUsername("x".into()).is_removal());
        assert!(MapOperation::RemoveRoles(RoleBinding::new("arn:x")).is_removal());
        assert!(!MapOperation::UpsertRole(RoleBinding::new("arn:x")).is_removal());
    }
}
