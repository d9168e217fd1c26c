//! Binding model: one external principal mapped to a cluster-local identity.

use serde::{Deserialize, Serialize};

/// Common shape of a principal-to-identity binding.
///
/// Role and user bindings are structurally identical but live in disjoint
/// identifier namespaces; this trait is the seam that lets the matcher and
/// the mutation functions be written once for both kinds.
pub trait Binding: Clone + PartialEq + core::fmt::Debug {
    /// The external principal identifier (IAM-style ARN). Non-empty key.
    fn identifier(&self) -> &str;

    /// The cluster-local username this principal maps to.
    fn username(&self) -> &str;

    /// The cluster-local groups this principal maps to (insertion order).
    fn groups(&self) -> &[String];
}

/// Mapping from an IAM role to a cluster identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    #[serde(rename = "rolearn")]
    pub role_arn: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

/// Mapping from an IAM user to a cluster identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBinding {
    #[serde(rename = "userarn")]
    pub user_arn: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl RoleBinding {
    pub fn new(role_arn: impl Into<String>) -> Self {
        Self {
            role_arn: role_arn.into(),
            username: String::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }
}

impl UserBinding {
    pub fn new(user_arn: impl Into<String>) -> Self {
        Self {
            user_arn: user_arn.into(),
            username: String::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }
}

impl Binding for RoleBinding {
    fn identifier(&self) -> &str {
        &self.role_arn
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }
}

impl Binding for UserBinding {
    fn identifier(&self) -> &str {
        &self.user_arn
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }
}

fn write_block(
    f: &mut core::fmt::Formatter<'_>,
    key: &str,
    identifier: &str,
    username: &str,
    groups: &[String],
) -> core::fmt::Result {
    writeln!(f, "- {key}: {identifier}")?;
    writeln!(f, "  username: {username}")?;
    writeln!(f, "  groups:")?;
    for group in groups {
        writeln!(f, "  - {group}")?;
    }
    Ok(())
}

impl core::fmt::Display for RoleBinding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_block(f, "rolearn", &self.role_arn, &self.username, &self.groups)
    }
}

impl core::fmt::Display for UserBinding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_block(f, "userarn", &self.user_arn, &self.username, &self.groups)
    }
}
