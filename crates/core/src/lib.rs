//! `authmap-core` — pure domain model for the cluster auth-mapping document.
//!
//! This crate is intentionally decoupled from storage and transport. It holds
//! the binding model, the removal matcher, and the pure mutation operations;
//! the read-modify-write cycle that persists mutations lives in `authmap-infra`.

pub mod binding;
pub mod document;
pub mod error;
pub mod matcher;
pub mod mutate;
pub mod operation;

pub use binding::{Binding, RoleBinding, UserBinding};
pub use document::AuthDocument;
pub use error::{DomainError, DomainResult};
pub use matcher::matches;
pub use operation::{MapOperation, MutationOutcome};
