//! Removal matcher: partial-specification equality between bindings.

use crate::binding::Binding;

/// Decide whether `existing` should be treated as equal to `candidate` for
/// removal purposes.
///
/// The candidate may be partially specified:
///
/// - identifier alone matches every binding with that identifier;
/// - a non-empty username narrows to bindings with that exact username;
/// - non-empty groups narrow to bindings whose group sequence is equal in
///   order and content (exact sequence equality, not subset);
/// - when both username and groups are set, both must agree; a mismatch in
///   either suppresses the match regardless of the other.
///
/// Empty candidate fields never veto a match.
pub fn matches<B: Binding>(candidate: &B, existing: &B) -> bool {
    if existing.identifier() != candidate.identifier() {
        return false;
    }

    if !candidate.groups().is_empty() && existing.groups() != candidate.groups() {
        return false;
    }

    if !candidate.username().is_empty() && existing.username() != candidate.username() {
        return false;
    }

    true
}
