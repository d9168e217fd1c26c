//! Pure mutation primitives over binding sequences.
//!
//! Every function rebuilds a new sequence instead of mutating in place, so
//! the mutator stays pure and independently testable. The `changed` flag
//! tells callers whether a write is warranted at all.

use crate::binding::Binding;
use crate::matcher::matches;

/// Drop every binding the candidate matches, retaining the rest in order.
///
/// `changed` is true iff at least one element was dropped. Callers decide how
/// to surface a false result; a removal that matched nothing is a distinct
/// condition, not a silent no-op.
pub fn remove_matching<B: Binding>(existing: &[B], candidate: &B) -> (Vec<B>, bool) {
    let retained: Vec<B> = existing
        .iter()
        .filter(|binding| !matches(candidate, binding))
        .cloned()
        .collect();

    let changed = retained.len() != existing.len();
    (retained, changed)
}

/// Drop every binding whose username equals `username`, retaining the rest.
pub fn remove_by_username<B: Binding>(existing: &[B], username: &str) -> (Vec<B>, bool) {
    let retained: Vec<B> = existing
        .iter()
        .filter(|binding| binding.username() != username)
        .cloned()
        .collect();

    let changed = retained.len() != existing.len();
    (retained, changed)
}

/// Replace the first binding with the candidate's identifier, or append.
///
/// An in-place replace preserves the binding's position. Replacing with an
/// identical username/groups pair reports `changed = false` so callers can
/// skip a spurious write; an append always reports `changed = true`.
pub fn upsert<B: Binding>(existing: &[B], candidate: &B) -> (Vec<B>, bool) {
    let mut rebuilt = existing.to_vec();

    match rebuilt
        .iter()
        .position(|binding| binding.identifier() == candidate.identifier())
    {
        Some(index) => {
            if rebuilt[index] == *candidate {
                return (rebuilt, false);
            }
            rebuilt[index] = candidate.clone();
            (rebuilt, true)
        }
        None => {
            rebuilt.push(candidate.clone());
            (rebuilt, true)
        }
    }
}
