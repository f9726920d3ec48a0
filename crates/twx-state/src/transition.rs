//! # Transition Table
//!
//! Maps each status to the ordered list of statuses reachable in one step.
//! No transitive closure: `DRAFT -> PENDING -> PUBLISHED` does not make
//! `PUBLISHED` a direct successor of `DRAFT`.
//!
//! Lookups never fail. A status without a rule, or a status name that does
//! not parse, has no successors; the UI hides every action rather than
//! crashing.

use std::collections::HashMap;

use crate::status::WorkflowStatus;

/// Immutable status → successors mapping.
#[derive(Debug, Clone)]
pub struct TransitionTable<S: WorkflowStatus> {
    rules: HashMap<S, Vec<S>>,
}

impl<S: WorkflowStatus> TransitionTable<S> {
    /// An empty table. Every status is terminal until a rule is added.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Declare the successors of `from`. Duplicates are dropped, first
    /// occurrence wins; a second rule for the same `from` replaces the first.
    pub fn with_rule(mut self, from: S, to: &[S]) -> Self {
        let mut next: Vec<S> = Vec::with_capacity(to.len());
        for status in to {
            if !next.contains(status) {
                next.push(*status);
            }
        }
        self.rules.insert(from, next);
        self
    }

    /// Statuses directly reachable from `current`, in declaration order.
    pub fn next_statuses(&self, current: S) -> &[S] {
        self.rules.get(&current).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Like [`next_statuses`](Self::next_statuses) for a raw status name.
    /// Unknown names yield an empty slice.
    pub fn next_statuses_by_name(&self, name: &str) -> &[S] {
        match S::from_name(name) {
            Some(current) => self.next_statuses(current),
            None => &[],
        }
    }

    /// Whether `from -> to` is a declared edge.
    pub fn allows(&self, from: S, to: S) -> bool {
        self.next_statuses(from).contains(&to)
    }

    /// Whether `status` has no successors.
    pub fn is_terminal(&self, status: S) -> bool {
        self.next_statuses(status).is_empty()
    }

    /// Statuses of the enum that have no explicit rule. A complete table
    /// declares terminal states with an empty rule, so this should be empty.
    pub fn missing_rules(&self) -> Vec<S> {
        S::all()
            .iter()
            .copied()
            .filter(|s| !self.rules.contains_key(s))
            .collect()
    }
}

impl<S: WorkflowStatus> Default for TransitionTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpportunityStatus as O;

    fn table() -> TransitionTable<O> {
        TransitionTable::new()
            .with_rule(O::Draft, &[O::Pending, O::Archived, O::Pending])
            .with_rule(O::Archived, &[])
    }

    #[test]
    fn declared_order_is_preserved_and_duplicates_dropped() {
        assert_eq!(table().next_statuses(O::Draft), &[O::Pending, O::Archived]);
    }

    #[test]
    fn missing_rule_is_terminal() {
        let t = table();
        assert!(t.next_statuses(O::Published).is_empty());
        assert!(t.is_terminal(O::Published));
    }

    #[test]
    fn unknown_name_yields_empty() {
        let t = table();
        assert!(t.next_statuses_by_name("LAUNCHED").is_empty());
        assert!(t.next_statuses_by_name("").is_empty());
        assert_eq!(t.next_statuses_by_name("draft"), &[O::Pending, O::Archived]);
    }

    #[test]
    fn allows_only_direct_edges() {
        let t = table();
        assert!(t.allows(O::Draft, O::Pending));
        assert!(!t.allows(O::Pending, O::Draft));
    }

    #[test]
    fn missing_rules_lists_undeclared_statuses() {
        let missing = table().missing_rules();
        assert!(missing.contains(&O::Published));
        assert!(!missing.contains(&O::Draft));
        assert!(!missing.contains(&O::Archived));
    }
}
