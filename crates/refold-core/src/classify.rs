//! Usage classification — which bindings the renderer may elide.
//!
//! Two independent passes over the same ordered event record:
//!
//! 1. Dead stores — bindings whose value no later event reads.
//! 2. Constants — bindings whose right-hand side is literal-only, safe to
//!    inline at every use site.
//!
//! Both passes are pure functions of the event sequence; running them twice
//! yields identical sets. They return positions into the record as built by
//! the analyzer; [`prune_conditionals`] then re-indexes the sets to the
//! numbering with conditional and loop barriers removed, since the renderer
//! never emits an elidable binding for those constructs.

use std::collections::BTreeSet;

use crate::analysis::Event;

/// The classifier's result: index sets over the event sequence.
///
/// The sets may overlap — a binding can be both a dead store and a literal.
/// Dead-store elision takes precedence at render time, since the statement
/// is dropped entirely regardless of whether it was also a constant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSets {
    /// Bindings never read by any later event.
    pub dead: BTreeSet<usize>,
    /// Bindings whose right-hand side is literal-only.
    pub consts: BTreeSet<usize>,
}

/// Classify every binding event as dead-store-eligible and/or
/// constant-eligible. Positions are pre-pruning.
pub fn classify(events: &[Event]) -> UsageSets {
    let protected = protected_index(events);
    let mut sets = UsageSets::default();
    for (index, event) in events.iter().enumerate() {
        let Event::Binding { name, dep, .. } = event else {
            continue;
        };
        if Some(index) == protected {
            continue;
        }
        if is_dead_store(name, dep.as_ref(), &events[index + 1..]) {
            sets.dead.insert(index);
        }
        if is_inlinable_constant(name, dep.as_ref(), &events[index + 1..]) {
            sets.consts.insert(index);
        }
    }
    sets
}

/// The final event's index, when it is a top-level binding. That binding
/// feeds the return tuple and is never eligible for either pass. A
/// branch-internal binding that happens to fall last stays eligible — its
/// value feeds the branch join, not the return.
fn protected_index(events: &[Event]) -> Option<usize> {
    match events.last() {
        Some(Event::Binding { depth: 0, .. }) => Some(events.len() - 1),
        _ => None,
    }
}

/// Dead-store rule: no later event may read the bound name (as identifier
/// or array base), no later barrier may follow, and no name the binding
/// itself depends on may be rebound afterward (the stale-store rule). The
/// two rules are applied as a conservative union.
fn is_dead_store(
    name: &str,
    dep: Option<&crate::analysis::RefInfo>,
    later: &[Event],
) -> bool {
    for event in later {
        match event {
            Event::Cond { .. } | Event::Loop { .. } => return false,
            Event::Binding {
                name: written,
                dep: written_dep,
                ..
            } => {
                if let Some(info) = written_dep {
                    if info.mentions(name) {
                        return false;
                    }
                }
                if let Some(own) = dep {
                    if own.mentions(written) {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// Constant rule: the right-hand side exists and reads no variables, and
/// no later event rebinds the name (a rebound name would make the recorded
/// literal stale at later use sites).
fn is_inlinable_constant(
    name: &str,
    dep: Option<&crate::analysis::RefInfo>,
    later: &[Event],
) -> bool {
    let Some(info) = dep else {
        return false;
    };
    if !info.is_literal_only() {
        return false;
    }
    !later.iter().any(|event| event.rebinds(name))
}

/// Re-index both sets to the numbering with non-binding events removed.
///
/// Positions after each removed barrier shift down by the count of barriers
/// preceding them; the renderer's cursor counts only bindings, so this is
/// the numbering it sees.
pub fn prune_conditionals(events: &[Event], sets: &UsageSets) -> UsageSets {
    let reindex = |index: &usize| -> Option<usize> {
        if !events[*index].is_binding() {
            return None;
        }
        let removed = events[..*index]
            .iter()
            .filter(|event| !event.is_binding())
            .count();
        Some(index - removed)
    };
    UsageSets {
        dead: sets.dead.iter().filter_map(reindex).collect(),
        consts: sets.consts.iter().filter_map(reindex).collect(),
    }
}
