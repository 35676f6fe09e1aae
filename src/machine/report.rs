//! Introspection surfaces: the flat structure report, per-state activity
//! counters, and the record of the most recent resolution.

use serde::Serialize;

use crate::core::TransitionKind;

/// One row of the structure report: a state's display name, an
/// indentation prefix reflecting its depth, and whether it is currently
/// active. Rows are in stable preorder, matching dense state indices.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructureEntry {
    pub is_active: bool,
    pub prefix: String,
    pub name: &'static str,
}

/// Where a processed transition request originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RequestSource {
    /// Enqueued by the host or by `update`/`transition`/`react` hooks.
    Dispatch,
    /// Enqueued by a `substitute` hook during the resolution fixpoint.
    Substitution,
}

/// A transition request processed by the most recent resolution phase.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub kind: TransitionKind,
    pub state: &'static str,
    pub source: RequestSource,
}
