//! Build errors for hierarchy wiring and machine construction.

use thiserror::Error;

/// Errors that can occur while building a machine from a hierarchy
/// description.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Apex region not specified. Call .apex(region) before .build()")]
    MissingApex,

    #[error("State type '{name}' appears more than once in the hierarchy")]
    DuplicateState { name: &'static str },

    #[error("Region '{name}' has no children. Composites and orthogonals need at least one")]
    EmptyRegion { name: &'static str },

    #[error("Leaf state '{name}' cannot have children. Use a composite or orthogonal region")]
    LeafWithChildren { name: &'static str },
}
