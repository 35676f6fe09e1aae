//! Per-composite selection records and the parent links that let the
//! machine walk from any state up to the root.

/// Names the fork whose child a state (or fork) is, and the prong slot it
/// occupies there. The root's parent is `None` in the parent tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Parent {
    pub fork: usize,
    pub prong: usize,
}

/// Selection record owned by each composite region, stored in the
/// machine's fork arena at the composite's dense fork index.
///
/// `active` is the currently entered prong, `resumable` the prong that was
/// active before the last change (the region's resume memory), and
/// `requested` the prong a pending transition has selected. Orthogonal
/// regions keep no fork: they have no choice to remember.
#[derive(Clone, Debug, Default)]
pub(crate) struct Fork {
    pub active: Option<usize>,
    pub resumable: Option<usize>,
    pub requested: Option<usize>,
}

impl Fork {
    pub fn new() -> Self {
        Self::default()
    }
}
