//! Core data model: behavior hooks, state identity, fork records, and the
//! transition queue.
//!
//! Everything here is inert bookkeeping; the traversal logic that drives
//! these types lives in [`crate::tree`] and [`crate::machine`].

mod fork;
mod registry;
mod state;
mod transition;

pub use registry::StateId;
pub use state::{Bare, Injection, State};
pub use transition::{Control, TransitionKind};

pub(crate) use fork::{Fork, Parent};
pub(crate) use registry::{short_type_name, StateRegistry};
pub(crate) use transition::{TransitionQueue, TransitionRequest};
