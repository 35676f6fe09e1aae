//! Canopy: a hierarchical state machine engine for games and interactive
//! applications.
//!
//! A machine is a tree of regions with a single apex. Each node is a leaf
//! state, a *composite* (exactly one active child at a time), or an
//! *orthogonal* (all children active in parallel). The host describes the
//! tree declaratively with [`Region`] values, then drives the machine
//! once per frame with [`Machine::update`] and delivers events with
//! [`Machine::react`].
//!
//! # Core Concepts
//!
//! - **Hooks**: states implement the [`State`] trait; every hook defaults
//!   to a no-op.
//! - **Transitions**: `change_to` restarts the target's region from its
//!   initial prongs, `resume` re-enters remembered prongs, and `schedule`
//!   stamps a prong for a later resume. Targets can veto or redirect an
//!   incoming transition from their `substitute` hook.
//! - **Resume memory**: every composite remembers the prong that was
//!   active before its last change.
//!
//! # Example
//!
//! ```rust
//! use canopy::{Bare, Control, Machine, Region, State};
//!
//! #[derive(Default)]
//! struct World {
//!     noise_heard: bool,
//! }
//!
//! struct Patrolling;
//! struct Investigating;
//!
//! impl State<World> for Patrolling {
//!     fn transition(&mut self, control: &mut Control<'_>, context: &mut World) {
//!         if context.noise_heard {
//!             control.change_to::<Investigating>();
//!         }
//!     }
//! }
//!
//! impl State<World> for Investigating {
//!     fn enter(&mut self, context: &mut World) {
//!         context.noise_heard = false;
//!     }
//! }
//!
//! let apex = Region::composite(Bare)
//!     .child(Region::leaf(Patrolling))
//!     .child(Region::leaf(Investigating));
//!
//! let mut machine = Machine::new(apex, World::default()).unwrap();
//! assert!(machine.is_active::<Patrolling>());
//!
//! machine.context_mut().noise_heard = true;
//! machine.update();
//! assert!(machine.is_active::<Investigating>());
//! ```

pub mod builder;
pub mod core;
pub mod machine;
pub mod tree;

// Re-export the everyday surface.
pub use builder::{BuildError, MachineBuilder};
pub use core::{Bare, Control, Injection, State, StateId, TransitionKind};
pub use machine::{
    Logger, Machine, Method, RequestSource, StructureEntry, TransitionRecord,
    DEFAULT_MAX_SUBSTITUTIONS,
};
pub use tree::Region;
