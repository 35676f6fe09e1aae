//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::machine::{Logger, Machine, DEFAULT_MAX_SUBSTITUTIONS};
use crate::tree::{wire, Region};

/// Builder for constructing a [`Machine`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use canopy::{Bare, MachineBuilder, Region, State};
///
/// struct Closed;
/// struct Open;
/// impl State<()> for Closed {}
/// impl State<()> for Open {}
///
/// let machine = MachineBuilder::new()
///     .apex(
///         Region::composite(Bare)
///             .child(Region::leaf(Closed))
///             .child(Region::leaf(Open)),
///     )
///     .max_substitutions(8)
///     .build(())
///     .unwrap();
///
/// assert!(machine.is_active::<Closed>());
/// ```
pub struct MachineBuilder<C, E = ()> {
    apex: Option<Region<C, E>>,
    max_substitutions: usize,
    logger: Option<Box<dyn Logger>>,
}

impl<C, E> MachineBuilder<C, E> {
    /// Create a new builder with default limits.
    pub fn new() -> Self {
        Self {
            apex: None,
            max_substitutions: DEFAULT_MAX_SUBSTITUTIONS,
            logger: None,
        }
    }

    /// Set the hierarchy description (required).
    pub fn apex(mut self, region: Region<C, E>) -> Self {
        self.apex = Some(region);
        self
    }

    /// Bound on substitution fixpoint rounds per resolution phase.
    pub fn max_substitutions(mut self, limit: usize) -> Self {
        self.max_substitutions = limit;
        self
    }

    /// Install a logger invoked once per hook dispatch.
    pub fn logger(mut self, logger: Box<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Wire the hierarchy and start the machine, entering its initial
    /// states.
    pub fn build(self, context: C) -> Result<Machine<C, E>, BuildError> {
        let apex = self.apex.ok_or(BuildError::MissingApex)?;
        let wired = wire(apex)?;
        Ok(Machine::from_wired(
            wired,
            context,
            self.max_substitutions,
            self.logger,
        ))
    }
}

impl<C, E> Default for MachineBuilder<C, E> {
    fn default() -> Self {
        Self::new()
    }
}
