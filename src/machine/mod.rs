//! The machine root: public API, tick dispatch, and transition
//! resolution.

mod logger;
mod report;

pub use logger::{Logger, Method};
pub use report::{RequestSource, StructureEntry, TransitionRecord};

use tracing::{debug, trace};

use crate::builder::{BuildError, MachineBuilder};
use crate::core::{
    Control, Fork, Parent, StateId, StateRegistry, TransitionKind, TransitionQueue,
    TransitionRequest,
};
use crate::tree::{LoggerSlot, Node, Region, Wired};

/// Default bound on substitution fixpoint rounds per resolution phase.
pub const DEFAULT_MAX_SUBSTITUTIONS: usize = 4;

/// A running hierarchical state machine.
///
/// The machine owns the host context and the whole activation tree.
/// Constructing it enters the initial states; dropping it leaves every
/// active state, so `enter`/`leave` calls balance over the machine's
/// lifetime.
///
/// All operations are synchronous and must be driven from one thread.
/// Transitions requested between ticks (or by hooks during a tick) are
/// resolved at the end of the next `update` or `react` call.
///
/// # Example
///
/// ```rust
/// use canopy::{Bare, Control, Machine, Region, State};
///
/// #[derive(Default)]
/// struct Ctx {
///     alarm: bool,
/// }
///
/// struct Watching;
/// struct Chasing;
///
/// impl State<Ctx> for Watching {
///     fn transition(&mut self, control: &mut Control<'_>, context: &mut Ctx) {
///         if context.alarm {
///             control.change_to::<Chasing>();
///         }
///     }
/// }
///
/// impl State<Ctx> for Chasing {}
///
/// let apex = Region::composite(Bare)
///     .child(Region::leaf(Watching))
///     .child(Region::leaf(Chasing));
///
/// let mut machine = Machine::new(apex, Ctx::default()).unwrap();
/// assert!(machine.is_active::<Watching>());
///
/// machine.context_mut().alarm = true;
/// machine.update();
/// assert!(machine.is_active::<Chasing>());
/// assert!(machine.is_resumable::<Watching>());
/// ```
pub struct Machine<C, E = ()> {
    context: C,
    apex: Node<C, E>,
    registry: StateRegistry,
    state_parents: Vec<Option<Parent>>,
    fork_parents: Vec<Option<Parent>>,
    forks: Vec<Fork>,
    requests: TransitionQueue,
    max_substitutions: usize,
    logger: LoggerSlot,
    structure: Vec<StructureEntry>,
    activity: Vec<i8>,
    last_transitions: Vec<TransitionRecord>,
}

impl<C, E> Machine<C, E> {
    /// Build a machine from a hierarchy description with default limits,
    /// entering its initial states.
    pub fn new(apex: Region<C, E>, context: C) -> Result<Self, BuildError> {
        MachineBuilder::new().apex(apex).build(context)
    }

    pub(crate) fn from_wired(
        wired: Wired<C, E>,
        context: C,
        max_substitutions: usize,
        logger: LoggerSlot,
    ) -> Self {
        let Wired {
            apex,
            registry,
            state_parents,
            fork_parents,
            forks,
            entries,
        } = wired;

        let state_count = registry.len();
        let fork_count = forks.len();

        let mut machine = Self {
            context,
            apex,
            registry,
            state_parents,
            fork_parents,
            forks,
            requests: TransitionQueue::with_capacity(fork_count.max(1)),
            max_substitutions,
            logger,
            structure: entries,
            activity: vec![0; state_count],
            last_transitions: Vec::new(),
        };

        {
            let Self {
                apex,
                forks,
                context,
                logger,
                ..
            } = &mut machine;
            apex.deep_enter_initial(forks, context, logger);
        }
        machine.refresh_structure();
        machine
    }

    /// Run one tick: `update` over the active tree, then `transition`,
    /// then resolve any requested changes.
    pub fn update(&mut self) {
        {
            let Self {
                apex,
                forks,
                context,
                logger,
                requests,
                ..
            } = self;
            apex.deep_update(forks, context, logger);
            let mut control = Control::new(requests);
            apex.deep_transition(forks, &mut control, context, logger);
        }
        if !self.requests.is_empty() {
            self.process_transitions();
        }
        self.tick_activity();
        self.refresh_structure();
    }

    /// Deliver one event to every active state, then resolve any
    /// requested changes.
    pub fn react(&mut self, event: &E) {
        trace!("delivering event to active tree");
        {
            let Self {
                apex,
                forks,
                context,
                logger,
                requests,
                ..
            } = self;
            let mut control = Control::new(requests);
            apex.deep_react(event, forks, &mut control, context, logger);
        }
        if !self.requests.is_empty() {
            self.process_transitions();
        }
        self.refresh_structure();
    }

    /// Enqueue a transition to `T`, entering initial prongs below it.
    /// Takes effect during the next `update` or `react`.
    pub fn change_to<T: 'static>(&mut self) {
        self.requests.push(TransitionRequest {
            kind: TransitionKind::Restart,
            target: StateId::of::<T>(),
        });
    }

    /// Enqueue a transition to `T`, entering remembered prongs below it.
    pub fn resume<T: 'static>(&mut self) {
        self.requests.push(TransitionRequest {
            kind: TransitionKind::Resume,
            target: StateId::of::<T>(),
        });
    }

    /// Stamp `T` as its fork's resumable prong so a later resume of an
    /// ancestor lands on it. Does not transition now.
    pub fn schedule<T: 'static>(&mut self) {
        self.requests.push(TransitionRequest {
            kind: TransitionKind::Schedule,
            target: StateId::of::<T>(),
        });
    }

    /// Whether `T` is currently active: every composite on its parent
    /// chain has `T`'s path-prong selected.
    pub fn is_active<T: 'static>(&self) -> bool {
        self.is_active_index(self.registry.index_of(StateId::of::<T>()))
    }

    /// Whether `T` is the prong its immediately containing fork would
    /// resume to. Local to that fork: ancestors are not consulted.
    pub fn is_resumable<T: 'static>(&self) -> bool {
        let index = self.registry.index_of(StateId::of::<T>());
        match self.state_parents[index] {
            Some(link) => self.forks[link.fork].resumable == Some(link.prong),
            None => false,
        }
    }

    /// The host context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The host context, mutably.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Install a logger invoked once per hook dispatch.
    pub fn attach_logger(&mut self, logger: Box<dyn Logger>) {
        self.logger = Some(logger);
    }

    /// Flat preorder report of the hierarchy with current activity flags.
    /// Refreshed after construction and after every `update`/`react`.
    pub fn structure(&self) -> &[StructureEntry] {
        &self.structure
    }

    /// Per-state activity counters, parallel to [`Self::structure`]:
    /// +1 per tick active, -1 per tick inactive, saturating.
    pub fn activity(&self) -> &[i8] {
        &self.activity
    }

    /// The transition requests processed by the most recent resolution.
    pub fn last_transitions(&self) -> &[TransitionRecord] {
        &self.last_transitions
    }

    // Resolution: repeatedly mark requested prongs from the drained batch,
    // let substitute hooks redirect, and finally apply the surviving
    // marks. Divergence past the substitution bound is fatal.
    fn process_transitions(&mut self) {
        self.last_transitions.clear();
        let mut batch = self.requests.drain();
        let mut rounds = 0;
        let mut source = RequestSource::Dispatch;

        loop {
            trace!(requests = batch.len(), round = rounds, "resolving transition batch");
            let mut changed = false;
            for request in batch.drain(..) {
                let target = self.registry.index_of(request.target);
                self.last_transitions.push(TransitionRecord {
                    kind: request.kind,
                    state: self.registry.name(target),
                    source,
                });
                match request.kind {
                    TransitionKind::Restart | TransitionKind::Resume => {
                        self.request_immediate(target, request.kind);
                        changed = true;
                    }
                    TransitionKind::Schedule => self.request_scheduled(target),
                    TransitionKind::Remain => {}
                }
            }

            if changed {
                let Self {
                    apex,
                    forks,
                    context,
                    logger,
                    requests,
                    ..
                } = self;
                let mut control = Control::new(requests);
                apex.deep_forward_substitute(forks, &mut control, context, logger);
            }

            if self.requests.is_empty() {
                break;
            }
            rounds += 1;
            if rounds >= self.max_substitutions {
                panic!(
                    "substitution limit of {} exceeded: substitute hooks keep \
                     redirecting without converging",
                    self.max_substitutions
                );
            }
            source = RequestSource::Substitution;
            batch = self.requests.drain();
        }

        {
            let Self {
                apex,
                forks,
                context,
                logger,
                ..
            } = self;
            apex.deep_change_to_requested(forks, context, logger);
        }
        // Requests superseded within the batch can leave marks in branches
        // that were never entered; sweep them so a later entry starts clean.
        for fork in &mut self.forks {
            fork.requested = None;
        }
        debug!(
            applied = self.last_transitions.len(),
            "transition resolution complete"
        );
    }

    // Mark the requested prong on every fork from the target's parent up
    // to the root, then push the directive down through the target's
    // subtree.
    fn request_immediate(&mut self, target: usize, kind: TransitionKind) {
        let mut parent = self.state_parents[target];
        while let Some(link) = parent {
            self.forks[link.fork].requested = Some(link.prong);
            parent = self.fork_parents[link.fork];
        }
        self.apex.deep_forward_request(&mut self.forks, target, kind);
    }

    // Schedule writes the target fork's resumable unconditionally, even
    // when another directive for the same fork is in flight.
    fn request_scheduled(&mut self, target: usize) {
        if let Some(link) = self.state_parents[target] {
            self.forks[link.fork].resumable = Some(link.prong);
        }
    }

    fn is_active_index(&self, index: usize) -> bool {
        let mut parent = self.state_parents[index];
        while let Some(link) = parent {
            if self.forks[link.fork].active != Some(link.prong) {
                return false;
            }
            parent = self.fork_parents[link.fork];
        }
        true
    }

    fn refresh_structure(&mut self) {
        for index in 0..self.structure.len() {
            let active = self.is_active_index(index);
            self.structure[index].is_active = active;
        }
    }

    fn tick_activity(&mut self) {
        for index in 0..self.activity.len() {
            let counter = self.activity[index];
            self.activity[index] = if self.is_active_index(index) {
                counter.saturating_add(1)
            } else {
                counter.saturating_sub(1)
            };
        }
    }
}

impl<C, E> Drop for Machine<C, E> {
    fn drop(&mut self) {
        // Leave hooks are host code; never run them during unwinding.
        if std::thread::panicking() {
            return;
        }
        let Self {
            apex,
            forks,
            context,
            logger,
            ..
        } = self;
        apex.deep_leave(forks, context, logger);
    }
}
