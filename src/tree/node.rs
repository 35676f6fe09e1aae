//! The runtime activation tree and its lifecycle traversals.
//!
//! A wired hierarchy is a tree of [`Node`]s: leaves, composites (one
//! active child, selection recorded in an arena fork), and orthogonals
//! (all children active). Every traversal the machine performs (entry,
//! update, reaction, substitution, request forwarding, application,
//! teardown) is a recursion over this tree with a fixed, documented
//! dispatch order.

use tracing::trace;

use crate::core::{Control, Fork, Injection, State, StateId, TransitionKind};
use crate::machine::{Logger, Method};

pub(crate) type LoggerSlot = Option<Box<dyn Logger>>;

/// One tree slot: a state instance plus its identity, display name,
/// subtree extent, and attached injections.
pub(crate) struct StateSlot<C, E> {
    pub index: usize,
    pub span: usize,
    pub id: StateId,
    pub name: &'static str,
    pub state: Box<dyn State<C, E>>,
    pub injections: Vec<Box<dyn Injection<C, E>>>,
}

impl<C, E> StateSlot<C, E> {
    fn log(&self, logger: &mut LoggerSlot, method: Method) {
        if let Some(logger) = logger {
            logger.record(self.id, self.name, method, method.name());
        }
    }

    fn substitute(&mut self, control: &mut Control<'_>, context: &mut C, logger: &mut LoggerSlot) {
        for injection in &mut self.injections {
            injection.pre_substitute(context);
        }
        self.log(logger, Method::Substitute);
        self.state.substitute(control, context);
    }

    fn enter(&mut self, context: &mut C, logger: &mut LoggerSlot) {
        for injection in &mut self.injections {
            injection.pre_enter(context);
        }
        self.log(logger, Method::Enter);
        self.state.enter(context);
    }

    fn update(&mut self, context: &mut C, logger: &mut LoggerSlot) {
        for injection in &mut self.injections {
            injection.pre_update(context);
        }
        self.log(logger, Method::Update);
        self.state.update(context);
    }

    fn transition(&mut self, control: &mut Control<'_>, context: &mut C, logger: &mut LoggerSlot) {
        for injection in &mut self.injections {
            injection.pre_transition(context);
        }
        self.log(logger, Method::Transition);
        self.state.transition(control, context);
    }

    fn react(
        &mut self,
        event: &E,
        control: &mut Control<'_>,
        context: &mut C,
        logger: &mut LoggerSlot,
    ) {
        for injection in &mut self.injections {
            injection.pre_react(event, context);
        }
        self.log(logger, Method::React);
        self.state.react(event, control, context);
    }

    // post_leave wrappers unwind in reverse declaration order: outermost last.
    fn leave(&mut self, context: &mut C, logger: &mut LoggerSlot) {
        self.log(logger, Method::Leave);
        self.state.leave(context);
        for injection in self.injections.iter_mut().rev() {
            injection.post_leave(context);
        }
    }
}

/// A node of the activation tree.
pub(crate) enum Node<C, E> {
    Leaf {
        slot: StateSlot<C, E>,
    },
    Composite {
        slot: StateSlot<C, E>,
        fork: usize,
        children: Vec<Node<C, E>>,
    },
    Orthogonal {
        slot: StateSlot<C, E>,
        children: Vec<Node<C, E>>,
    },
}

impl<C, E> Node<C, E> {
    pub fn slot(&self) -> &StateSlot<C, E> {
        match self {
            Node::Leaf { slot } | Node::Composite { slot, .. } | Node::Orthogonal { slot, .. } => {
                slot
            }
        }
    }

    /// First activation of the whole subtree: composites select their
    /// initial prong, heads enter before children.
    pub fn deep_enter_initial(&mut self, forks: &mut [Fork], context: &mut C, logger: &mut LoggerSlot) {
        match self {
            Node::Leaf { slot } => slot.enter(context, logger),
            Node::Composite {
                slot,
                fork,
                children,
            } => {
                forks[*fork].active = Some(0);
                slot.enter(context, logger);
                children[0].deep_enter_initial(forks, context, logger);
            }
            Node::Orthogonal { slot, children } => {
                slot.enter(context, logger);
                for child in children {
                    child.deep_enter_initial(forks, context, logger);
                }
            }
        }
    }

    /// Activation of a freshly selected subtree. Composites consume the
    /// prong marked by resolution; an unmarked fork falls back to its
    /// initial prong.
    pub fn deep_enter(&mut self, forks: &mut [Fork], context: &mut C, logger: &mut LoggerSlot) {
        match self {
            Node::Leaf { slot } => slot.enter(context, logger),
            Node::Composite {
                slot,
                fork,
                children,
            } => {
                let selected = forks[*fork].requested.take().unwrap_or(0);
                forks[*fork].active = Some(selected);
                slot.enter(context, logger);
                children[selected].deep_enter(forks, context, logger);
            }
            Node::Orthogonal { slot, children } => {
                slot.enter(context, logger);
                for child in children {
                    child.deep_enter(forks, context, logger);
                }
            }
        }
    }

    /// Deactivation: children leave before heads, orthogonal children in
    /// reverse declaration order. Exiting a composite stamps its resume
    /// memory and clears its selection.
    pub fn deep_leave(&mut self, forks: &mut [Fork], context: &mut C, logger: &mut LoggerSlot) {
        match self {
            Node::Leaf { slot } => slot.leave(context, logger),
            Node::Composite {
                slot,
                fork,
                children,
            } => {
                if let Some(active) = forks[*fork].active {
                    children[active].deep_leave(forks, context, logger);
                }
                slot.leave(context, logger);
                let record = &mut forks[*fork];
                if record.active.is_some() {
                    record.resumable = record.active;
                }
                record.active = None;
                record.requested = None;
            }
            Node::Orthogonal { slot, children } => {
                for child in children.iter_mut().rev() {
                    child.deep_leave(forks, context, logger);
                }
                slot.leave(context, logger);
            }
        }
    }

    pub fn deep_update(&mut self, forks: &mut [Fork], context: &mut C, logger: &mut LoggerSlot) {
        match self {
            Node::Leaf { slot } => slot.update(context, logger),
            Node::Composite {
                slot,
                fork,
                children,
            } => {
                slot.update(context, logger);
                if let Some(active) = forks[*fork].active {
                    children[active].deep_update(forks, context, logger);
                }
            }
            Node::Orthogonal { slot, children } => {
                slot.update(context, logger);
                for child in children {
                    child.deep_update(forks, context, logger);
                }
            }
        }
    }

    pub fn deep_transition(
        &mut self,
        forks: &mut [Fork],
        control: &mut Control<'_>,
        context: &mut C,
        logger: &mut LoggerSlot,
    ) {
        match self {
            Node::Leaf { slot } => slot.transition(control, context, logger),
            Node::Composite {
                slot,
                fork,
                children,
            } => {
                slot.transition(control, context, logger);
                if let Some(active) = forks[*fork].active {
                    children[active].deep_transition(forks, control, context, logger);
                }
            }
            Node::Orthogonal { slot, children } => {
                slot.transition(control, context, logger);
                for child in children {
                    child.deep_transition(forks, control, context, logger);
                }
            }
        }
    }

    pub fn deep_react(
        &mut self,
        event: &E,
        forks: &mut [Fork],
        control: &mut Control<'_>,
        context: &mut C,
        logger: &mut LoggerSlot,
    ) {
        match self {
            Node::Leaf { slot } => slot.react(event, control, context, logger),
            Node::Composite {
                slot,
                fork,
                children,
            } => {
                slot.react(event, control, context, logger);
                if let Some(active) = forks[*fork].active {
                    children[active].deep_react(event, forks, control, context, logger);
                }
            }
            Node::Orthogonal { slot, children } => {
                slot.react(event, control, context, logger);
                for child in children {
                    child.deep_react(event, forks, control, context, logger);
                }
            }
        }
    }

    /// Apply a restart/resume directive to this subtree: select the prong
    /// the directive dictates at every composite, fanning out across
    /// orthogonals.
    pub fn deep_request(&mut self, forks: &mut [Fork], kind: TransitionKind) {
        match self {
            Node::Leaf { .. } => {}
            Node::Composite { fork, children, .. } => {
                let selected = match kind {
                    TransitionKind::Restart => 0,
                    TransitionKind::Resume => forks[*fork].resumable.unwrap_or(0),
                    TransitionKind::Remain | TransitionKind::Schedule => return,
                };
                forks[*fork].requested = Some(selected);
                children[selected].deep_request(forks, kind);
            }
            Node::Orthogonal { children, .. } => {
                for child in children {
                    child.deep_request(forks, kind);
                }
            }
        }
    }

    /// Descend to the state with dense index `target` and apply the
    /// directive to its subtree. Subtrees not containing the target under
    /// a composite are skipped via their preorder index span; parallel
    /// branches crossed on the way down receive the same directive.
    pub fn deep_forward_request(&mut self, forks: &mut [Fork], target: usize, kind: TransitionKind) {
        let (index, span) = {
            let slot = self.slot();
            (slot.index, slot.span)
        };
        if target < index || target >= index + span {
            return;
        }
        if target == index {
            self.deep_request(forks, kind);
            return;
        }
        match self {
            Node::Leaf { .. } => {}
            Node::Composite { children, .. } => {
                for child in children {
                    child.deep_forward_request(forks, target, kind);
                }
            }
            Node::Orthogonal { children, .. } => {
                for child in children {
                    let (child_index, child_span) = {
                        let slot = child.slot();
                        (slot.index, slot.span)
                    };
                    if (child_index..child_index + child_span).contains(&target) {
                        child.deep_forward_request(forks, target, kind);
                    } else {
                        child.deep_request_inactive(forks, kind);
                    }
                }
            }
        }
    }

    /// Fan a directive into a parallel branch off the transition path.
    /// Regions already active keep their state; regions about to be
    /// freshly entered select the prong the directive dictates.
    fn deep_request_inactive(&mut self, forks: &mut [Fork], kind: TransitionKind) {
        match self {
            Node::Leaf { .. } => {}
            Node::Composite { fork, children, .. } => {
                if forks[*fork].active.is_some() {
                    return;
                }
                let selected = match kind {
                    TransitionKind::Restart => 0,
                    TransitionKind::Resume => forks[*fork].resumable.unwrap_or(0),
                    TransitionKind::Remain | TransitionKind::Schedule => return,
                };
                forks[*fork].requested = Some(selected);
                children[selected].deep_request_inactive(forks, kind);
            }
            Node::Orthogonal { children, .. } => {
                for child in children {
                    child.deep_request_inactive(forks, kind);
                }
            }
        }
    }

    /// Locate every pending prong change in the active tree and run
    /// `substitute` over its incoming subtree.
    pub fn deep_forward_substitute(
        &mut self,
        forks: &mut [Fork],
        control: &mut Control<'_>,
        context: &mut C,
        logger: &mut LoggerSlot,
    ) {
        match self {
            Node::Leaf { .. } => {}
            Node::Composite { fork, children, .. } => {
                match (forks[*fork].requested, forks[*fork].active) {
                    (Some(requested), Some(active)) if requested != active => {
                        children[requested].deep_substitute(forks, control, context, logger);
                    }
                    (_, Some(active)) => {
                        children[active].deep_forward_substitute(forks, control, context, logger);
                    }
                    (_, None) => {}
                }
            }
            Node::Orthogonal { children, .. } => {
                for child in children {
                    child.deep_forward_substitute(forks, control, context, logger);
                }
            }
        }
    }

    /// Run `substitute` over an incoming subtree, head first, following
    /// the prongs that will be entered.
    fn deep_substitute(
        &mut self,
        forks: &mut [Fork],
        control: &mut Control<'_>,
        context: &mut C,
        logger: &mut LoggerSlot,
    ) {
        match self {
            Node::Leaf { slot } => slot.substitute(control, context, logger),
            Node::Composite {
                slot,
                fork,
                children,
            } => {
                slot.substitute(control, context, logger);
                let selected = forks[*fork].requested.unwrap_or(0);
                children[selected].deep_substitute(forks, control, context, logger);
            }
            Node::Orthogonal { slot, children } => {
                slot.substitute(control, context, logger);
                for child in children {
                    child.deep_substitute(forks, control, context, logger);
                }
            }
        }
    }

    /// Apply every pending prong change: leave the outgoing subtree,
    /// update the fork's memory, enter the incoming subtree.
    pub fn deep_change_to_requested(
        &mut self,
        forks: &mut [Fork],
        context: &mut C,
        logger: &mut LoggerSlot,
    ) {
        match self {
            Node::Leaf { .. } => {}
            Node::Composite { fork, children, .. } => {
                let fork_index = *fork;
                match (forks[fork_index].requested, forks[fork_index].active) {
                    (Some(requested), Some(active)) if requested != active => {
                        trace!(fork = fork_index, from = active, to = requested, "changing prong");
                        children[active].deep_leave(forks, context, logger);
                        let record = &mut forks[fork_index];
                        record.resumable = Some(active);
                        record.active = Some(requested);
                        record.requested = None;
                        children[requested].deep_enter(forks, context, logger);
                    }
                    (Some(_), Some(active)) => {
                        forks[fork_index].requested = None;
                        children[active].deep_change_to_requested(forks, context, logger);
                    }
                    (None, Some(active)) => {
                        children[active].deep_change_to_requested(forks, context, logger);
                    }
                    (_, None) => {}
                }
            }
            Node::Orthogonal { children, .. } => {
                for child in children {
                    child.deep_change_to_requested(forks, context, logger);
                }
            }
        }
    }
}
