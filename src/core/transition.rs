//! Transition requests, the bounded request queue, and the [`Control`]
//! handle hooks use to enqueue them.

use serde::{Deserialize, Serialize};

use crate::core::registry::StateId;

/// How a transition selects prongs below its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// No-op request. Never enqueued by hosts; exists so off-path branches
    /// of a forwarded transition can be told to keep their current state.
    Remain,
    /// Activate the target, entering the initial prong of every composite
    /// below it.
    Restart,
    /// Activate the target, entering the last-remembered (else initial)
    /// prong of every composite below it.
    Resume,
    /// Do not fire now: stamp the target as its fork's resumable prong so
    /// a later `Resume` lands on it.
    Schedule,
}

/// A single pending transition: a kind and a target state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TransitionRequest {
    pub kind: TransitionKind,
    pub target: StateId,
}

/// Bounded queue of pending transition requests.
///
/// Capacity is fixed at construction (one slot per fork in the
/// hierarchy). Overflow is a machine-integrity error and panics rather
/// than dropping requests.
#[derive(Debug)]
pub(crate) struct TransitionQueue {
    entries: Vec<TransitionRequest>,
    capacity: usize,
}

impl TransitionQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, request: TransitionRequest) {
        if self.entries.len() >= self.capacity {
            panic!(
                "transition queue overflow: more than {} requests pending in one resolution",
                self.capacity
            );
        }
        self.entries.push(request);
    }

    /// Take every pending request, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<TransitionRequest> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handle passed into `substitute`, `transition`, and `react` hooks,
/// letting them enqueue transitions against the machine.
///
/// Requests enqueued during a tick are resolved within the same tick,
/// after the dispatch traversal completes.
pub struct Control<'q> {
    requests: &'q mut TransitionQueue,
}

impl<'q> Control<'q> {
    pub(crate) fn new(requests: &'q mut TransitionQueue) -> Self {
        Self { requests }
    }

    /// Request a transition to `T`, entering initial prongs below it.
    pub fn change_to<T: 'static>(&mut self) {
        self.requests.push(TransitionRequest {
            kind: TransitionKind::Restart,
            target: StateId::of::<T>(),
        });
    }

    /// Request a transition to `T`, entering remembered prongs below it.
    pub fn resume<T: 'static>(&mut self) {
        self.requests.push(TransitionRequest {
            kind: TransitionKind::Resume,
            target: StateId::of::<T>(),
        });
    }

    /// Mark `T` as its fork's resumable prong without transitioning now.
    pub fn schedule<T: 'static>(&mut self) {
        self.requests.push(TransitionRequest {
            kind: TransitionKind::Schedule,
            target: StateId::of::<T>(),
        });
    }

    /// Number of requests currently pending.
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}
