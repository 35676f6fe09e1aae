//! The wiring pass: turns a [`Region`] description into the runtime
//! activation tree plus the flat tables the machine navigates with:
//! parent links for upward walks, the fork arena, the dense registry,
//! and the structure-report rows.

use crate::builder::BuildError;
use crate::core::{Fork, Parent, StateRegistry};
use crate::machine::StructureEntry;
use crate::tree::node::{Node, StateSlot};
use crate::tree::region::{Region, RegionKind};

pub(crate) struct Wired<C, E> {
    pub apex: Node<C, E>,
    pub registry: StateRegistry,
    pub state_parents: Vec<Option<Parent>>,
    pub fork_parents: Vec<Option<Parent>>,
    pub forks: Vec<Fork>,
    pub entries: Vec<StructureEntry>,
}

struct WirePass {
    registry: StateRegistry,
    state_parents: Vec<Option<Parent>>,
    fork_parents: Vec<Option<Parent>>,
    forks: Vec<Fork>,
    entries: Vec<StructureEntry>,
}

pub(crate) fn wire<C, E>(apex: Region<C, E>) -> Result<Wired<C, E>, BuildError> {
    let mut pass = WirePass {
        registry: StateRegistry::new(),
        state_parents: Vec::new(),
        fork_parents: Vec::new(),
        forks: Vec::new(),
        entries: Vec::new(),
    };
    let apex = wire_region(apex, None, 0, &mut pass)?;
    Ok(Wired {
        apex,
        registry: pass.registry,
        state_parents: pass.state_parents,
        fork_parents: pass.fork_parents,
        forks: pass.forks,
        entries: pass.entries,
    })
}

// Preorder: a node's dense index precedes its children's, so a subtree is
// the contiguous index range [index, index + span).
fn wire_region<C, E>(
    region: Region<C, E>,
    parent: Option<Parent>,
    depth: usize,
    pass: &mut WirePass,
) -> Result<Node<C, E>, BuildError> {
    let Region {
        kind,
        id,
        name,
        state,
        injections,
        children,
    } = region;

    let index = pass
        .registry
        .add(id, name)
        .ok_or(BuildError::DuplicateState { name })?;
    pass.state_parents.push(parent);
    pass.entries.push(StructureEntry {
        is_active: false,
        prefix: "  ".repeat(depth),
        name,
    });

    let mut slot = StateSlot {
        index,
        span: 1,
        id,
        name,
        state,
        injections,
    };

    let node = match kind {
        RegionKind::Leaf => {
            if !children.is_empty() {
                return Err(BuildError::LeafWithChildren { name });
            }
            Node::Leaf { slot }
        }
        RegionKind::Composite => {
            if children.is_empty() {
                return Err(BuildError::EmptyRegion { name });
            }
            let fork = pass.forks.len();
            pass.forks.push(Fork::new());
            pass.fork_parents.push(parent);

            let mut wired_children = Vec::with_capacity(children.len());
            for (prong, child) in children.into_iter().enumerate() {
                wired_children.push(wire_region(
                    child,
                    Some(Parent { fork, prong }),
                    depth + 1,
                    pass,
                )?);
            }
            slot.span = pass.state_parents.len() - index;
            Node::Composite {
                slot,
                fork,
                children: wired_children,
            }
        }
        RegionKind::Orthogonal => {
            if children.is_empty() {
                return Err(BuildError::EmptyRegion { name });
            }
            // No fork: children share the orthogonal's own parent link.
            let mut wired_children = Vec::with_capacity(children.len());
            for child in children {
                wired_children.push(wire_region(child, parent, depth + 1, pass)?);
            }
            slot.span = pass.state_parents.len() - index;
            Node::Orthogonal {
                slot,
                children: wired_children,
            }
        }
    };

    Ok(node)
}
