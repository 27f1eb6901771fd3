//! Work-node storage.
//!
//! Every generation's nodes live in one [`WorkArena`] and refer to each other
//! through [`WorkNodeId`] handles, so discarding a generation never leaves a
//! dangling reference behind: the ids are released and any link to them is
//! cleared first.

use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::element::{Element, ElementType};
use crate::hooks::HookCell;
use crate::host::HostId;
use crate::props::Props;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkNodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectTag {
    Insert,
    Update,
    Delete,
}

/// One tree position for one generation.
#[derive(Debug)]
pub struct WorkNode {
    /// `None` only for a generation root, whose host node is the container.
    pub(crate) ty: Option<ElementType>,
    pub(crate) props: Rc<Props>,
    pub(crate) host: Option<HostId>,
    pub(crate) parent: Option<WorkNodeId>,
    pub(crate) child: Option<WorkNodeId>,
    pub(crate) sibling: Option<WorkNodeId>,
    pub(crate) alternate: Option<WorkNodeId>,
    pub(crate) effect: Option<EffectTag>,
    pub(crate) hooks: Vec<HookCell>,
}

impl WorkNode {
    pub(crate) fn root(container: HostId, props: Rc<Props>, alternate: Option<WorkNodeId>) -> Self {
        Self {
            ty: None,
            props,
            host: Some(container),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            effect: None,
            hooks: Vec::new(),
        }
    }

    pub(crate) fn insert(element: &Element, parent: WorkNodeId) -> Self {
        Self {
            ty: Some(element.element_type().clone()),
            props: Rc::clone(element.props()),
            host: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            effect: Some(EffectTag::Insert),
            hooks: Vec::new(),
        }
    }

    pub(crate) fn update(
        element: &Element,
        parent: WorkNodeId,
        alternate: WorkNodeId,
        host: Option<HostId>,
    ) -> Self {
        Self {
            effect: Some(EffectTag::Update),
            alternate: Some(alternate),
            host,
            ..Self::insert(element, parent)
        }
    }

    pub fn element_type(&self) -> Option<&ElementType> {
        self.ty.as_ref()
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn host(&self) -> Option<HostId> {
        self.host
    }

    pub fn parent(&self) -> Option<WorkNodeId> {
        self.parent
    }

    pub fn child(&self) -> Option<WorkNodeId> {
        self.child
    }

    pub fn sibling(&self) -> Option<WorkNodeId> {
        self.sibling
    }

    pub fn alternate(&self) -> Option<WorkNodeId> {
        self.alternate
    }

    pub fn effect(&self) -> Option<EffectTag> {
        self.effect
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_root(&self) -> bool {
        self.ty.is_none()
    }
}

#[derive(Debug, Default)]
pub struct WorkArena {
    nodes: Vec<Option<WorkNode>>,
    free: Vec<usize>,
}

impl WorkArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, node: WorkNode) -> WorkNodeId {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                WorkNodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                WorkNodeId(self.nodes.len() - 1)
            }
        }
    }

    pub fn get(&self, id: WorkNodeId) -> Option<&WorkNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live nodes across all generations.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of `parent`'s children in sibling order.
    pub fn children(&self, parent: WorkNodeId) -> Vec<WorkNodeId> {
        let mut out = Vec::new();
        let mut next = self[parent].child;
        while let Some(id) = next {
            out.push(id);
            next = self[id].sibling;
        }
        out
    }

    /// Walks upward from `id` to the closest node owning a host node.
    pub(crate) fn host_parent(&self, id: WorkNodeId) -> Option<HostId> {
        let mut parent = self[id].parent;
        while let Some(current) = parent {
            if let Some(host) = self[current].host {
                return Some(host);
            }
            parent = self[current].parent;
        }
        None
    }

    /// Pre-order successor of `id` within the subtree rooted at `root`:
    /// first child, else the nearest sibling found walking up to `root`.
    pub(crate) fn next_in_subtree(&self, id: WorkNodeId, root: WorkNodeId) -> Option<WorkNodeId> {
        if let Some(child) = self[id].child {
            return Some(child);
        }
        let mut current = id;
        while current != root {
            if let Some(sibling) = self[current].sibling {
                return Some(sibling);
            }
            current = self[current].parent?;
        }
        None
    }

    /// Frees `root` and everything reachable from it through child/sibling
    /// links below it. `alternate` links are never followed.
    pub(crate) fn release_tree(&mut self, root: WorkNodeId) -> usize {
        let mut released = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
                continue;
            };
            if let Some(child) = node.child {
                stack.push(child);
            }
            if id != root {
                if let Some(sibling) = node.sibling {
                    stack.push(sibling);
                }
            }
            self.free.push(id.0);
            released += 1;
        }
        released
    }

    /// Drops cross-generation links once the previous generation is gone.
    pub(crate) fn clear_alternates(&mut self, root: WorkNodeId) {
        let mut next = Some(root);
        while let Some(id) = next {
            self[id].alternate = None;
            next = self.next_in_subtree(id, root);
        }
    }
}

impl Index<WorkNodeId> for WorkArena {
    type Output = WorkNode;

    fn index(&self, id: WorkNodeId) -> &WorkNode {
        self.get(id)
            .unwrap_or_else(|| panic!("work node {} was released", id.0))
    }
}

impl IndexMut<WorkNodeId> for WorkArena {
    fn index_mut(&mut self, id: WorkNodeId) -> &mut WorkNode {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("work node {} was released", id.0))
    }
}
