use std::borrow::Cow;
use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::collections::ListenerTable;
use crate::host::{Host, HostError, HostId};
use crate::props::{Event, EventHandler, PropValue, NODE_VALUE};

/// Host operation recorded by [`MemoryDocument`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateElement { id: HostId, tag: String },
    CreateText { id: HostId, value: String },
    AppendChild { parent: HostId, child: HostId },
    InsertBefore { parent: HostId, child: HostId, anchor: HostId },
    RemoveChild { parent: HostId, child: HostId },
    SetProperty { node: HostId, name: String, value: PropValue },
    ClearProperty { node: HostId, name: String },
    AddListener { node: HostId, event: String },
    RemoveListener { node: HostId, event: String },
}

impl Mutation {
    /// Whether this changes the shape or content of already-built nodes, as
    /// opposed to allocating a fresh detached node.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::AppendChild { .. }
                | Mutation::InsertBefore { .. }
                | Mutation::RemoveChild { .. }
        )
    }
}

#[derive(Debug)]
enum DocNodeKind {
    Element {
        tag: String,
        properties: IndexMap<String, PropValue>,
        listeners: ListenerTable,
    },
    Text {
        value: String,
    },
}

#[derive(Debug)]
struct DocNode {
    kind: DocNodeKind,
    parent: Option<HostId>,
    children: Vec<HostId>,
}

/// In-memory document used as the reference host.
///
/// Records every mutation so callers can assert exactly what a commit did.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    nodes: Vec<DocNode>,
    mutations: Vec<Mutation>,
    unsupported: Vec<String>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_element(tag)` fail with [`HostError::UnsupportedTag`].
    pub fn reject_tag(&mut self, tag: impl Into<String>) {
        self.unsupported.push(tag.into());
    }

    /// Creates a detached element meant to hold a root; not recorded.
    pub fn create_container(&mut self, tag: &str) -> HostId {
        self.push(DocNodeKind::Element {
            tag: tag.to_owned(),
            properties: IndexMap::new(),
            listeners: ListenerTable::default(),
        })
    }

    fn push(&mut self, kind: DocNodeKind) -> HostId {
        self.nodes.push(DocNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn node(&self, id: HostId) -> Result<&DocNode, HostError> {
        self.nodes.get(id).ok_or(HostError::Missing { id })
    }

    fn node_mut(&mut self, id: HostId) -> Result<&mut DocNode, HostError> {
        self.nodes.get_mut(id).ok_or(HostError::Missing { id })
    }

    fn container_mut(&mut self, id: HostId) -> Result<&mut DocNode, HostError> {
        let node = self.node_mut(id)?;
        match node.kind {
            DocNodeKind::Element { .. } => Ok(node),
            DocNodeKind::Text { .. } => Err(HostError::NotAContainer { id }),
        }
    }

    fn detach(&mut self, child: HostId) -> Result<(), HostError> {
        if let Some(parent) = self.node(child)?.parent {
            self.node_mut(parent)?.children.retain(|&c| c != child);
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    pub fn children(&self, id: HostId) -> &[HostId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn parent(&self, id: HostId) -> Option<HostId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn tag(&self, id: HostId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            DocNodeKind::Element { tag, .. } => Some(tag),
            DocNodeKind::Text { .. } => None,
        }
    }

    pub fn text(&self, id: HostId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            DocNodeKind::Text { value } => Some(value),
            DocNodeKind::Element { .. } => None,
        }
    }

    pub fn property(&self, id: HostId, name: &str) -> Option<&PropValue> {
        match &self.nodes.get(id)?.kind {
            DocNodeKind::Element { properties, .. } => properties.get(name),
            DocNodeKind::Text { .. } => None,
        }
    }

    pub fn listener_count(&self, id: HostId, event: &str) -> usize {
        match self.nodes.get(id).map(|node| &node.kind) {
            Some(DocNodeKind::Element { listeners, .. }) => {
                listeners.get(event).map_or(0, Vec::len)
            }
            _ => 0,
        }
    }

    /// Pre-order search below `root` for elements with `tag`.
    pub fn find_by_tag(&self, root: HostId, tag: &str) -> Vec<HostId> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id != root && self.tag(id) == Some(tag) {
                found.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        found
    }

    /// Fires `event` at `target`, returning how many listeners ran.
    pub fn dispatch(&self, target: HostId, event: &str) -> usize {
        let handlers: Vec<EventHandler> = match self.nodes.get(target).map(|node| &node.kind) {
            Some(DocNodeKind::Element { listeners, .. }) => {
                listeners.get(event).cloned().unwrap_or_default()
            }
            _ => Vec::new(),
        };
        let payload = Event {
            name: event.to_owned(),
            target,
        };
        for handler in &handlers {
            handler.call(&payload);
        }
        handlers.len()
    }

    /// HTML of `id` itself.
    pub fn serialize(&self, id: HostId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id);
        out
    }

    /// HTML of the children of `id`.
    pub fn inner_html(&self, id: HostId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(&mut out, child);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: HostId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.kind {
            DocNodeKind::Text { value } => out.push_str(&escape(value, false)),
            DocNodeKind::Element {
                tag, properties, ..
            } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in properties {
                    match value {
                        PropValue::Bool(true) => {
                            let _ = write!(out, " {name}");
                        }
                        PropValue::Bool(false) | PropValue::Handler(_) => {}
                        other => {
                            let _ = write!(out, " {name}=\"{}\"", escape(&other.to_string(), true));
                        }
                    }
                }
                out.push('>');
                for &child in &node.children {
                    self.write_node(out, child);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    /// Indented outline of the subtree at `root`, for debugging.
    pub fn dump_tree(&self, root: HostId) -> String {
        let mut output = String::new();
        self.dump_node(&mut output, root, 0);
        output
    }

    fn dump_node(&self, output: &mut String, id: HostId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.nodes.get(id).map(|node| &node.kind) {
            Some(DocNodeKind::Element { tag, .. }) => {
                let _ = writeln!(output, "{indent}[{id}] <{tag}>");
                for &child in self.children(id) {
                    self.dump_node(output, child, depth + 1);
                }
            }
            Some(DocNodeKind::Text { value }) => {
                let _ = writeln!(output, "{indent}[{id}] {value:?}");
            }
            None => {
                let _ = writeln!(output, "{indent}[{id}] (missing)");
            }
        }
    }
}

const TEXT_SPECIAL: [char; 3] = ['&', '<', '>'];
const ATTR_SPECIAL: [char; 4] = ['&', '<', '>', '"'];

/// Escapes `raw` for text content, or for a double-quoted attribute value.
fn escape(raw: &str, attribute: bool) -> Cow<'_, str> {
    let special: &[char] = if attribute { &ATTR_SPECIAL } else { &TEXT_SPECIAL };
    if !raw.contains(special) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

impl Host for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> Result<HostId, HostError> {
        if self.unsupported.iter().any(|t| t == tag) {
            return Err(HostError::UnsupportedTag {
                tag: tag.to_owned(),
            });
        }
        let id = self.create_container(tag);
        self.mutations.push(Mutation::CreateElement {
            id,
            tag: tag.to_owned(),
        });
        Ok(id)
    }

    fn create_text(&mut self, value: &str) -> Result<HostId, HostError> {
        let id = self.push(DocNodeKind::Text {
            value: value.to_owned(),
        });
        self.mutations.push(Mutation::CreateText {
            id,
            value: value.to_owned(),
        });
        Ok(id)
    }

    fn append_child(&mut self, parent: HostId, child: HostId) -> Result<(), HostError> {
        self.container_mut(parent)?;
        self.detach(child)?;
        self.container_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.mutations.push(Mutation::AppendChild { parent, child });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: HostId,
        child: HostId,
        anchor: HostId,
    ) -> Result<(), HostError> {
        self.container_mut(parent)?;
        self.detach(child)?;
        let siblings = &mut self.container_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|&c| c == anchor)
            .ok_or(HostError::Missing { id: anchor })?;
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mutations.push(Mutation::InsertBefore {
            parent,
            child,
            anchor,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: HostId, child: HostId) -> Result<(), HostError> {
        if self.node(child)?.parent != Some(parent) {
            return Err(HostError::Missing { id: child });
        }
        self.detach(child)?;
        self.mutations.push(Mutation::RemoveChild { parent, child });
        Ok(())
    }

    fn set_property(
        &mut self,
        node: HostId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        match &mut self.node_mut(node)?.kind {
            DocNodeKind::Element { properties, .. } => {
                properties.insert(name.to_owned(), value.clone());
            }
            DocNodeKind::Text { value: text } if name == NODE_VALUE => {
                *text = value.to_string();
            }
            DocNodeKind::Text { .. } => {
                log::warn!("ignoring property `{name}` on text node {node}");
            }
        }
        self.mutations.push(Mutation::SetProperty {
            node,
            name: name.to_owned(),
            value: value.clone(),
        });
        Ok(())
    }

    fn clear_property(&mut self, node: HostId, name: &str) -> Result<(), HostError> {
        match &mut self.node_mut(node)?.kind {
            DocNodeKind::Element { properties, .. } => {
                properties.shift_remove(name);
            }
            DocNodeKind::Text { value } if name == NODE_VALUE => value.clear(),
            DocNodeKind::Text { .. } => {}
        }
        self.mutations.push(Mutation::ClearProperty {
            node,
            name: name.to_owned(),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: HostId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        match &mut self.node_mut(node)?.kind {
            DocNodeKind::Element { listeners, .. } => {
                listeners
                    .entry(event.to_owned())
                    .or_default()
                    .push(handler.clone());
            }
            DocNodeKind::Text { .. } => return Err(HostError::NotAContainer { id: node }),
        }
        self.mutations.push(Mutation::AddListener {
            node,
            event: event.to_owned(),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: HostId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        if let DocNodeKind::Element { listeners, .. } = &mut self.node_mut(node)?.kind {
            if let Some(attached) = listeners.get_mut(event) {
                attached.retain(|existing| !existing.ptr_eq(handler));
            }
        }
        self.mutations.push(Mutation::RemoveListener {
            node,
            event: event.to_owned(),
        });
        Ok(())
    }

    fn accepts_children(&self, node: HostId) -> bool {
        matches!(
            self.nodes.get(node).map(|n| &n.kind),
            Some(DocNodeKind::Element { .. })
        )
    }
}
