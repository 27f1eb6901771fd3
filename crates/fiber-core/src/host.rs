use crate::props::{EventHandler, PropValue};

pub type HostId = usize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host node {id} missing")]
    Missing { id: HostId },
    #[error("host node {id} cannot accept children")]
    NotAContainer { id: HostId },
    #[error("host does not support tag `{tag}`")]
    UnsupportedTag { tag: String },
}

/// The host tree the commit phase mutates.
///
/// This is the only surface the runtime touches: it never inspects host
/// nodes beyond these operations.
pub trait Host {
    fn create_element(&mut self, tag: &str) -> Result<HostId, HostError>;
    fn create_text(&mut self, value: &str) -> Result<HostId, HostError>;
    fn append_child(&mut self, parent: HostId, child: HostId) -> Result<(), HostError>;
    /// Inserts `child` directly before `anchor`, an existing child of `parent`.
    fn insert_before(
        &mut self,
        parent: HostId,
        child: HostId,
        anchor: HostId,
    ) -> Result<(), HostError>;
    fn remove_child(&mut self, parent: HostId, child: HostId) -> Result<(), HostError>;
    fn set_property(
        &mut self,
        node: HostId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError>;
    fn clear_property(&mut self, node: HostId, name: &str) -> Result<(), HostError>;
    fn add_listener(
        &mut self,
        node: HostId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;
    fn remove_listener(
        &mut self,
        node: HostId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;
    fn accepts_children(&self, node: HostId) -> bool;
}
