use crate::host::{HostError, HostId};

/// Failure of one render cycle. The in-progress generation is discarded
/// before any of these reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("`{tag}` is not a recognized host tag")]
    Configuration { tag: String },
    #[error("container {container} cannot accept children")]
    Mount { container: HostId },
    #[error("hook order changed in `{component}` at hook {index}: {reason}")]
    HookOrder {
        component: &'static str,
        index: usize,
        reason: &'static str,
    },
    #[error(transparent)]
    Host(#[from] HostError),
    /// A host error interrupted a commit, so the host tree no longer matches
    /// any generation the root knows about.
    #[error("root is unusable after a failed commit")]
    Poisoned,
}

impl RenderError {
    /// Maps host refusals of a tag onto configuration errors.
    pub(crate) fn from_create(err: HostError) -> Self {
        match err {
            HostError::UnsupportedTag { tag } => RenderError::Configuration { tag },
            other => RenderError::Host(other),
        }
    }
}
