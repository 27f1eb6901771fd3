#![doc = r"Incremental reconciliation runtime: elements, work nodes, hooks and an atomic commit to a host tree."]

extern crate self as fiber_core;

pub mod arena;
mod collections;
pub mod commit;
pub mod element;
pub mod error;
pub mod hooks;
pub mod host;
pub mod memory;
pub mod platform;
pub mod props;
pub mod reconciler;
pub mod root;
pub mod runtime;
pub mod scheduler;

pub use arena::{EffectTag, WorkArena, WorkNode, WorkNodeId};
pub use commit::CommitSummary;
pub use element::{
    create_element, create_text_element, Child, Component, Element, ElementType, IntoElements,
};
pub use error::RenderError;
pub use hooks::{use_state, use_state_with, SetState};
pub use host::{Host, HostError, HostId};
pub use memory::{MemoryDocument, Mutation};
pub use platform::{Clock, RuntimeScheduler};
pub use props::{classify, Event, EventHandler, PropKind, PropValue, Props, CHILDREN, NODE_VALUE};
pub use reconciler::diff_children;
pub use root::{render, FiberRoot};
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use scheduler::{Deadline, Unbounded, UnitBudget, WorkStatus};

#[cfg(test)]
pub use runtime::RecordingScheduler;

#[cfg(test)]
#[path = "tests/element_tests.rs"]
mod element_tests;

#[cfg(test)]
#[path = "tests/reconciler_tests.rs"]
mod reconciler_tests;

#[cfg(test)]
#[path = "tests/root_tests.rs"]
mod root_tests;

#[cfg(test)]
#[path = "tests/hooks_tests.rs"]
mod hooks_tests;

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod memory_tests;
