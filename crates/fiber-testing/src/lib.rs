//! Testing utilities and harness for fiber-core

pub mod testing;

// Re-export testing utilities
pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
    pub use fiber_core::{
        element, props, use_state, use_state_with, Component, Element, EventHandler, Props,
        SetState, WorkStatus,
    };
}
