//! Map aliases used by host-side bookkeeping.
//!
//! Enable the `std-hash` feature to swap `hashbrown` for the standard library
//! maps (useful when comparing allocation behaviour).

#[cfg(feature = "std-hash")]
pub(crate) use std::collections::HashMap;

#[cfg(not(feature = "std-hash"))]
pub(crate) use hashbrown::HashMap;

use crate::props::EventHandler;

/// Listeners attached to one host node, keyed by event name in attach order.
pub(crate) type ListenerTable = HashMap<String, Vec<EventHandler>>;
