//! Units of work and the yield capability the work loop consults.

use std::cell::{Cell, RefCell};

use crate::arena::{WorkArena, WorkNodeId};
use crate::commit::update_properties;
use crate::element::{Component, ElementType};
use crate::error::RenderError;
use crate::hooks::{self, HookFrame};
use crate::host::{Host, HostId};
use crate::props::{Props, NODE_VALUE};
use crate::reconciler::diff_children;
use crate::runtime::RuntimeHandle;

/// Decides when the work loop hands control back to its caller.
pub trait Deadline {
    fn should_yield(&self) -> bool;
}

impl<F: Fn() -> bool> Deadline for F {
    fn should_yield(&self) -> bool {
        self()
    }
}

/// Never yields: the loop drains the whole generation in one tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn should_yield(&self) -> bool {
        false
    }
}

/// Yields after a fixed number of units of work.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }
}

impl Deadline for UnitBudget {
    fn should_yield(&self) -> bool {
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        remaining == 0
    }
}

/// Outcome of one work loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing was scheduled.
    Idle,
    /// The deadline ran out with units of work left.
    Yielded,
    /// A generation finished and was flushed to the host.
    Committed,
}

/// Everything a unit of work may touch besides the node itself.
pub(crate) struct WorkContext<'a, H: Host> {
    pub arena: &'a mut WorkArena,
    pub host: &'a mut H,
    pub deletions: &'a mut Vec<WorkNodeId>,
    pub runtime: RuntimeHandle,
}

/// Expands `unit` one level and returns the next unit in pre-order.
pub(crate) fn perform_unit_of_work<H: Host>(
    cx: &mut WorkContext<'_, H>,
    unit: WorkNodeId,
) -> Result<Option<WorkNodeId>, RenderError> {
    let ty = cx.arena[unit].ty.clone();
    match ty {
        Some(ElementType::Component(component)) => update_component(cx, unit, &component)?,
        Some(ElementType::Host(ref tag)) => {
            ensure_host_node(cx, unit, HostKind::Element(&tag[..]))?;
            reconcile_props_children(cx, unit);
        }
        Some(ElementType::Text) => {
            ensure_host_node(cx, unit, HostKind::Text)?;
            reconcile_props_children(cx, unit);
        }
        // The generation root already owns its container.
        None => reconcile_props_children(cx, unit),
    }
    Ok(next_unit(cx.arena, unit))
}

fn update_component<H: Host>(
    cx: &mut WorkContext<'_, H>,
    unit: WorkNodeId,
    component: &Component,
) -> Result<(), RenderError> {
    let node = &mut cx.arena[unit];
    node.hooks.clear();
    let props = node.props.clone();
    let previous = node
        .alternate
        .map(|alternate| cx.arena[alternate].hooks.clone());

    log::trace!("rendering component `{}`", component.name());
    let frame = RefCell::new(HookFrame::new(component.name(), previous, cx.runtime.clone()));
    let elements = hooks::with_frame(&frame, || component.invoke(&props));
    let cells = frame.into_inner().finish()?;

    cx.arena[unit].hooks = cells;
    diff_children(cx.arena, unit, &elements, cx.deletions);
    Ok(())
}

fn reconcile_props_children<H: Host>(cx: &mut WorkContext<'_, H>, unit: WorkNodeId) {
    let props = cx.arena[unit].props.clone();
    diff_children(cx.arena, unit, props.children(), cx.deletions);
}

enum HostKind<'a> {
    Element(&'a str),
    Text,
}

/// Allocates the host node of `unit` on first visit, detached, with its
/// initial properties and listeners.
fn ensure_host_node<H: Host>(
    cx: &mut WorkContext<'_, H>,
    unit: WorkNodeId,
    kind: HostKind<'_>,
) -> Result<HostId, RenderError> {
    if let Some(host) = cx.arena[unit].host {
        return Ok(host);
    }
    let props = cx.arena[unit].props.clone();
    let (created, seed) = match kind {
        HostKind::Element(tag) => {
            if !is_valid_tag(tag) {
                return Err(RenderError::Configuration {
                    tag: tag.to_owned(),
                });
            }
            let created = cx.host.create_element(tag).map_err(RenderError::from_create)?;
            (created, Props::new())
        }
        HostKind::Text => {
            let value = props.get(NODE_VALUE).map(ToString::to_string).unwrap_or_default();
            let created = cx.host.create_text(&value)?;
            (created, Props::new().with(NODE_VALUE, value))
        }
    };
    update_properties(cx.host, created, &seed, &props)?;
    cx.arena[unit].host = Some(created);
    Ok(created)
}

pub(crate) fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Depth-first pre-order successor: first child, otherwise the first sibling
/// found walking up through the parents. `None` once the root is reached.
pub(crate) fn next_unit(arena: &WorkArena, unit: WorkNodeId) -> Option<WorkNodeId> {
    if let Some(child) = arena[unit].child {
        return Some(child);
    }
    let mut current = Some(unit);
    while let Some(id) = current {
        if let Some(sibling) = arena[id].sibling {
            return Some(sibling);
        }
        current = arena[id].parent;
    }
    None
}
