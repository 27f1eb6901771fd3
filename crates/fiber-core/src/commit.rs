//! Flushes one finished generation to the host tree.
//!
//! Runs to completion once started; the scheduler only calls it after every
//! unit of work of the generation has been performed.

use crate::arena::{EffectTag, WorkArena, WorkNodeId};
use crate::collections::HashMap;
use crate::host::{Host, HostError, HostId};
use crate::props::{classify, PropKind, PropValue, Props};

/// Effect counts of one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub generation: u64,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

pub(crate) fn commit_root<H: Host>(
    arena: &mut WorkArena,
    host: &mut H,
    root: WorkNodeId,
    deletions: &[WorkNodeId],
) -> Result<CommitSummary, HostError> {
    let mut summary = CommitSummary {
        deleted: deletions.len(),
        ..CommitSummary::default()
    };

    for &deleted in deletions {
        commit_deletion(arena, host, deleted)?;
    }

    let mut anchors = AnchorCache::default();
    let mut next = arena[root].child;
    while let Some(id) = next {
        match arena[id].effect {
            Some(EffectTag::Insert) => summary.inserted += 1,
            Some(EffectTag::Update) => summary.updated += 1,
            _ => {}
        }
        commit_work(arena, host, &mut anchors, id)?;
        next = arena.next_in_subtree(id, root);
    }
    Ok(summary)
}

fn commit_work<H: Host>(
    arena: &mut WorkArena,
    host: &mut H,
    anchors: &mut AnchorCache,
    id: WorkNodeId,
) -> Result<(), HostError> {
    let node = &arena[id];
    match (node.effect, node.host) {
        (Some(EffectTag::Insert), Some(child)) => {
            let Some(parent) = arena.host_parent(id) else {
                log::warn!("inserted node {id:?} has no host ancestor");
                return Ok(());
            };
            match anchors.anchor_after(arena, id) {
                Some(anchor) => host.insert_before(parent, child, anchor)?,
                None => host.append_child(parent, child)?,
            }
        }
        (Some(EffectTag::Update), Some(target)) => {
            if let Some(alternate) = node.alternate {
                let previous = &arena[alternate].props;
                update_properties(host, target, previous, &node.props)?;
            }
        }
        _ => {}
    }
    for cell in &mut arena[id].hooks {
        cell.settle();
    }
    Ok(())
}

fn commit_deletion<H: Host>(
    arena: &WorkArena,
    host: &mut H,
    id: WorkNodeId,
) -> Result<(), HostError> {
    let Some(parent) = arena.host_parent(id) else {
        log::warn!("deleted node {id:?} has no host ancestor");
        return Ok(());
    };
    remove_host_nodes(arena, host, parent, id)
}

/// Component nodes own no host node; their nearest host descendants go instead.
fn remove_host_nodes<H: Host>(
    arena: &WorkArena,
    host: &mut H,
    parent: HostId,
    id: WorkNodeId,
) -> Result<(), HostError> {
    if let Some(child) = arena[id].host {
        return host.remove_child(parent, child);
    }
    let mut next = arena[id].child;
    while let Some(child) = next {
        remove_host_nodes(arena, host, parent, child)?;
        next = arena[child].sibling;
    }
    Ok(())
}

/// Memoized insertion anchors for one commit.
///
/// The anchor of a node is the first already-attached host node after it
/// under the same host parent. Only `Update` nodes qualify and those stay
/// attached for the whole commit, so a computed anchor never goes stale and
/// a run of inserted siblings is scanned once instead of once per sibling.
#[derive(Default)]
struct AnchorCache {
    known: HashMap<WorkNodeId, Option<HostId>>,
}

impl AnchorCache {
    fn anchor_after(&mut self, arena: &WorkArena, id: WorkNodeId) -> Option<HostId> {
        // Every node pushed here has the same anchor as `id`.
        let mut pending = Vec::new();
        let anchor = self.scan(arena, id, &mut pending);
        for node in pending {
            self.known.insert(node, anchor);
        }
        anchor
    }

    fn scan(
        &self,
        arena: &WorkArena,
        id: WorkNodeId,
        pending: &mut Vec<WorkNodeId>,
    ) -> Option<HostId> {
        let mut current = id;
        'siblings: loop {
            loop {
                if let Some(&anchor) = self.known.get(&current) {
                    return anchor;
                }
                pending.push(current);
                if arena[current].sibling.is_some() {
                    break;
                }
                let parent = arena[current].parent?;
                if arena[parent].host.is_some() {
                    return None;
                }
                current = parent;
            }
            current = arena[current].sibling?;

            loop {
                let node = &arena[current];
                if node.effect == Some(EffectTag::Insert) {
                    continue 'siblings;
                }
                if let Some(host) = node.host {
                    return Some(host);
                }
                match node.child {
                    Some(child) => current = child,
                    None => continue 'siblings,
                }
            }
        }
    }
}

/// Applies the delta between `previous` and `next` to `node`.
///
/// Stale listeners go first, then removed properties, then new or changed
/// properties, then new or changed listeners.
pub(crate) fn update_properties<H: Host>(
    host: &mut H,
    node: HostId,
    previous: &Props,
    next: &Props,
) -> Result<(), HostError> {
    for (key, value) in previous.iter() {
        let PropKind::Listener(event) = classify(key) else {
            continue;
        };
        if !same_value(next.get(key), value) {
            if let Some(handler) = value.as_handler() {
                host.remove_listener(node, &event, handler)?;
            }
        }
    }

    for (key, _) in previous.iter() {
        if classify(key) == PropKind::Property && !next.contains_key(key) {
            host.clear_property(node, key)?;
        }
    }

    for (key, value) in next.iter() {
        if classify(key) == PropKind::Property && !same_value(previous.get(key), value) {
            host.set_property(node, key, value)?;
        }
    }

    for (key, value) in next.iter() {
        let PropKind::Listener(event) = classify(key) else {
            continue;
        };
        if !same_value(previous.get(key), value) {
            match value {
                PropValue::Handler(handler) => host.add_listener(node, &event, handler)?,
                other => log::warn!("listener prop `{key}` is not a handler: {other}"),
            }
        }
    }
    Ok(())
}

/// Equality for change detection: floats compare by bits so `NaN` is stable.
fn same_value(previous: Option<&PropValue>, next: &PropValue) -> bool {
    match (previous, next) {
        (Some(PropValue::Float(a)), PropValue::Float(b)) => a.to_bits() == b.to_bits(),
        (Some(previous), next) => previous == next,
        (None, _) => false,
    }
}
