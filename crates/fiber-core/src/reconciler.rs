//! Positional child diffing.

use crate::arena::{EffectTag, WorkArena, WorkNode, WorkNodeId};
use crate::element::Element;

/// Rebuilds `parent`'s child chain from `elements`, matching them by index
/// against the children of `parent`'s alternate.
///
/// Same type at the same index yields an `Update` node that keeps the old
/// host node; anything else yields an `Insert` for the new element and a
/// `Delete` for the old node, which is appended to `deletions` instead of
/// being linked into the new chain. Returns the new first child.
pub fn diff_children(
    arena: &mut WorkArena,
    parent: WorkNodeId,
    elements: &[Element],
    deletions: &mut Vec<WorkNodeId>,
) -> Option<WorkNodeId> {
    let mut old = arena[parent].alternate.and_then(|alt| arena[alt].child);
    let mut previous: Option<WorkNodeId> = None;
    let mut first = None;
    let mut index = 0;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let same_type = match (element, old) {
            (Some(element), Some(old)) => arena[old].ty.as_ref() == Some(element.element_type()),
            _ => false,
        };

        let mut created = None;
        if let (true, Some(element), Some(old)) = (same_type, element, old) {
            let host = arena[old].host;
            created = Some(arena.alloc(WorkNode::update(element, parent, old, host)));
        } else {
            if let Some(element) = element {
                created = Some(arena.alloc(WorkNode::insert(element, parent)));
            }
            if let Some(old) = old {
                arena[old].effect = Some(EffectTag::Delete);
                deletions.push(old);
            }
        }

        if let Some(old_id) = old {
            old = arena[old_id].sibling;
        }
        if let Some(id) = created {
            match previous {
                Some(previous) => arena[previous].sibling = Some(id),
                None => first = Some(id),
            }
            previous = Some(id);
        }
        index += 1;
    }

    arena[parent].child = first;
    first
}
