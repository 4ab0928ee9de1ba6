//! Depth-bounded rendering of activity subtrees.
//!
//! Levels are 1-based. A node rendered at `max_level` carries no `children`
//! field at all (`None`), while shallower nodes always carry a list, possibly
//! empty. Calls past `max_level` render nothing.

use super::children::{ChildIndex, ChildLookup};
use crate::model::catalog::Activity;
use crate::model::view::ActivityNode;
use log::warn;

pub const ROOT_LEVEL: u32 = 1;
pub const DEFAULT_MAX_LEVEL: u32 = 3;

/// Renders `activity` at `level`, expanding children while `level < max_level`.
///
/// Returns `None` when `level > max_level`.
pub fn render_activity(
    activity: &Activity,
    index: &ChildIndex<'_>,
    level: u32,
    max_level: u32,
) -> Option<ActivityNode> {
    if level > max_level {
        return None;
    }

    let children = (level < max_level).then(|| {
        let lookup = index.children_of(activity.id);
        if lookup == ChildLookup::Unreadable {
            warn!(
                "event=activity_children_unreadable module=taxonomy status=error activity_id={} level={}",
                activity.id, level
            );
        }
        lookup
            .as_slice()
            .iter()
            .filter_map(|child| render_activity(child, index, level + 1, max_level))
            .collect()
    });

    Some(ActivityNode {
        id: activity.id,
        name: activity.name.clone(),
        parent_id: activity.parent_id,
        children,
    })
}

/// Renders one tree per directly-assigned activity with the default bound.
pub fn render_assigned(assigned: &[Activity], index: &ChildIndex<'_>) -> Vec<ActivityNode> {
    assigned
        .iter()
        .filter_map(|activity| render_activity(activity, index, ROOT_LEVEL, DEFAULT_MAX_LEVEL))
        .collect()
}
