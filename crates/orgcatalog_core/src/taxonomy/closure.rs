//! Descendant closure of one activity.

use crate::model::catalog::{Activity, ActivityId};
use log::warn;
use std::collections::BTreeSet;

/// Returns `root_id` together with every activity reachable through
/// parent-to-child links, at any depth.
///
/// Each expansion scans the full snapshot, so cost is proportional to the
/// snapshot size times the number of expanded nodes. A node that is reached a
/// second time is not expanded again, which keeps corrupted cyclic parent
/// chains from looping forever.
pub fn descendants(root_id: ActivityId, activities: &[Activity]) -> BTreeSet<ActivityId> {
    let mut result = BTreeSet::from([root_id]);
    let mut pending = vec![root_id];

    while let Some(parent_id) = pending.pop() {
        for activity in activities
            .iter()
            .filter(|activity| activity.parent_id == Some(parent_id))
        {
            if result.insert(activity.id) {
                pending.push(activity.id);
            } else {
                warn!(
                    "event=activity_cycle_detected module=taxonomy status=error root_id={} activity_id={} parent_id={}",
                    root_id, activity.id, parent_id
                );
            }
        }
    }

    result
}
