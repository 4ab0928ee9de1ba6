//! Parent-to-children index over one activity snapshot.

use crate::model::catalog::{Activity, ActivityId};
use std::collections::{HashMap, HashSet};

/// Outcome of looking up a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildLookup<'a> {
    /// The node is not part of the snapshot, so its children are unknown.
    Unreadable,
    /// The node exists and has no children.
    Empty,
    /// Children in snapshot order.
    Populated(&'a [&'a Activity]),
}

impl<'a> ChildLookup<'a> {
    /// Children to render; `Unreadable` degrades to none.
    pub fn as_slice(&self) -> &'a [&'a Activity] {
        match *self {
            Self::Populated(children) => children,
            Self::Unreadable | Self::Empty => &[],
        }
    }
}

/// Mapping from activity id to its ordered children.
///
/// Built once per request from a fresh snapshot.
#[derive(Debug, Default)]
pub struct ChildIndex<'a> {
    known: HashSet<ActivityId>,
    children: HashMap<ActivityId, Vec<&'a Activity>>,
}

impl<'a> ChildIndex<'a> {
    pub fn build(activities: &'a [Activity]) -> Self {
        let mut index = Self::default();
        for activity in activities {
            index.known.insert(activity.id);
            if let Some(parent_id) = activity.parent_id {
                index.children.entry(parent_id).or_default().push(activity);
            }
        }
        index
    }

    pub fn children_of(&self, id: ActivityId) -> ChildLookup<'_> {
        if !self.known.contains(&id) {
            return ChildLookup::Unreadable;
        }
        match self.children.get(&id) {
            Some(children) => ChildLookup::Populated(children.as_slice()),
            None => ChildLookup::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChildIndex, ChildLookup};
    use crate::model::catalog::Activity;

    fn activity(id: i64, parent_id: Option<i64>) -> Activity {
        Activity {
            id,
            name: format!("activity {id}"),
            parent_id,
        }
    }

    #[test]
    fn lookup_distinguishes_unknown_empty_and_populated() {
        let activities = vec![
            activity(1, None),
            activity(2, Some(1)),
            activity(3, Some(1)),
        ];
        let index = ChildIndex::build(&activities);

        assert_eq!(index.children_of(99), ChildLookup::Unreadable);
        assert_eq!(index.children_of(2), ChildLookup::Empty);

        let ids = index
            .children_of(1)
            .as_slice()
            .iter()
            .map(|child| child.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn orphan_parent_reference_does_not_make_parent_known() {
        let activities = vec![activity(5, Some(42))];
        let index = ChildIndex::build(&activities);
        assert_eq!(index.children_of(42), ChildLookup::Unreadable);
        assert!(index.children_of(42).as_slice().is_empty());
    }
}
