use std::collections::{BTreeMap, BTreeSet};

use crate::error::ScaleError;

/// Column-to-group lookup built from the `groups` option.
///
/// Construction fails with [`ScaleError::DuplicateGroupMembership`] when a
/// column is listed in more than one group. Groups are visited in name
/// order, so the reported pair is deterministic.
#[derive(Debug, Clone, Default)]
pub struct GroupResolver {
    membership: BTreeMap<String, String>,
}

impl GroupResolver {
    pub fn new(groups: &BTreeMap<String, BTreeSet<String>>) -> Result<Self, ScaleError> {
        let mut membership = BTreeMap::new();
        for (group, columns) in groups {
            for column in columns {
                if let Some(first_group) = membership.insert(column.clone(), group.clone()) {
                    return Err(ScaleError::DuplicateGroupMembership {
                        column: column.clone(),
                        first_group,
                        second_group: group.clone(),
                    });
                }
            }
        }
        Ok(Self { membership })
    }

    #[must_use]
    pub fn group_of(&self, column: &str) -> Option<&str> {
        self.membership.get(column).map(String::as_str)
    }
}
