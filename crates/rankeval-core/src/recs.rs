//! Recommendation lists of a single run.

use core::ops::Range;
use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};
use crate::types::{RecRow, UserId};

/// A run's recommendation lists, grouped per user in rank order.
///
/// Construction validates the list contract: ranks start at 1 or later, strictly increase
/// within a list, and no item appears twice in the same list. A row's 1-based position within
/// its list is its index in the slice returned by [`RecTable::list`] plus one.
#[derive(Debug, Clone, Default)]
pub struct RecTable {
    rows: Vec<RecRow>,
    lists: BTreeMap<UserId, Range<usize>>,
}

impl RecTable {
    /// Build a table from rows in any order.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRecommendations`] if a list has a zero rank, a repeated rank, or a
    /// repeated item.
    pub fn new(mut rows: Vec<RecRow>) -> Result<Self> {
        rows.sort_by_key(|row| (row.user, row.rank));

        let mut lists = BTreeMap::new();
        let mut start = 0;
        while start < rows.len() {
            let user = rows[start].user;
            let end = rows[start..]
                .iter()
                .position(|row| row.user != user)
                .map_or(rows.len(), |offset| start + offset);
            Self::validate_list(user, &rows[start..end])?;
            lists.insert(user, start..end);
            start = end;
        }

        Ok(Self { rows, lists })
    }

    fn validate_list(user: UserId, list: &[RecRow]) -> Result<()> {
        let mut seen = HashSet::with_capacity(list.len());
        let mut previous = 0;
        for row in list {
            if row.rank == 0 {
                return Err(Error::InvalidRecommendations {
                    user,
                    reason: "ranks must start at 1".to_owned(),
                });
            }
            if row.rank == previous {
                return Err(Error::InvalidRecommendations {
                    user,
                    reason: format!("rank {} appears more than once", row.rank),
                });
            }
            if !seen.insert(row.item) {
                return Err(Error::InvalidRecommendations {
                    user,
                    reason: format!("item {} appears more than once", row.item),
                });
            }
            previous = row.rank;
        }
        Ok(())
    }

    /// All rows, ordered by user then rank.
    pub fn rows(&self) -> &[RecRow] {
        &self.rows
    }

    /// The list for one user, in rank order.
    pub fn list(&self, user: UserId) -> Option<&[RecRow]> {
        self.lists.get(&user).map(|range| &self.rows[range.clone()])
    }

    /// Every (user, list) pair in ascending user order.
    pub fn lists(&self) -> impl Iterator<Item = (UserId, &[RecRow])> {
        self.lists
            .iter()
            .map(|(user, range)| (*user, &self.rows[range.clone()]))
    }

    /// Users with a list, ascending.
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.lists.keys().copied()
    }

    /// Number of users with a list.
    pub fn user_count(&self) -> usize {
        self.lists.len()
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
