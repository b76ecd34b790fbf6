//! Held-out truth sets.

use core::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::types::{ItemId, TruthRow, UserId};

/// Relevant items for one user, each with its relevance gain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruthSet {
    gains: HashMap<ItemId, f64>,
}

impl TruthSet {
    /// Build a set from (item, gain) pairs.
    pub fn from_gains(gains: impl IntoIterator<Item = (ItemId, f64)>) -> Self {
        Self {
            gains: gains.into_iter().collect(),
        }
    }

    /// Whether the item is relevant.
    pub fn contains(&self, item: ItemId) -> bool {
        self.gains.contains_key(&item)
    }

    /// Gain of a relevant item; `None` for non-relevant items.
    pub fn gain(&self, item: ItemId) -> Option<f64> {
        self.gains.get(&item).copied()
    }

    /// Gains sorted best-first, truncated to `cutoff` when given.
    pub fn ideal_gains(&self, cutoff: Option<usize>) -> Vec<f64> {
        let mut gains: Vec<f64> = self.gains.values().copied().collect();
        gains.sort_by(|left, right| right.partial_cmp(left).unwrap_or(Ordering::Equal));
        if let Some(limit) = cutoff {
            gains.truncate(limit);
        }
        gains
    }

    /// Number of relevant items.
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    /// Whether no item is relevant.
    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }
}

/// Truth sets for every user of one partition.
#[derive(Debug, Clone, Default)]
pub struct TruthTable {
    sets: BTreeMap<UserId, TruthSet>,
}

impl TruthTable {
    /// Build a table from truth rows.
    ///
    /// A row's rating becomes its gain; rows without a rating count with gain 1.
    pub fn from_rows(rows: impl IntoIterator<Item = TruthRow>) -> Self {
        let mut sets: BTreeMap<UserId, TruthSet> = BTreeMap::new();
        for row in rows {
            sets.entry(row.user)
                .or_default()
                .gains
                .insert(row.item, row.rating.unwrap_or(1.0));
        }
        Self { sets }
    }

    /// Truth set of one user, if the user has any held-out items.
    pub fn get(&self, user: UserId) -> Option<&TruthSet> {
        self.sets.get(&user)
    }

    /// Users with at least one held-out item, ascending.
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.sets.keys().copied()
    }

    /// Number of users with held-out items.
    pub fn user_count(&self) -> usize {
        self.sets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_defaults_to_one() {
        let table = TruthTable::from_rows([
            TruthRow {
                user: 1,
                item: 10,
                rating: None,
            },
            TruthRow {
                user: 1,
                item: 11,
                rating: Some(4.0),
            },
        ]);
        let set = table.get(1).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.gain(10), Some(1.0));
        assert_eq!(set.gain(11), Some(4.0));
        assert!(!set.contains(12));
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_ideal_gains_sorted_and_truncated() {
        let set = TruthSet::from_gains([(1, 2.0), (2, 5.0), (3, 3.0)]);
        assert_eq!(set.ideal_gains(None), vec![5.0, 3.0, 2.0]);
        assert_eq!(set.ideal_gains(Some(2)), vec![5.0, 3.0]);
    }

    #[test]
    fn test_users_sorted() {
        let table = TruthTable::from_rows([5, 2, 9].map(|user| TruthRow {
            user,
            item: 1,
            rating: None,
        }));
        assert_eq!(table.users().collect::<Vec<_>>(), vec![2, 5, 9]);
        assert_eq!(table.user_count(), 3);
    }
}
