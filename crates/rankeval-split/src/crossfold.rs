//! User-level crossfolding: rotation partitions, disjoint user samples, and repeated samples.
//!
//! Every function takes rows in source order and an RNG; given the same RNG state it returns
//! the same folds. Folds hold sorted positions into the source rows.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom as _;
use rankeval_core::{Interaction, UserId};

/// One fold: the test rows by position; train is everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fold {
    test: Vec<usize>,
}

impl Fold {
    fn from_positions(mut test: Vec<usize>) -> Self {
        test.sort_unstable();
        Self { test }
    }

    /// Sorted positions of the test rows in the source rows.
    pub fn test_positions(&self) -> &[usize] {
        &self.test
    }

    /// Number of test rows.
    pub fn len(&self) -> usize {
        self.test.len()
    }

    /// Whether the fold holds no test rows.
    pub fn is_empty(&self) -> bool {
        self.test.is_empty()
    }

    /// Test rows, in source order.
    pub fn test(&self, rows: &[Interaction]) -> Vec<Interaction> {
        self.test
            .iter()
            .filter_map(|&position| rows.get(position).cloned())
            .collect()
    }

    /// Train rows: the complement of the test rows, in source order.
    pub fn train(&self, rows: &[Interaction]) -> Vec<Interaction> {
        let held_out: HashSet<usize> = self.test.iter().copied().collect();
        rows.iter()
            .enumerate()
            .filter(|(position, _)| !held_out.contains(position))
            .map(|(_, row)| row.clone())
            .collect()
    }
}

/// Row positions grouped by user, users in ascending id order.
pub fn group_by_user(rows: &[Interaction]) -> BTreeMap<UserId, Vec<usize>> {
    let mut groups: BTreeMap<UserId, Vec<usize>> = BTreeMap::new();
    for (position, row) in rows.iter().enumerate() {
        groups.entry(row.user).or_default().push(position);
    }
    groups
}

/// Up to `rates` random rows of one user.
fn sample_rows<R: Rng + ?Sized>(positions: &[usize], rates: usize, rng: &mut R) -> Vec<usize> {
    positions.choose_multiple(rng, rates).copied().collect()
}

/// Partition every user's rows across `partitions` folds, up to `rates` rows per fold.
///
/// Each user's rows are shuffled once and fold `f` takes the `f`-th block of `rates` rows, so a
/// user's test rows never repeat across folds.
pub fn partition_users<R: Rng + ?Sized>(
    rows: &[Interaction],
    partitions: usize,
    rates: usize,
    rng: &mut R,
) -> Vec<Fold> {
    let mut tests = vec![Vec::new(); partitions];
    for positions in group_by_user(rows).into_values() {
        let mut shuffled = positions;
        shuffled.shuffle(rng);
        for (test, block) in tests.iter_mut().zip(shuffled.chunks(rates.max(1))) {
            test.extend_from_slice(block);
        }
    }
    tests.into_iter().map(Fold::from_positions).collect()
}

/// Draw `partitions` disjoint sets of `users` users, each contributing up to `rates` rows.
///
/// When there are fewer than `partitions * users` users the sets cannot be disjoint; the
/// caller is expected to fall back to [`partition_users`].
pub fn sample_users<R: Rng + ?Sized>(
    rows: &[Interaction],
    partitions: usize,
    users: usize,
    rates: usize,
    rng: &mut R,
) -> Vec<Fold> {
    let groups: Vec<Vec<usize>> = group_by_user(rows).into_values().collect();
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.shuffle(rng);

    order
        .chunks(users.max(1))
        .take(partitions)
        .map(|chosen| {
            let test = chosen
                .iter()
                .flat_map(|&group| sample_rows(&groups[group], rates, rng))
                .collect();
            Fold::from_positions(test)
        })
        .collect()
}

/// Draw `samples` independent folds of up to `users` users with up to `rates` rows each.
pub fn sample_repeated<R: Rng + ?Sized>(
    rows: &[Interaction],
    samples: usize,
    users: usize,
    rates: usize,
    rng: &mut R,
) -> Vec<Fold> {
    let groups: Vec<Vec<usize>> = group_by_user(rows).into_values().collect();
    (0..samples)
        .map(|_| {
            let chosen: Vec<&Vec<usize>> = groups.choose_multiple(rng, users).collect();
            let test = chosen
                .into_iter()
                .flat_map(|positions| sample_rows(positions, rates, rng))
                .collect();
            Fold::from_positions(test)
        })
        .collect()
}
