//! Synthetic runs for metric benchmarks.

use rankeval_core::{RecRow, RecTable, TruthRow, TruthTable};

/// A run of `users` users with `list_len` recommendations each, and a truth table holding
/// every third recommended item plus one unrecommended item per user.
///
/// # Errors
/// Returns an error if the generated lists are malformed
pub fn synthetic_run(users: i64, list_len: u32) -> rankeval_core::Result<(RecTable, TruthTable)> {
    let mut recs = Vec::new();
    let mut truth = Vec::new();
    for user in 0..users {
        for rank in 1..=list_len {
            let item = (user * 31 + i64::from(rank) * 7) % 10_000 + i64::from(rank) * 10_000;
            recs.push(RecRow { user, item, rank });
            if rank % 3 == 0 {
                truth.push(TruthRow {
                    user,
                    item,
                    rating: Some(f64::from(rank % 5 + 1)),
                });
            }
        }
        truth.push(TruthRow {
            user,
            item: -1 - user,
            rating: None,
        });
    }
    Ok((RecTable::new(recs)?, TruthTable::from_rows(truth)))
}
