//! Geometric rank discounting for rank-biased metrics.

/// Default persistence of the simulated user: the probability of looking one rank further.
pub const PATIENCE: f64 = 0.8;

/// Weight of a hit at `rank`: `patience^rank`.
///
/// `discount(0, _)` is 1 and the weight strictly decreases with rank for patience in (0, 1).
pub fn discount(rank: u32, patience: f64) -> f64 {
    patience.powf(f64::from(rank))
}

/// Average discount over the first `count` ranks: `(1 - p^n) / (n (1 - p))`.
///
/// Used to normalize scores of users whose truth sets are shorter than the list.
pub fn test_weight(count: u32, patience: f64) -> f64 {
    (1.0 - patience.powf(f64::from(count))) / (f64::from(count) * (1.0 - patience))
}

/// Largest rank-biased precision a user with `ngood` relevant items can reach.
pub fn rbp_max(ngood: u32, patience: f64) -> f64 {
    let total: f64 = (1..=ngood).map(|rank| discount(rank, patience)).sum();
    total * (1.0 - patience)
}
