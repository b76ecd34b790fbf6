//! Row types shared by the splitter and the evaluator.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// User identifier as stored in interaction and recommendation tables.
pub type UserId = i64;

/// Item identifier as stored in interaction and recommendation tables.
pub type ItemId = i64;

/// Identifier of one test partition, taken from `recs-<digits>` / `test-<digits>` file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionId(pub u32);

impl PartitionId {
    /// Raw partition number.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for PartitionId {
    type Err = core::num::ParseIntError;

    fn from_str(digits: &str) -> Result<Self, Self::Err> {
        digits.parse().map(Self)
    }
}

/// One user-item interaction from a source dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// Row position in the source table
    pub index: u64,
    /// Interacting user
    pub user: UserId,
    /// Item interacted with
    pub item: ItemId,
    /// Explicit rating, if the dataset has one
    pub rating: Option<f64>,
    /// Interaction time, if the dataset has one
    pub timestamp: Option<i64>,
}

/// One entry of a recommendation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecRow {
    /// User the list was produced for
    pub user: UserId,
    /// Recommended item
    pub item: ItemId,
    /// 1-based rank within the user's list
    pub rank: u32,
}

/// One held-out relevant item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruthRow {
    /// User the item was held out for
    pub user: UserId,
    /// Held-out item
    pub item: ItemId,
    /// Rating of the held-out interaction, used as graded relevance
    pub rating: Option<f64>,
}

impl From<&Interaction> for TruthRow {
    fn from(interaction: &Interaction) -> Self {
        Self {
            user: interaction.user,
            item: interaction.item,
            rating: interaction.rating,
        }
    }
}

/// One metric value for one user of a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    /// Scored user
    pub user: UserId,
    /// Metric name, as configured
    pub metric: String,
    /// Score, or `None` when the metric is undefined for this user
    pub score: Option<f64>,
}
