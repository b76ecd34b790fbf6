//! Named, parameterized metrics reported for every user.

use std::collections::HashSet;

use rankeval_core::{Error, MetricConfig, Result};

use crate::discount::PATIENCE;
use crate::library::MetricParams;
use crate::registry::{HIT, MetricEntry, MetricKind, NDCG, RBP, RECIP_RANK};

/// One reported metric: a registered kind under an output name.
#[derive(Debug, Clone)]
pub struct Metric {
    /// Output name in the score table
    pub name: String,
    /// Registry entry
    pub entry: &'static MetricEntry,
    /// Cutoff and patience
    pub params: MetricParams,
}

impl Metric {
    /// Registered kind.
    pub const fn kind(&self) -> MetricKind {
        self.entry.kind
    }
}

static STANDARD: [(&str, &MetricEntry, usize); 6] = [
    ("rbp", &RBP, 1000),
    ("ndcg", &NDCG, 1000),
    ("recip_rank", &RECIP_RANK, 1000),
    ("hit", &HIT, 1000),
    ("hit10", &HIT, 10),
    ("hit20", &HIT, 20),
];

/// Ordered set of metrics; the order is the metric order of the score table.
#[derive(Debug, Clone)]
pub struct MetricSet {
    metrics: Vec<Metric>,
}

impl MetricSet {
    /// `rbp`, `ndcg`, `recip_rank`, `hit` at 1000, plus `hit10` and `hit20`.
    pub fn standard() -> Self {
        Self {
            metrics: STANDARD
                .iter()
                .map(|&(name, entry, cutoff)| Metric {
                    name: name.to_owned(),
                    entry,
                    params: MetricParams::at(cutoff),
                })
                .collect(),
        }
    }

    /// Build a set from configuration entries.
    ///
    /// # Errors
    /// Returns a configuration error for an empty set, duplicate names, unknown kinds, a zero
    /// cutoff, or a patience outside (0, 1) or on a metric that does not use it
    pub fn from_config(entries: &[MetricConfig]) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config("No metrics configured".to_owned()));
        }

        let mut seen = HashSet::new();
        let mut metrics = Vec::with_capacity(entries.len());
        for config in entries {
            if !seen.insert(config.name.as_str()) {
                return Err(Error::Config(format!(
                    "Metric `{}` is configured twice",
                    config.name
                )));
            }
            metrics.push(Self::resolve(config)?);
        }

        Ok(Self { metrics })
    }

    fn resolve(config: &MetricConfig) -> Result<Metric> {
        let kind: MetricKind = config.kind().parse()?;

        if config.k == Some(0) {
            return Err(Error::Config(format!(
                "Metric `{}` has cutoff 0; omit `k` to score whole lists",
                config.name
            )));
        }

        let patience = match config.patience {
            Some(_) if !kind.uses_patience() => {
                return Err(Error::Config(format!(
                    "Metric `{}` ({kind}) does not take a patience",
                    config.name
                )));
            }
            Some(value) if !(value > 0.0 && value < 1.0) => {
                return Err(Error::Config(format!(
                    "Metric `{}` patience {value} is outside (0, 1)",
                    config.name
                )));
            }
            Some(value) => value,
            None => PATIENCE,
        };

        Ok(Metric {
            name: config.name.clone(),
            entry: kind.entry(),
            params: MetricParams {
                k: config.k,
                patience,
            },
        })
    }

    /// Metrics in output order.
    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    /// Output names in order.
    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|metric| metric.name.as_str()).collect()
    }

    /// Number of metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the set is empty; never true for a validated set.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_matches_default_config() {
        let configured = MetricSet::from_config(&MetricConfig::defaults()).unwrap();
        let standard = MetricSet::standard();
        assert_eq!(configured.names(), standard.names());
        assert_eq!(
            standard.names(),
            vec!["rbp", "ndcg", "recip_rank", "hit", "hit10", "hit20"]
        );
        for (left, right) in configured.iter().zip(standard.iter()) {
            assert_eq!(left.kind(), right.kind());
            assert_eq!(left.params, right.params);
        }
    }

    #[test]
    fn test_kind_defaults_to_name() {
        let config = MetricConfig {
            name: "recall".to_owned(),
            kind: None,
            k: Some(10),
            patience: None,
        };
        let set = MetricSet::from_config(&[config]).unwrap();
        let metric = set.iter().next().unwrap();
        assert_eq!(metric.kind(), MetricKind::Recall);
        assert_eq!(metric.params.k, Some(10));
    }

    #[test]
    fn test_custom_patience() {
        let mut config = MetricConfig::new("rbp95", "rbp", None);
        config.patience = Some(0.95);
        let set = MetricSet::from_config(&[config]).unwrap();
        assert!((set.iter().next().unwrap().params.patience - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_invalid_entries() {
        let mut bad_patience = MetricConfig::new("rbp", "rbp", Some(10));
        bad_patience.patience = Some(1.0);
        let mut stray_patience = MetricConfig::new("hit", "hit", Some(10));
        stray_patience.patience = Some(0.5);

        let cases = [
            vec![],
            vec![MetricConfig::new("map", "map", Some(10))],
            vec![MetricConfig::new("hit", "hit", Some(0))],
            vec![bad_patience],
            vec![stray_patience],
            vec![
                MetricConfig::new("hit", "hit", Some(10)),
                MetricConfig::new("hit", "hit", Some(20)),
            ],
        ];
        for entries in cases {
            let error = MetricSet::from_config(&entries).unwrap_err();
            assert!(error.is_config(), "{error}");
        }
    }
}
