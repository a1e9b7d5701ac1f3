//! Per-condition accumulation of episode metrics.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::loader::EpisodeRecord;
use crate::metric::MetricValues;

/// Running sums and episode count for one condition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStat {
    pub sums: MetricValues,
    pub count: u64,
}

impl AggregateStat {
    fn add(&mut self, metrics: &MetricValues) {
        self.sums.accumulate(metrics);
        self.count += 1;
    }

    /// Mean of each metric, or `None` if no episodes were recorded.
    pub fn average(&self) -> Option<MetricValues> {
        if self.count == 0 {
            return None;
        }
        Some(self.sums.divided_by(self.count as f64))
    }
}

/// Stats for every observed condition, keyed by condition name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    stats: BTreeMap<String, AggregateStat>,
}

impl Aggregates {
    pub fn get(&self, condition: &str) -> Option<&AggregateStat> {
        self.stats.get(condition)
    }

    /// Conditions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateStat)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Episodes across all conditions.
    pub fn total_episodes(&self) -> u64 {
        self.stats.values().map(|s| s.count).sum()
    }
}

/// Single-pass accumulator.
#[derive(Debug, Default)]
pub struct Aggregator {
    stats: BTreeMap<String, AggregateStat>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: &EpisodeRecord) {
        self.stats
            .entry(record.condition.clone())
            .or_default()
            .add(&record.metrics);
    }

    pub fn finish(self) -> Aggregates {
        Aggregates { stats: self.stats }
    }
}

/// Consume `records` once, stopping at the first load error.
pub fn aggregate<I>(records: I) -> Result<Aggregates>
where
    I: IntoIterator<Item = Result<EpisodeRecord>>,
{
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.add(&record?);
    }
    let aggregates = aggregator.finish();
    tracing::debug!(
        conditions = aggregates.len(),
        episodes = aggregates.total_episodes(),
        "aggregation complete"
    );
    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::metric::Metric;

    fn rec(condition: &str, values: [f64; 5]) -> EpisodeRecord {
        EpisodeRecord::new(condition, MetricValues::new(values))
    }

    fn sample() -> Vec<EpisodeRecord> {
        vec![
            rec("string_glue", [1.0, 0.0, 0.0, 0.0, 0.0]),
            rec("json_glue", [0.0, 1.0, 1.0, 1.0, 0.0]),
            rec("string_glue", [0.0, 1.0, 1.0, 0.0, 1.0]),
            rec("alethic", [1.0, 0.0, 0.0, 1.0, 1.0]),
            rec("string_glue", [1.0, 1.0, 0.0, 0.0, 0.0]),
            rec("json_glue", [1.0, 0.0, 0.1, 0.3, 0.7]),
            rec("alethic", [1.0, 0.0, 0.0, 1.0, 1.0]),
        ]
    }

    fn averages(records: &[EpisodeRecord]) -> Aggregates {
        aggregate(records.iter().cloned().map(Ok)).unwrap()
    }

    #[test]
    fn constant_values_average_exactly() {
        for n in [1usize, 2, 7, 50] {
            let records: Vec<_> = (0..n)
                .map(|_| rec("llm_bk", [0.99, 0.0, 0.0, 1.0, 1.0]))
                .collect();
            let agg = averages(&records);
            let stat = agg.get("llm_bk").unwrap();
            assert_eq!(stat.count, n as u64);
            let avg = stat.average().unwrap();
            assert_eq!(avg[Metric::Traceability], 1.0);
            assert_eq!(avg[Metric::UnsafeAction], 0.0);
        }
    }

    #[test]
    fn counts_and_averages_per_condition() {
        let agg = averages(&sample());
        assert_eq!(agg.len(), 3);
        assert_eq!(agg.total_episodes(), 7);

        let sg = agg.get("string_glue").unwrap();
        assert_eq!(sg.count, 3);
        let avg = sg.average().unwrap();
        assert!((avg[Metric::TaskSuccess] - 2.0 / 3.0).abs() < 1e-12);
        assert!((avg[Metric::UnsafeAction] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn order_does_not_change_averages() {
        let base = averages(&sample());

        let mut reversed = sample();
        reversed.reverse();
        let mut rotated = sample();
        rotated.rotate_left(3);
        let mut interleaved = sample();
        interleaved.swap(0, 5);
        interleaved.swap(2, 6);

        for permuted in [reversed, rotated, interleaved] {
            let agg = averages(&permuted);
            for (condition, stat) in base.iter() {
                let other = agg.get(condition).unwrap();
                assert_eq!(stat.count, other.count);
                let (a, b) = (stat.average().unwrap(), other.average().unwrap());
                for m in Metric::ALL {
                    assert!((a[m] - b[m]).abs() < 1e-12, "{condition}.{m}");
                }
            }
        }
    }

    #[test]
    fn zero_count_has_no_average() {
        assert!(AggregateStat::default().average().is_none());
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        let agg = averages(&sample());
        let names: Vec<&str> = agg.iter().map(|(c, _)| c).collect();
        assert_eq!(names, vec!["alethic", "json_glue", "string_glue"]);
    }

    #[test]
    fn load_error_aborts_aggregation() {
        let records = vec![
            Ok(rec("alethic", [1.0, 0.0, 0.0, 1.0, 1.0])),
            Err(LoadError::SchemaViolation {
                line: 2,
                reason: "missing field `agent`".to_string(),
            }),
            Ok(rec("alethic", [1.0, 0.0, 0.0, 1.0, 1.0])),
        ];
        assert!(matches!(
            aggregate(records),
            Err(LoadError::SchemaViolation { line: 2, .. })
        ));
    }
}
