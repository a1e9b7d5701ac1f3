//! Reference-table verification.
//!
//! [`verify`] compares computed averages against a reference table and
//! returns a [`Verification`] holding one [`ConditionReport`] per displayed
//! condition. Value failures never abort: every [`Discrepancy`] is collected
//! so the report can list them all.

use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregates;
use crate::metric::{Metric, MetricValues};
use crate::reference::{lookup, ReferenceEntry};

/// Absorbs binary rounding of decimal inputs at the tolerance boundary.
const ROUNDING_SLACK: f64 = 1e-9;

/// Outcome of comparing one metric of one condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricCheck {
    pub metric: Metric,
    pub computed: f64,
    pub expected: f64,
    pub deviation: f64,
    pub passed: bool,
}

/// Compare `computed` against `expected`; passes iff the absolute deviation
/// is at most `tolerance`.
pub fn check_metric(metric: Metric, computed: f64, expected: f64, tolerance: f64) -> MetricCheck {
    let deviation = (computed - expected).abs();
    MetricCheck {
        metric,
        computed,
        expected,
        deviation,
        passed: deviation <= tolerance + ROUNDING_SLACK,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    /// In the reference table and observed; all metrics checked.
    Checked,
    /// In the reference table but no episodes observed.
    Missing,
    /// Observed but not in the reference table; informational only.
    Unchecked,
}

/// Verification outcome for one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionReport {
    pub condition: String,
    pub episodes: u64,
    /// `None` only for [`ConditionStatus::Missing`].
    pub averages: Option<MetricValues>,
    pub status: ConditionStatus,
    /// One entry per metric for checked conditions, empty otherwise.
    pub checks: Vec<MetricCheck>,
}

impl ConditionReport {
    pub fn passed(&self) -> bool {
        match self.status {
            ConditionStatus::Checked => self.checks.iter().all(|c| c.passed),
            ConditionStatus::Missing => false,
            ConditionStatus::Unchecked => true,
        }
    }
}

/// A non-fatal verification failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Discrepancy {
    #[error("{condition}.{metric} = {computed:.3}, expected {expected:.3}")]
    MetricMismatch {
        condition: String,
        metric: Metric,
        computed: f64,
        expected: f64,
        deviation: f64,
    },

    #[error("{condition} has no episodes (expected in reference table)")]
    MissingCondition { condition: String },
}

/// Result of checking all conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// Reference-table order, then unreferenced conditions by name.
    pub conditions: Vec<ConditionReport>,
    pub tolerance: f64,
    /// SHA-256 hex digest of the input bytes that were aggregated, when
    /// verification ran over a file.
    pub input_digest: Option<String>,
}

impl Verification {
    /// True iff every checked pair passed and no reference condition is missing.
    pub fn passed(&self) -> bool {
        self.conditions.iter().all(ConditionReport::passed)
    }

    /// Every discrepancy, in display order.
    pub fn discrepancies(&self) -> Vec<Discrepancy> {
        let mut out = Vec::new();
        for report in &self.conditions {
            if report.status == ConditionStatus::Missing {
                out.push(Discrepancy::MissingCondition {
                    condition: report.condition.clone(),
                });
                continue;
            }
            out.extend(report.checks.iter().filter(|c| !c.passed).map(|c| {
                Discrepancy::MetricMismatch {
                    condition: report.condition.clone(),
                    metric: c.metric,
                    computed: c.computed,
                    expected: c.expected,
                    deviation: c.deviation,
                }
            }));
        }
        out
    }

    pub fn total_episodes(&self) -> u64 {
        self.conditions.iter().map(|c| c.episodes).sum()
    }

    pub fn condition(&self, name: &str) -> Option<&ConditionReport> {
        self.conditions.iter().find(|c| c.condition == name)
    }
}

/// Check `aggregates` against `table` within `tolerance`.
pub fn verify(aggregates: &Aggregates, table: &[ReferenceEntry], tolerance: f64) -> Verification {
    let mut conditions = Vec::with_capacity(table.len() + aggregates.len());

    for entry in table {
        let averaged = aggregates
            .get(entry.condition)
            .and_then(|stat| stat.average().map(|avg| (stat.count, avg)));

        let report = match averaged {
            Some((episodes, avg)) => ConditionReport {
                condition: entry.condition.to_string(),
                episodes,
                averages: Some(avg),
                status: ConditionStatus::Checked,
                checks: Metric::ALL
                    .iter()
                    .map(|m| check_metric(*m, avg[*m], entry.expected[*m], tolerance))
                    .collect(),
            },
            None => {
                tracing::warn!(condition = entry.condition, "reference condition has no episodes");
                ConditionReport {
                    condition: entry.condition.to_string(),
                    episodes: 0,
                    averages: None,
                    status: ConditionStatus::Missing,
                    checks: Vec::new(),
                }
            }
        };
        conditions.push(report);
    }

    for (condition, stat) in aggregates.iter() {
        if lookup(table, condition).is_some() {
            continue;
        }
        tracing::info!(condition, episodes = stat.count, "condition not in reference table");
        conditions.push(ConditionReport {
            condition: condition.to_string(),
            episodes: stat.count,
            averages: stat.average(),
            status: ConditionStatus::Unchecked,
            checks: Vec::new(),
        });
    }

    Verification {
        conditions,
        tolerance,
        input_digest: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::loader::EpisodeRecord;
    use crate::reference::{REFERENCE_TABLE, TOLERANCE};

    fn aggregates_of(rows: &[(&str, [f64; 5], usize)]) -> Aggregates {
        let mut agg = Aggregator::new();
        for (condition, values, n) in rows {
            for _ in 0..*n {
                agg.add(&EpisodeRecord::new(*condition, MetricValues::new(*values)));
            }
        }
        agg.finish()
    }

    fn matching() -> Vec<(&'static str, [f64; 5], usize)> {
        REFERENCE_TABLE
            .iter()
            .map(|e| {
                let v: Vec<f64> = e.expected.iter().map(|(_, v)| v).collect();
                (e.condition, [v[0], v[1], v[2], v[3], v[4]], 3)
            })
            .collect()
    }

    #[test]
    fn tolerance_boundary() {
        let expected = 0.613;
        assert!(check_metric(Metric::TaskSuccess, expected + 0.001, expected, TOLERANCE).passed);
        assert!(check_metric(Metric::TaskSuccess, expected - 0.001, expected, TOLERANCE).passed);
        assert!(!check_metric(Metric::TaskSuccess, expected + 0.0011, expected, TOLERANCE).passed);
        assert!(!check_metric(Metric::TaskSuccess, expected - 0.0011, expected, TOLERANCE).passed);
    }

    #[test]
    fn exact_reference_passes() {
        let v = verify(&aggregates_of(&matching()), &REFERENCE_TABLE, TOLERANCE);
        assert!(v.passed());
        assert!(v.discrepancies().is_empty());
        assert_eq!(v.total_episodes(), 12);
        assert!(v
            .conditions
            .iter()
            .all(|c| c.status == ConditionStatus::Checked && c.checks.len() == 5));
    }

    #[test]
    fn every_mismatch_is_collected() {
        let mut rows = matching();
        rows[0].1[0] = 0.5; // string_glue.task_success
        rows[1].1[3] = 0.9; // json_glue.traceability
        rows[3].1[0] = 0.9; // llm_bk.task_success

        let v = verify(&aggregates_of(&rows), &REFERENCE_TABLE, TOLERANCE);
        assert!(!v.passed());

        let found = v.discrepancies();
        assert_eq!(found.len(), 3);
        assert_eq!(
            found[0].to_string(),
            "string_glue.task_success = 0.500, expected 0.613"
        );
        assert!(matches!(
            &found[2],
            Discrepancy::MetricMismatch { condition, metric: Metric::TaskSuccess, .. } if condition == "llm_bk"
        ));
    }

    #[test]
    fn missing_reference_condition_fails() {
        let rows: Vec<_> = matching()
            .into_iter()
            .filter(|(c, _, _)| *c != "json_glue")
            .collect();
        let v = verify(&aggregates_of(&rows), &REFERENCE_TABLE, TOLERANCE);

        assert!(!v.passed());
        let report = v.condition("json_glue").unwrap();
        assert_eq!(report.status, ConditionStatus::Missing);
        assert_eq!(report.episodes, 0);
        assert!(report.averages.is_none());
        assert_eq!(
            v.discrepancies(),
            vec![Discrepancy::MissingCondition {
                condition: "json_glue".to_string()
            }]
        );
    }

    #[test]
    fn unreferenced_conditions_are_reported_but_not_checked() {
        let mut rows = matching();
        rows.push(("random_policy", [0.1, 0.9, 0.9, 0.0, 0.0], 4));
        rows.push(("baseline", [0.2, 0.2, 0.2, 0.2, 0.2], 1));

        let v = verify(&aggregates_of(&rows), &REFERENCE_TABLE, TOLERANCE);
        assert!(v.passed());
        assert_eq!(v.total_episodes(), 17);

        let names: Vec<&str> = v.conditions.iter().map(|c| c.condition.as_str()).collect();
        assert_eq!(
            names,
            vec!["string_glue", "json_glue", "alethic", "llm_bk", "baseline", "random_policy"]
        );
        let extra = v.condition("random_policy").unwrap();
        assert_eq!(extra.status, ConditionStatus::Unchecked);
        assert!(extra.checks.is_empty());
        assert!(extra.averages.is_some());
    }
}
