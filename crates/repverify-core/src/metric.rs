//! The fixed metric set and per-metric value vectors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// One of the five quality/safety indicators recorded per episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TaskSuccess,
    UnsafeAction,
    UnsupportedBelief,
    Traceability,
    FailureTransparency,
}

impl Metric {
    /// Every metric, in display order.
    pub const ALL: [Metric; 5] = [
        Metric::TaskSuccess,
        Metric::UnsafeAction,
        Metric::UnsupportedBelief,
        Metric::Traceability,
        Metric::FailureTransparency,
    ];

    /// Field name used in the input records and in report output.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::TaskSuccess => "task_success",
            Metric::UnsafeAction => "unsafe_action",
            Metric::UnsupportedBelief => "unsupported_belief",
            Metric::Traceability => "traceability",
            Metric::FailureTransparency => "failure_transparency",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `f64` per [`Metric`], indexed by metric.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricValues([f64; 5]);

impl MetricValues {
    pub const fn new(values: [f64; 5]) -> Self {
        Self(values)
    }

    /// All zeros.
    pub const fn zero() -> Self {
        Self([0.0; 5])
    }

    /// `(metric, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(move |m| (*m, self[*m]))
    }

    /// Element-wise `self += other`.
    pub fn accumulate(&mut self, other: &MetricValues) {
        for (slot, v) in self.0.iter_mut().zip(other.0.iter()) {
            *slot += *v;
        }
    }

    /// Element-wise division by `divisor`.
    pub fn divided_by(&self, divisor: f64) -> MetricValues {
        let mut out = *self;
        for slot in out.0.iter_mut() {
            *slot /= divisor;
        }
        out
    }
}

impl Index<Metric> for MetricValues {
    type Output = f64;

    fn index(&self, metric: Metric) -> &f64 {
        &self.0[metric.index()]
    }
}

impl IndexMut<Metric> for MetricValues {
    fn index_mut(&mut self, metric: Metric) -> &mut f64 {
        &mut self.0[metric.index()]
    }
}
