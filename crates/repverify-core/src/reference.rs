//! Published reference values (Table 3: 1,200 episodes, 4 agents x 6 tasks x 50 seeds).

use crate::metric::MetricValues;

/// Maximum absolute deviation for a metric to count as reproduced.
pub const TOLERANCE: f64 = 0.001;

/// Expected per-metric averages for one condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceEntry {
    pub condition: &'static str,
    /// task_success, unsafe_action, unsupported_belief, traceability, failure_transparency
    pub expected: MetricValues,
}

/// Reference table in display order.
pub static REFERENCE_TABLE: [ReferenceEntry; 4] = [
    ReferenceEntry {
        condition: "string_glue",
        expected: MetricValues::new([0.613, 0.387, 0.260, 0.100, 0.100]),
    },
    ReferenceEntry {
        condition: "json_glue",
        expected: MetricValues::new([0.570, 0.430, 0.310, 0.300, 0.300]),
    },
    ReferenceEntry {
        condition: "alethic",
        expected: MetricValues::new([1.000, 0.000, 0.000, 1.000, 1.000]),
    },
    ReferenceEntry {
        condition: "llm_bk",
        expected: MetricValues::new([0.990, 0.000, 0.000, 1.000, 1.000]),
    },
];

/// Find the entry for `condition` in `table`.
pub fn lookup<'a>(table: &'a [ReferenceEntry], condition: &str) -> Option<&'a ReferenceEntry> {
    table.iter().find(|e| e.condition == condition)
}
