//! repverify core library
//!
//! Aggregates per-episode agent results and checks the per-condition averages
//! against the published reference table.

pub mod aggregate;
pub mod artifact;
pub mod error;
pub mod loader;
pub mod metric;
pub mod obs;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod telemetry;
pub mod verify;

pub use aggregate::{aggregate, AggregateStat, Aggregates, Aggregator};
pub use artifact::{write_verification_json, ConditionArtifact, VerificationArtifact};
pub use error::{LoadError, RecordParseError, Result};
pub use loader::{open_records, parse_record, EpisodeRecord, RecordReader};
pub use metric::{Metric, MetricValues};
pub use obs::RunSpan;
pub use pipeline::verify_results;
pub use reference::{lookup, ReferenceEntry, REFERENCE_TABLE, TOLERANCE};
pub use report::{render, RenderedReport, FAIL_MESSAGE, PASS_MESSAGE};
pub use telemetry::init_tracing;
pub use verify::{
    check_metric, verify, ConditionReport, ConditionStatus, Discrepancy, MetricCheck,
    Verification,
};

/// repverify version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
