//! Verification artifact (verification.json) for CI consumers.
//!
//! One file per run, overwritten on each write; no history is kept.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::verify::{ConditionStatus, MetricCheck, Verification};

pub const ARTIFACT_SCHEMA_VERSION: &str = "1";

/// Per-condition section of the verification artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionArtifact {
    pub condition: String,
    pub episodes: u64,
    pub status: ConditionStatus,
    pub checks: Vec<MetricCheck>,
}

/// Machine-readable summary of one verification run, written for CI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub input_path: String,
    /// SHA-256 of the bytes that were aggregated.
    pub input_digest: Option<String>,
    pub tolerance: f64,
    pub total_episodes: u64,
    pub overall_pass: bool,
    pub conditions: Vec<ConditionArtifact>,
}

impl VerificationArtifact {
    pub fn from_verification(verification: &Verification, input: &Path) -> Self {
        Self {
            schema_version: ARTIFACT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            input_path: input.display().to_string(),
            input_digest: verification.input_digest.clone(),
            tolerance: verification.tolerance,
            total_episodes: verification.total_episodes(),
            overall_pass: verification.passed(),
            conditions: verification
                .conditions
                .iter()
                .map(|c| ConditionArtifact {
                    condition: c.condition.clone(),
                    episodes: c.episodes,
                    status: c.status,
                    checks: c.checks.clone(),
                })
                .collect(),
        }
    }
}

/// Write the artifact as pretty JSON.
pub fn write_verification_json(path: &Path, artifact: &VerificationArtifact) -> Result<()> {
    let content =
        serde_json::to_string_pretty(artifact).context("serialize verification artifact")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
