//! End-to-end load, aggregate and verify pass over one results file.

use std::path::Path;

use crate::aggregate::aggregate;
use crate::error::Result;
use crate::loader::open_records;
use crate::obs;
use crate::reference::{REFERENCE_TABLE, TOLERANCE};
use crate::verify::{verify, Verification};

/// Load `input`, aggregate it and check it against the reference table.
///
/// Any load error aborts before verification; value mismatches are carried
/// in the returned [`Verification`].
pub fn verify_results(input: &Path) -> Result<Verification> {
    obs::emit_load_started(input);
    let mut records = open_records(input)?;
    let aggregates = aggregate(&mut records)?;
    obs::emit_load_finished(aggregates.total_episodes(), aggregates.len());

    let mut verification = verify(&aggregates, &REFERENCE_TABLE, TOLERANCE);
    verification.input_digest = Some(records.digest());
    obs::emit_verify_finished(verification.passed(), verification.discrepancies().len());
    Ok(verification)
}
