// crates/ota-harness-cases/src/lib.rs
// ============================================================================
// Module: OTA Harness Case Library
// Description: Built-in end-to-end OTA test-case scripts and their registry.
// Purpose: Resolve case selections fail-closed and expose the script set.
// Dependencies: ota-harness-core, thiserror
// ============================================================================

//! ## Overview
//! Each case in this crate is a fixed linear script that stages a firmware
//! image, submits an OTA update document with a specific field intact,
//! missing, or corrupted, and compares the externally reported terminal
//! result against the expected outcome. Variation between cases is limited
//! to which field is broken and which version is staged.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod back_to_back;
pub mod corrupted_signer_job;
pub mod greater_version;
pub mod lower_version;
pub mod missing_filename;
pub mod missing_stream;
pub mod same_version;
pub(crate) mod support;

// ============================================================================
// SECTION: Imports
// ============================================================================

use ota_harness_core::OtaTestCase;
use thiserror::Error;

pub use back_to_back::BackToBack;
pub use corrupted_signer_job::CorruptedSignerJob;
pub use greater_version::GreaterVersion;
pub use lower_version::LowerVersion;
pub use missing_filename::MissingFilename;
pub use missing_stream::MissingStream;
pub use same_version::SameVersion;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Unknown case selection error.
#[derive(Debug, Error)]
#[error("unknown case: {name}")]
pub struct UnknownCaseError {
    /// Name that matched no registered case.
    pub name: String,
}

/// Returns every built-in case in a stable order.
#[must_use]
pub fn all_cases() -> Vec<Box<dyn OtaTestCase>> {
    vec![
        Box::new(MissingFilename),
        Box::new(MissingStream),
        Box::new(CorruptedSignerJob),
        Box::new(SameVersion),
        Box::new(LowerVersion),
        Box::new(GreaterVersion),
        Box::new(BackToBack),
    ]
}

/// Resolves a case selection; an empty selection means every case.
///
/// # Errors
///
/// Returns [`UnknownCaseError`] when a name matches no registered case.
pub fn select_cases(names: &[String]) -> Result<Vec<Box<dyn OtaTestCase>>, UnknownCaseError> {
    let mut cases = all_cases();
    if names.is_empty() {
        return Ok(cases);
    }
    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let index = cases.iter().position(|case| case.name() == name).ok_or_else(|| {
            UnknownCaseError {
                name: name.clone(),
            }
        })?;
        selected.push(cases.remove(index));
    }
    Ok(selected)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Panic-based assertions are permitted in tests."
)]
mod tests {
    use super::all_cases;
    use super::select_cases;

    #[test]
    fn registry_names_are_unique() {
        let cases = all_cases();
        for (index, case) in cases.iter().enumerate() {
            for other in &cases[index + 1 ..] {
                assert_ne!(case.name(), other.name());
            }
        }
    }

    #[test]
    fn empty_selection_returns_every_case() {
        let cases = select_cases(&[]).expect("select");
        assert_eq!(cases.len(), all_cases().len());
    }

    #[test]
    fn selection_preserves_request_order() {
        let names = vec!["greater-version".to_string(), "missing-filename".to_string()];
        let cases = select_cases(&names).expect("select");
        assert_eq!(cases[0].name(), "greater-version");
        assert_eq!(cases[1].name(), "missing-filename");
    }

    #[test]
    fn unknown_names_are_rejected() {
        let names = vec!["no-such-case".to_string()];
        let error = select_cases(&names).err().expect("unknown case");
        assert_eq!(error.name, "no-such-case");
    }
}
