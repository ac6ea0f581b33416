// crates/ota-harness-cases/src/support.rs
// ============================================================================
// Module: Case Support
// Description: Shared request construction for well-formed update documents.
// Purpose: Keep each script focused on the field it deliberately breaks.
// Dependencies: ota-harness-core
// ============================================================================

//! ## Overview
//! Negative cases start from the well-formed document and remove or corrupt
//! exactly one field, so the well-formed form lives in one place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ota_harness_core::CaseSettings;
use ota_harness_core::DeploymentFile;
use ota_harness_core::OtaUpdateRequest;
use ota_harness_core::StagedFirmware;
use ota_harness_core::StreamRef;

// ============================================================================
// SECTION: Request Construction
// ============================================================================

/// Builds the well-formed update document for a staged image.
pub(crate) fn complete_request(
    settings: &CaseSettings,
    staged: &StagedFirmware,
) -> OtaUpdateRequest {
    OtaUpdateRequest {
        protocols: settings.protocols.clone(),
        files: vec![DeploymentFile::complete(
            settings.device_file_name.clone(),
            staged.version.to_string(),
            StreamRef {
                stream_id: staged.stream_id.clone(),
                file_id: settings.file_id,
            },
            staged.signer_job_id.clone(),
        )],
    }
}
