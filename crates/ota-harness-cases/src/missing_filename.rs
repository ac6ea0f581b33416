// crates/ota-harness-cases/src/missing_filename.rs
// ============================================================================
// Module: Missing Filename Case
// Description: Update document without the required file name.
// Purpose: Verify the device rejects a job document missing `fileName`.
// Dependencies: ota-harness-core
// ============================================================================

//! ## Overview
//! Stages a fresh image end to end, then submits an update whose single
//! deployment file omits the required file name. The device under test must
//! reject the update.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use ota_harness_core::CaseError;
use ota_harness_core::OtaTestCase;
use ota_harness_core::TestContext;
use ota_harness_core::TestReport;

use crate::support::complete_request;

// ============================================================================
// SECTION: Case
// ============================================================================

/// Negative case: the deployment file omits the required file name.
pub struct MissingFilename;

#[async_trait]
impl OtaTestCase for MissingFilename {
    fn name(&self) -> &'static str {
        "missing-filename"
    }

    fn summary(&self) -> &'static str {
        "device rejects an update whose job document omits the file name"
    }

    fn expects_acceptance(&self) -> bool {
        false
    }

    async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
        let settings = ctx.settings();
        let staged = ctx.stage_firmware(settings.base_version.next_build()).await?;
        let mut request = complete_request(settings, &staged);
        request.files[0].file_name = None;
        ctx.submit_and_conclude(self.name(), self.expects_acceptance(), &request).await
    }
}
