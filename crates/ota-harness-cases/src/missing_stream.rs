// crates/ota-harness-cases/src/missing_stream.rs
// ============================================================================
// Module: Missing Stream Case
// Description: Update document without a file location.
// Purpose: Verify rejection of a job document with no source stream.
// Dependencies: ota-harness-core
// ============================================================================

//! ## Overview
//! Stages a fresh image end to end, then submits an update whose deployment
//! file names no source location at all. With nowhere to fetch blocks from,
//! the update must be rejected.

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

/// Negative case: the deployment file omits the stream location.
pub struct MissingStream;

#[async_trait]
impl OtaTestCase for MissingStream {
    fn name(&self) -> &'static str {
        "missing-stream"
    }

    fn summary(&self) -> &'static str {
        "device rejects an update whose job document omits the file location"
    }

    fn expects_acceptance(&self) -> bool {
        false
    }

    async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
        let settings = ctx.settings();
        let staged = ctx.stage_firmware(settings.base_version.next_build()).await?;
        let mut request = complete_request(settings, &staged);
        request.files[0].location = None;
        ctx.submit_and_conclude(self.name(), self.expects_acceptance(), &request).await
    }
}
