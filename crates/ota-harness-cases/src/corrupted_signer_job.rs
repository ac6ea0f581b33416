// crates/ota-harness-cases/src/corrupted_signer_job.rs
// ============================================================================
// Module: Corrupted Signer Job Case
// Description: Update document referencing the wrong code-signing job.
// Purpose: Verify signature verification fails for a mismatched reference.
// Dependencies: ota-harness-core
// ============================================================================

//! ## Overview
//! Stages a fresh image end to end, then submits an update whose code-signing
//! reference names a signer job that never signed the streamed image. The
//! device must fail signature verification and reject the update.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use ota_harness_core::CaseError;
use ota_harness_core::OtaTestCase;
use ota_harness_core::SignerJobId;
use ota_harness_core::TestContext;
use ota_harness_core::TestReport;

use crate::support::complete_request;

// ============================================================================
// SECTION: Case
// ============================================================================

/// Negative case: the code-signing reference does not match the image.
pub struct CorruptedSignerJob;

#[async_trait]
impl OtaTestCase for CorruptedSignerJob {
    fn name(&self) -> &'static str {
        "corrupted-signer-job"
    }

    fn summary(&self) -> &'static str {
        "device rejects an update whose signer job reference is mismatched"
    }

    fn expects_acceptance(&self) -> bool {
        false
    }

    async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
        let settings = ctx.settings();
        let staged = ctx.stage_firmware(settings.base_version.next_build()).await?;
        let mut request = complete_request(settings, &staged);
        let corrupted = format!("{}-mismatched", staged.signer_job_id);
        request.files[0].signer_job_id = Some(SignerJobId::new(corrupted));
        ctx.submit_and_conclude(self.name(), self.expects_acceptance(), &request).await
    }
}
