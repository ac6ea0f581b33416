// crates/ota-harness-cases/src/back_to_back.rs
// ============================================================================
// Module: Back To Back Case
// Description: Two complete updates applied in direct succession.
// Purpose: Verify the device accepts a second upgrade right after the first.
// Dependencies: ota-harness-core
// ============================================================================

//! ## Overview
//! Runs the full stage-and-submit sequence twice with increasing versions.
//! Both updates must be accepted; the case fails on whichever update the
//! device refuses first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use ota_harness_core::CaseError;
use ota_harness_core::OtaTestCase;
use ota_harness_core::TestContext;
use ota_harness_core::TestReport;
use ota_harness_core::TestVerdict;

use crate::support::complete_request;

// ============================================================================
// SECTION: Case
// ============================================================================

/// Positive case: two consecutive well-formed upgrades.
pub struct BackToBack;

#[async_trait]
impl OtaTestCase for BackToBack {
    fn name(&self) -> &'static str {
        "back-to-back"
    }

    fn summary(&self) -> &'static str {
        "device accepts two well-formed updates in direct succession"
    }

    fn expects_acceptance(&self) -> bool {
        true
    }

    async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
        let settings = ctx.settings();
        let first_version = settings.base_version.next_build();
        let staged = ctx.stage_firmware(first_version).await?;
        let request = complete_request(settings, &staged);
        let first =
            ctx.submit_and_conclude(self.name(), self.expects_acceptance(), &request).await?;
        if first.verdict == TestVerdict::Fail {
            return Ok(first);
        }
        let staged = ctx.stage_firmware(first_version.next_build()).await?;
        let request = complete_request(settings, &staged);
        ctx.submit_and_conclude(self.name(), self.expects_acceptance(), &request).await
    }
}
