// crates/ota-harness-cases/src/greater_version.rs
// ============================================================================
// Module: Greater Version Case
// Description: Well-formed update carrying a newer version.
// Purpose: Verify the happy path: the device accepts a proper upgrade.
// Dependencies: ota-harness-core
// ============================================================================

//! ## Overview
//! Stages an image stamped one build above the version the device runs and
//! submits a fully well-formed update. The device must accept and apply it.

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

/// Positive case: a well-formed upgrade to a newer version.
pub struct GreaterVersion;

#[async_trait]
impl OtaTestCase for GreaterVersion {
    fn name(&self) -> &'static str {
        "greater-version"
    }

    fn summary(&self) -> &'static str {
        "device accepts a well-formed update to a newer version"
    }

    fn expects_acceptance(&self) -> bool {
        true
    }

    async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
        let settings = ctx.settings();
        let staged = ctx.stage_firmware(settings.base_version.next_build()).await?;
        let request = complete_request(settings, &staged);
        ctx.submit_and_conclude(self.name(), self.expects_acceptance(), &request).await
    }
}
