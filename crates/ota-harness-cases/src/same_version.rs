// crates/ota-harness-cases/src/same_version.rs
// ============================================================================
// Module: Same Version Case
// Description: Well-formed update carrying the currently running version.
// Purpose: Verify the device refuses to reinstall its own version.
// Dependencies: ota-harness-core
// ============================================================================

//! ## Overview
//! Stages an image stamped with the version the device already runs and
//! submits a fully well-formed update. Self-update to the same version must
//! be rejected by the device.

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

/// Negative case: the staged image carries the running version.
pub struct SameVersion;

#[async_trait]
impl OtaTestCase for SameVersion {
    fn name(&self) -> &'static str {
        "same-version"
    }

    fn summary(&self) -> &'static str {
        "device rejects an update carrying its currently running version"
    }

    fn expects_acceptance(&self) -> bool {
        false
    }

    async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
        let settings = ctx.settings();
        let staged = ctx.stage_firmware(settings.base_version).await?;
        let request = complete_request(settings, &staged);
        ctx.submit_and_conclude(self.name(), self.expects_acceptance(), &request).await
    }
}
