// crates/ota-harness-cases/src/lower_version.rs
// ============================================================================
// Module: Lower Version Case
// Description: Well-formed update carrying an older version.
// Purpose: Verify the device refuses a downgrade.
// Dependencies: ota-harness-core
// ============================================================================

//! ## Overview
//! Stages an image stamped one build below the version the device runs and
//! submits a fully well-formed update. Downgrades must be rejected. The
//! configured base version must have a nonzero build component; otherwise no
//! older build exists and the case refuses to run rather than submit the
//! running version.

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

/// Negative case: the staged image carries an older version.
pub struct LowerVersion;

#[async_trait]
impl OtaTestCase for LowerVersion {
    fn name(&self) -> &'static str {
        "lower-version"
    }

    fn summary(&self) -> &'static str {
        "device rejects an update downgrading to an older version"
    }

    fn expects_acceptance(&self) -> bool {
        false
    }

    async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
        let settings = ctx.settings();
        let target = settings.base_version.previous_build();
        if target == settings.base_version {
            return Err(CaseError::Precondition(format!(
                "base version {} has no older build to downgrade to",
                settings.base_version
            )));
        }
        let staged = ctx.stage_firmware(target).await?;
        let request = complete_request(settings, &staged);
        ctx.submit_and_conclude(self.name(), self.expects_acceptance(), &request).await
    }
}
