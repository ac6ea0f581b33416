// crates/ota-harness-core/src/runtime/case.rs
// ============================================================================
// Module: Test Case Contract
// Description: Case trait, shared context, and verdict types.
// Purpose: Give every case script the same staging and epilogue surface.
// Dependencies: async-trait, thiserror, tracing
// ============================================================================

//! ## Overview
//! A test case is a fixed linear script: stamp a firmware version, build the
//! image, upload it, request signing, create a stream, submit an update
//! descriptor (possibly with one field deliberately missing or invalid), then
//! await the terminal result and compare it against the expected outcome.
//! [`TestContext`] carries the backend seams and provides the staging
//! preamble and the await-then-compare epilogue shared by every script.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::OtaUpdateId;
use crate::core::identifiers::SignerJobId;
use crate::core::identifiers::StreamId;
use crate::core::update::OtaProtocol;
use crate::core::update::OtaSubmission;
use crate::core::update::OtaTerminalStatus;
use crate::core::update::OtaUpdateRequest;
use crate::core::update::OtaUpdateResult;
use crate::core::version::AppVersion;
use crate::interfaces::AgentError;
use crate::interfaces::OtaAgent;
use crate::runtime::project::FirmwareProject;
use crate::runtime::project::ProjectError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while executing a case script.
#[derive(Debug, Error)]
pub enum CaseError {
    /// The OTA agent reported an error.
    #[error(transparent)]
    Agent(#[from] AgentError),
    /// The firmware project reported an error.
    #[error(transparent)]
    Project(#[from] ProjectError),
    /// The harness configuration cannot exercise this case.
    #[error("case precondition failed: {0}")]
    Precondition(String),
}

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Pass/fail verdict for a single case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestVerdict {
    /// The observed outcome matched the expectation.
    Pass,
    /// The observed outcome did not match the expectation.
    Fail,
}

impl fmt::Display for TestVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        };
        f.write_str(label)
    }
}

/// Per-case report produced by a completed script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    /// Case name.
    pub case: String,
    /// Final verdict.
    pub verdict: TestVerdict,
    /// Whether the case expected the device to accept the update.
    pub expected_acceptance: bool,
    /// Terminal result observed from the service.
    pub observed: OtaUpdateResult,
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = if self.expected_acceptance {
            "acceptance"
        } else {
            "rejection"
        };
        write!(
            f,
            "{}: {} (expected {expected}, device {})",
            self.case, self.verdict, self.observed.status
        )?;
        if let Some(detail) = &self.observed.detail {
            write!(f, " - {detail}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Case Settings
// ============================================================================

/// Slice of harness configuration the case scripts need.
#[derive(Debug, Clone)]
pub struct CaseSettings {
    /// Version the device under test currently runs.
    pub base_version: AppVersion,
    /// Destination file name expected by the device.
    pub device_file_name: String,
    /// File index used for stream entries.
    pub file_id: u32,
    /// Delivery protocols offered to the device.
    pub protocols: Vec<OtaProtocol>,
}

// ============================================================================
// SECTION: Staged Firmware
// ============================================================================

/// Artifacts produced by the shared staging preamble.
#[derive(Debug, Clone)]
pub struct StagedFirmware {
    /// Version stamped into the staged image.
    pub version: AppVersion,
    /// Base file name of the uploaded image.
    pub file_name: String,
    /// Signer job that signed the image.
    pub signer_job_id: SignerJobId,
    /// Stream serving the signed image.
    pub stream_id: StreamId,
}

// ============================================================================
// SECTION: Test Context
// ============================================================================

/// Shared context handed to every case script.
pub struct TestContext<'a> {
    /// Backend OTA agent.
    agent: &'a dyn OtaAgent,
    /// Local firmware build tree.
    project: &'a FirmwareProject,
    /// Case-facing configuration slice.
    settings: CaseSettings,
}

impl<'a> TestContext<'a> {
    /// Creates a new case context.
    #[must_use]
    pub const fn new(
        agent: &'a dyn OtaAgent,
        project: &'a FirmwareProject,
        settings: CaseSettings,
    ) -> Self {
        Self {
            agent,
            project,
            settings,
        }
    }

    /// Returns the backend agent.
    #[must_use]
    pub const fn agent(&self) -> &'a dyn OtaAgent {
        self.agent
    }

    /// Returns the case-facing settings.
    #[must_use]
    pub const fn settings(&self) -> &CaseSettings {
        &self.settings
    }

    /// Stamps a version, builds the image, uploads it, signs it, and creates
    /// the serving stream.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] when any staging step fails.
    pub async fn stage_firmware(&self, version: AppVersion) -> Result<StagedFirmware, CaseError> {
        tracing::info!(%version, "staging firmware image");
        self.project.set_application_version(version)?;
        self.project.build()?;
        let file_name = self.project.image_file_name()?;
        let object = self.agent.upload_firmware(self.project.image_path(), &file_name).await?;
        let signer_job_id = self.agent.sign_firmware(&object, &file_name).await?;
        let stream_id = self.agent.create_stream(&signer_job_id).await?;
        Ok(StagedFirmware {
            version,
            file_name,
            signer_job_id,
            stream_id,
        })
    }

    /// Awaits the terminal update result and tears the update down.
    ///
    /// Cleanup failures are logged and otherwise ignored; the observed result
    /// is what matters.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] when result polling fails outright.
    pub async fn await_and_cleanup(
        &self,
        update_id: &OtaUpdateId,
    ) -> Result<OtaUpdateResult, CaseError> {
        let result = self.agent.await_update_result(update_id).await?;
        if let Err(err) = self.agent.cleanup_update(update_id).await {
            tracing::warn!(update = %update_id, error = %err, "update cleanup failed");
        }
        Ok(result)
    }

    /// Builds the report comparing an observed result to the expectation.
    #[must_use]
    pub fn report(
        &self,
        case: &str,
        expected_acceptance: bool,
        observed: OtaUpdateResult,
    ) -> TestReport {
        let accepted = observed.status == OtaTerminalStatus::Accepted;
        let verdict = if accepted == expected_acceptance {
            TestVerdict::Pass
        } else {
            TestVerdict::Fail
        };
        TestReport {
            case: case.to_string(),
            verdict,
            expected_acceptance,
            observed,
        }
    }

    /// Submits a request and runs the epilogue on the outcome.
    ///
    /// A submission the service refuses concludes immediately as an observed
    /// rejection.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] when submission or result polling fails
    /// outright.
    pub async fn submit_and_conclude(
        &self,
        case: &str,
        expected_acceptance: bool,
        request: &OtaUpdateRequest,
    ) -> Result<TestReport, CaseError> {
        match self.agent.create_ota_update(request).await? {
            OtaSubmission::Refused {
                detail,
            } => {
                tracing::info!(case, %detail, "service refused update document");
                Ok(self.report(case, expected_acceptance, OtaUpdateResult {
                    status: OtaTerminalStatus::Rejected,
                    detail: Some(detail),
                }))
            }
            OtaSubmission::Submitted(update_id) => {
                self.conclude(case, expected_acceptance, &update_id).await
            }
        }
    }

    /// Shared epilogue: await the result, clean up, and build the report.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] when result polling fails outright.
    pub async fn conclude(
        &self,
        case: &str,
        expected_acceptance: bool,
        update_id: &OtaUpdateId,
    ) -> Result<TestReport, CaseError> {
        let observed = self.await_and_cleanup(update_id).await?;
        Ok(self.report(case, expected_acceptance, observed))
    }
}

// ============================================================================
// SECTION: Case Trait
// ============================================================================

/// One end-to-end OTA test-case script.
#[async_trait]
pub trait OtaTestCase: Send + Sync {
    /// Stable case name used for selection and reporting.
    fn name(&self) -> &'static str;

    /// One-line human summary of what the case verifies.
    fn summary(&self) -> &'static str;

    /// Whether the device is expected to accept the update.
    fn expects_acceptance(&self) -> bool;

    /// Runs the script to completion and returns the report.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] when a staging or polling step fails before a
    /// verdict can be formed.
    async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError>;
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
    use super::CaseSettings;
    use super::TestContext;
    use super::TestVerdict;
    use crate::core::update::OtaProtocol;
    use crate::core::update::OtaTerminalStatus;
    use crate::core::update::OtaUpdateResult;
    use crate::core::version::AppVersion;
    use crate::runtime::project::FirmwareProject;
    use crate::runtime::testing::ScriptedAgent;

    /// Returns settings used by report tests.
    fn settings() -> CaseSettings {
        CaseSettings {
            base_version: AppVersion::new(0, 9, 0),
            device_file_name: "firmware.bin".to_string(),
            file_id: 0,
            protocols: vec![OtaProtocol::Mqtt],
        }
    }

    #[test]
    fn report_passes_when_rejection_was_expected_and_observed() {
        let agent = ScriptedAgent::rejecting("missing fileName");
        let project =
            FirmwareProject::new("firmware.bin", "version.h", vec!["true".to_string()])
                .expect("project");
        let ctx = TestContext::new(&agent, &project, settings());
        let report = ctx.report(
            "missing-filename",
            false,
            OtaUpdateResult::bare(OtaTerminalStatus::Rejected),
        );
        assert_eq!(report.verdict, TestVerdict::Pass);
    }

    #[test]
    fn report_fails_when_acceptance_was_expected_but_device_rejected() {
        let agent = ScriptedAgent::rejecting("signature mismatch");
        let project =
            FirmwareProject::new("firmware.bin", "version.h", vec!["true".to_string()])
                .expect("project");
        let ctx = TestContext::new(&agent, &project, settings());
        let report = ctx.report(
            "greater-version",
            true,
            OtaUpdateResult::bare(OtaTerminalStatus::Rejected),
        );
        assert_eq!(report.verdict, TestVerdict::Fail);
        let rendered = report.to_string();
        assert!(rendered.contains("greater-version"));
        assert!(rendered.contains("FAIL"));
    }
}
