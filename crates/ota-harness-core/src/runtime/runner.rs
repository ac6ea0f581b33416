// crates/ota-harness-core/src/runtime/runner.rs
// ============================================================================
// Module: Case Runner
// Description: Sequential execution of selected case scripts.
// Purpose: Run cases one at a time and aggregate their reports.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! Cases run strictly one after another, blocking on remote calls; nothing is
//! shared between them. A script that errors before reaching a verdict is
//! reported as a failed case carrying the harness error text, so one broken
//! case never aborts the remainder of the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::update::OtaTerminalStatus;
use crate::core::update::OtaUpdateResult;
use crate::runtime::case::OtaTestCase;
use crate::runtime::case::TestContext;
use crate::runtime::case::TestReport;
use crate::runtime::case::TestVerdict;

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs the given cases sequentially and collects one report per case.
pub async fn run_cases(
    cases: &[&dyn OtaTestCase],
    ctx: &TestContext<'_>,
) -> Vec<TestReport> {
    let mut reports = Vec::with_capacity(cases.len());
    for case in cases {
        tracing::info!(case = case.name(), "running case");
        let report = match case.run(ctx).await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(case = case.name(), error = %err, "case aborted");
                TestReport {
                    case: case.name().to_string(),
                    verdict: TestVerdict::Fail,
                    expected_acceptance: case.expects_acceptance(),
                    observed: OtaUpdateResult {
                        status: OtaTerminalStatus::Failed,
                        detail: Some(format!("harness error: {err}")),
                    },
                }
            }
        };
        tracing::info!(case = case.name(), verdict = %report.verdict, "case finished");
        reports.push(report);
    }
    reports
}

/// Returns the overall verdict for a set of reports.
#[must_use]
pub fn overall_verdict(reports: &[TestReport]) -> TestVerdict {
    if reports.iter().all(|report| report.verdict == TestVerdict::Pass) {
        TestVerdict::Pass
    } else {
        TestVerdict::Fail
    }
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
    use async_trait::async_trait;

    use super::overall_verdict;
    use super::run_cases;
    use crate::core::update::OtaProtocol;
    use crate::core::version::AppVersion;
    use crate::interfaces::AgentError;
    use crate::runtime::case::CaseError;
    use crate::runtime::case::CaseSettings;
    use crate::runtime::case::OtaTestCase;
    use crate::runtime::case::TestContext;
    use crate::runtime::case::TestReport;
    use crate::runtime::case::TestVerdict;
    use crate::runtime::project::FirmwareProject;
    use crate::runtime::testing::ScriptedAgent;

    /// Case that always reports a pass without touching the backend.
    struct PassingCase;

    #[async_trait]
    impl OtaTestCase for PassingCase {
        fn name(&self) -> &'static str {
            "passing"
        }

        fn summary(&self) -> &'static str {
            "always passes"
        }

        fn expects_acceptance(&self) -> bool {
            true
        }

        async fn run(&self, ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
            Ok(ctx.report(
                self.name(),
                true,
                crate::core::update::OtaUpdateResult::bare(
                    crate::core::update::OtaTerminalStatus::Accepted,
                ),
            ))
        }
    }

    /// Case that aborts with a harness error before reaching a verdict.
    struct AbortingCase;

    #[async_trait]
    impl OtaTestCase for AbortingCase {
        fn name(&self) -> &'static str {
            "aborting"
        }

        fn summary(&self) -> &'static str {
            "always aborts"
        }

        fn expects_acceptance(&self) -> bool {
            false
        }

        async fn run(&self, _ctx: &TestContext<'_>) -> Result<TestReport, CaseError> {
            Err(CaseError::Agent(AgentError::Api("stream quota exceeded".to_string())))
        }
    }

    /// Returns settings shared by runner tests.
    fn settings() -> CaseSettings {
        CaseSettings {
            base_version: AppVersion::new(0, 9, 0),
            device_file_name: "firmware.bin".to_string(),
            file_id: 0,
            protocols: vec![OtaProtocol::Mqtt],
        }
    }

    #[tokio::test]
    async fn aborted_cases_fail_without_stopping_the_run() {
        let agent = ScriptedAgent::accepting();
        let project =
            FirmwareProject::new("firmware.bin", "version.h", vec!["true".to_string()])
                .expect("project");
        let ctx = TestContext::new(&agent, &project, settings());
        let cases: Vec<&dyn OtaTestCase> = vec![&AbortingCase, &PassingCase];
        let reports = run_cases(&cases, &ctx).await;
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].verdict, TestVerdict::Fail);
        let detail = reports[0].observed.detail.as_deref().unwrap_or_default();
        assert!(detail.contains("stream quota exceeded"));
        assert_eq!(reports[1].verdict, TestVerdict::Pass);
        assert_eq!(overall_verdict(&reports), TestVerdict::Fail);
    }

    #[tokio::test]
    async fn all_passing_reports_yield_an_overall_pass() {
        let agent = ScriptedAgent::accepting();
        let project =
            FirmwareProject::new("firmware.bin", "version.h", vec!["true".to_string()])
                .expect("project");
        let ctx = TestContext::new(&agent, &project, settings());
        let cases: Vec<&dyn OtaTestCase> = vec![&PassingCase];
        let reports = run_cases(&cases, &ctx).await;
        assert_eq!(overall_verdict(&reports), TestVerdict::Pass);
    }
}
