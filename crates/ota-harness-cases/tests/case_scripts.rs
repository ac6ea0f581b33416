// crates/ota-harness-cases/tests/case_scripts.rs
// ============================================================================
// Module: Case Script Tests
// Description: Payload and verdict coverage for the built-in case scripts.
// Purpose: Pin down exactly which field each script breaks.
// Dependencies: ota-harness-cases, ota-harness-core, tempfile, tokio
// ============================================================================

//! ## Overview
//! Runs each script against a scripted in-memory agent and asserts the exact
//! shape of the submitted update document plus the verdict formed from the
//! scripted device outcome.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Panic-based assertions are permitted in tests."
)]

use std::fs;

use ota_harness_cases::BackToBack;
use ota_harness_cases::CorruptedSignerJob;
use ota_harness_cases::GreaterVersion;
use ota_harness_cases::LowerVersion;
use ota_harness_cases::MissingFilename;
use ota_harness_cases::MissingStream;
use ota_harness_cases::SameVersion;
use ota_harness_core::AppVersion;
use ota_harness_core::CaseError;
use ota_harness_core::CaseSettings;
use ota_harness_core::FirmwareProject;
use ota_harness_core::OtaProtocol;
use ota_harness_core::OtaTerminalStatus;
use ota_harness_core::OtaTestCase;
use ota_harness_core::ScriptedAgent;
use ota_harness_core::TestContext;
use ota_harness_core::TestVerdict;
use tempfile::TempDir;

/// Version header fixture stamped by the staging preamble.
const HEADER: &str = "#define APP_VERSION_MAJOR    0\n\
                      #define APP_VERSION_MINOR    9\n\
                      #define APP_VERSION_BUILD    1\n";

/// Creates a firmware project over a fresh build tree.
fn project() -> (TempDir, FirmwareProject) {
    let dir = tempfile::tempdir().expect("tempdir");
    let header_path = dir.path().join("app_version.h");
    fs::write(&header_path, HEADER).expect("write header");
    let project = FirmwareProject::new(
        dir.path().join("firmware.bin"),
        header_path,
        vec!["true".to_string()],
    )
    .expect("project");
    (dir, project)
}

/// Returns the settings shared by every script test.
fn settings() -> CaseSettings {
    CaseSettings {
        base_version: AppVersion::new(0, 9, 1),
        device_file_name: "firmware.bin".to_string(),
        file_id: 0,
        protocols: vec![OtaProtocol::Mqtt, OtaProtocol::Http],
    }
}

#[tokio::test]
async fn missing_filename_omits_only_the_file_name() {
    let agent = ScriptedAgent::rejecting("no file name");
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = MissingFilename.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Pass);
    let requests = agent.submitted_requests();
    assert_eq!(requests.len(), 1);
    let file = &requests[0].files[0];
    assert!(file.file_name.is_none());
    assert_eq!(file.file_version.as_deref(), Some("0.9.2"));
    assert!(file.location.is_some());
    assert!(file.signer_job_id.is_some());
}

#[tokio::test]
async fn missing_stream_omits_only_the_location() {
    let agent = ScriptedAgent::rejecting("no stream");
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = MissingStream.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Pass);
    let requests = agent.submitted_requests();
    let file = &requests[0].files[0];
    assert!(file.location.is_none());
    assert_eq!(file.file_name.as_deref(), Some("firmware.bin"));
    assert!(file.file_version.is_some());
    assert!(file.signer_job_id.is_some());
}

#[tokio::test]
async fn corrupted_signer_job_references_a_job_that_signed_nothing() {
    let agent = ScriptedAgent::rejecting("signature mismatch");
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = CorruptedSignerJob.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Pass);
    let submitted_job = agent.submitted_requests()[0].files[0]
        .signer_job_id
        .clone()
        .expect("signer job present");
    let staged_jobs = agent.stream_sources();
    assert!(!staged_jobs.contains(&submitted_job));
}

#[tokio::test]
async fn greater_version_submits_the_next_build_and_passes_on_acceptance() {
    let agent = ScriptedAgent::accepting();
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = GreaterVersion.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Pass);
    assert_eq!(report.observed.status, OtaTerminalStatus::Accepted);
    let file = &agent.submitted_requests()[0].files[0];
    assert_eq!(file.file_version.as_deref(), Some("0.9.2"));
    assert_eq!(agent.cleaned_up().len(), 1);
}

#[tokio::test]
async fn same_version_fails_when_the_device_wrongly_accepts() {
    let agent = ScriptedAgent::accepting();
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = SameVersion.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Fail);
    let file = &agent.submitted_requests()[0].files[0];
    assert_eq!(file.file_version.as_deref(), Some("0.9.1"));
}

#[tokio::test]
async fn lower_version_refuses_a_base_version_without_an_older_build() {
    let agent = ScriptedAgent::accepting();
    let (_dir, project) = project();
    let mut settings = settings();
    settings.base_version = AppVersion::new(0, 9, 0);
    let ctx = TestContext::new(&agent, &project, settings);
    let error = LowerVersion.run(&ctx).await.expect_err("no older build exists");
    assert!(matches!(error, CaseError::Precondition(_)));
    assert!(agent.uploaded_keys().is_empty());
    assert!(agent.submitted_requests().is_empty());
}

#[tokio::test]
async fn lower_version_submits_the_previous_build() {
    let agent = ScriptedAgent::rejecting("downgrade refused");
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = LowerVersion.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Pass);
    let file = &agent.submitted_requests()[0].files[0];
    assert_eq!(file.file_version.as_deref(), Some("0.9.0"));
}

#[tokio::test]
async fn back_to_back_stages_and_cleans_up_two_updates() {
    let agent = ScriptedAgent::accepting();
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = BackToBack.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Pass);
    let requests = agent.submitted_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].files[0].file_version.as_deref(), Some("0.9.2"));
    assert_eq!(requests[1].files[0].file_version.as_deref(), Some("0.9.3"));
    assert_eq!(agent.cleaned_up().len(), 2);
    assert_eq!(agent.uploaded_keys().len(), 2);
}

#[tokio::test]
async fn back_to_back_stops_after_a_failed_first_update() {
    let agent = ScriptedAgent::rejecting("device refused");
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = BackToBack.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Fail);
    assert_eq!(agent.submitted_requests().len(), 1);
}

#[tokio::test]
async fn service_refusal_counts_as_an_observed_rejection() {
    let agent = ScriptedAgent::refusing("InvalidRequestException: fileName required");
    let (_dir, project) = project();
    let ctx = TestContext::new(&agent, &project, settings());
    let report = MissingFilename.run(&ctx).await.expect("run");
    assert_eq!(report.verdict, TestVerdict::Pass);
    assert_eq!(report.observed.status, OtaTerminalStatus::Rejected);
    assert!(report.observed.detail.as_deref().is_some_and(|detail| {
        detail.contains("fileName required")
    }));
    assert!(agent.cleaned_up().is_empty());
}
