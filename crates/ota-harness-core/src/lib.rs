// crates/ota-harness-core/src/lib.rs
// ============================================================================
// Module: OTA Harness Core Library
// Description: Domain model, trait seams, and case runtime for the harness.
// Purpose: Keep test-case scripts free of any AWS SDK surface.
// Dependencies: async-trait, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! `ota-harness-core` defines the domain model for over-the-air update test
//! cases: strongly typed identifiers, the OTA update descriptor submitted to
//! the jobs service, the trait seams behind which the cloud backend lives, and
//! the runtime that executes case scripts and collects verdicts.
//!
//! All cloud behavior is remotely authoritative; nothing in this crate caches
//! or re-validates what the service reports.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::identifiers::OtaUpdateId;
pub use core::identifiers::PolicyName;
pub use core::identifiers::SignerJobId;
pub use core::identifiers::StreamId;
pub use core::identifiers::ThingName;
pub use core::update::DeploymentFile;
pub use core::update::FirmwareObject;
pub use core::update::OtaProtocol;
pub use core::update::OtaSubmission;
pub use core::update::OtaTerminalStatus;
pub use core::update::OtaUpdateRequest;
pub use core::update::OtaUpdateResult;
pub use core::update::StreamRef;
pub use core::version::AppVersion;
pub use interfaces::AgentError;
pub use interfaces::OtaAgent;
pub use interfaces::PolicyError;
pub use interfaces::PolicyStore;
pub use runtime::case::CaseError;
pub use runtime::case::CaseSettings;
pub use runtime::case::OtaTestCase;
pub use runtime::case::StagedFirmware;
pub use runtime::case::TestContext;
pub use runtime::case::TestReport;
pub use runtime::case::TestVerdict;
pub use runtime::project::FirmwareProject;
pub use runtime::project::ProjectError;
pub use runtime::runner::overall_verdict;
pub use runtime::runner::run_cases;
pub use runtime::testing::ScriptedAgent;
