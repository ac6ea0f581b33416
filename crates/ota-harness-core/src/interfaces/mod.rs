// crates/ota-harness-core/src/interfaces/mod.rs
// ============================================================================
// Module: Backend Interfaces
// Description: Trait seams for the policy store and the OTA agent.
// Purpose: Keep case scripts and the runner backend-agnostic and mockable.
// Dependencies: async-trait, thiserror
// ============================================================================

//! ## Overview
//! Two seams separate the harness from the cloud backend: the policy store
//! (create, delete, and existence-check named IoT policies) and the OTA agent
//! (upload, sign, stream, submit, and await an update). Both are thin
//! pass-throughs in production; the traits exist so case scripts can be
//! exercised against a scripted backend in tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::identifiers::OtaUpdateId;
use crate::core::identifiers::PolicyName;
use crate::core::identifiers::SignerJobId;
use crate::core::identifiers::StreamId;
use crate::core::update::FirmwareObject;
use crate::core::update::OtaSubmission;
use crate::core::update::OtaUpdateRequest;
use crate::core::update::OtaUpdateResult;

// ============================================================================
// SECTION: Policy Store
// ============================================================================

/// Policy store errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A policy with the same name already exists.
    #[error("policy already exists: {0}")]
    AlreadyExists(PolicyName),
    /// No policy with the given name exists.
    #[error("policy does not exist: {0}")]
    NotFound(PolicyName),
    /// The remote policy API reported an error.
    #[error("policy api error: {0}")]
    Api(String),
}

/// Remotely authoritative store of named IoT policies.
///
/// Existence is always queried live from the service; implementations must
/// not cache the policy list.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Creates a policy from a serialized permission document.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::AlreadyExists`] when a policy with the same
    /// name exists, or [`PolicyError::Api`] when the remote call fails.
    async fn create(&self, name: &PolicyName, document: &str) -> Result<(), PolicyError>;

    /// Deletes a policy by name.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NotFound`] when no such policy exists, or
    /// [`PolicyError::Api`] when the remote call fails.
    async fn delete(&self, name: &PolicyName) -> Result<(), PolicyError>;

    /// Returns true when a policy with the given name exists.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Api`] when the policy list cannot be fetched.
    async fn exists(&self, name: &PolicyName) -> Result<bool, PolicyError>;
}

// ============================================================================
// SECTION: OTA Agent
// ============================================================================

/// OTA agent errors.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A remote API call failed.
    #[error("ota agent api error: {0}")]
    Api(String),
    /// Local file I/O failed while preparing an upload.
    #[error("ota agent io error: {0}")]
    Io(String),
    /// The code-signing job finished unsuccessfully.
    #[error("signing failed: {0}")]
    SigningFailed(String),
    /// A polled operation did not reach a terminal state in time.
    #[error("timed out waiting for {0}")]
    Timeout(String),
}

/// Orchestration seam over the cloud OTA workflow.
///
/// Every method is a thin sequential wrapper over remote calls; the agent
/// holds no state about updates beyond what the service reports.
#[async_trait]
pub trait OtaAgent: Send + Sync {
    /// Uploads a firmware image to the unsigned-firmware bucket.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the file cannot be read or uploaded.
    async fn upload_firmware(
        &self,
        local_path: &Path,
        object_key: &str,
    ) -> Result<FirmwareObject, AgentError>;

    /// Signs an uploaded image into the signed-firmware bucket.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the signing job cannot be started or ends
    /// unsuccessfully.
    async fn sign_firmware(
        &self,
        object: &FirmwareObject,
        signed_object_name: &str,
    ) -> Result<SignerJobId, AgentError>;

    /// Creates a data stream over the signed image produced by a signer job.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the stream cannot be created.
    async fn create_stream(&self, signer_job_id: &SignerJobId) -> Result<StreamId, AgentError>;

    /// Submits an OTA update request to the jobs service.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the submission call fails for reasons
    /// other than the service refusing the document; a refusal is reported
    /// as [`OtaSubmission::Refused`].
    async fn create_ota_update(
        &self,
        request: &OtaUpdateRequest,
    ) -> Result<OtaSubmission, AgentError>;

    /// Awaits the terminal result of an update for the device under test.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when status polling fails outright.
    async fn await_update_result(
        &self,
        update_id: &OtaUpdateId,
    ) -> Result<OtaUpdateResult, AgentError>;

    /// Tears down the update and its stream after a case completes.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when deletion fails; callers treat this as
    /// best-effort.
    async fn cleanup_update(&self, update_id: &OtaUpdateId) -> Result<(), AgentError>;
}
