// crates/ota-harness-core/src/runtime/testing.rs
// ============================================================================
// Module: Scripted Agent
// Description: In-memory OTA agent with a scripted terminal result.
// Purpose: Exercise case scripts and the runner without a cloud backend.
// Dependencies: async-trait
// ============================================================================

//! ## Overview
//! [`ScriptedAgent`] records every call a case script makes and answers with
//! canned identifiers plus a scripted terminal result. Tests use the recorded
//! calls to assert that a script emits exactly the documented request payload
//! (for example, that the missing-filename case omits only the file name).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;

use crate::core::identifiers::OtaUpdateId;
use crate::core::identifiers::SignerJobId;
use crate::core::identifiers::StreamId;
use crate::core::update::FirmwareObject;
use crate::core::update::OtaSubmission;
use crate::core::update::OtaTerminalStatus;
use crate::core::update::OtaUpdateRequest;
use crate::core::update::OtaUpdateResult;
use crate::interfaces::AgentError;
use crate::interfaces::OtaAgent;

// ============================================================================
// SECTION: Scripted Agent
// ============================================================================

/// Recording OTA agent with a fixed scripted result.
#[derive(Debug)]
pub struct ScriptedAgent {
    /// Terminal result returned for every awaited update.
    result: OtaUpdateResult,
    /// Refusal detail returned at submission time, when scripted.
    refusal: Option<String>,
    /// Object keys passed to uploads, in call order.
    uploads: Mutex<Vec<String>>,
    /// Signed object names passed to signing, in call order.
    sign_requests: Mutex<Vec<String>>,
    /// Signer jobs passed to stream creation, in call order.
    stream_sources: Mutex<Vec<SignerJobId>>,
    /// Update requests submitted, in call order.
    requests: Mutex<Vec<OtaUpdateRequest>>,
    /// Updates cleaned up, in call order.
    cleanups: Mutex<Vec<OtaUpdateId>>,
    /// Monotonic counter for generated identifiers.
    sequence: AtomicU64,
}

impl ScriptedAgent {
    /// Returns an agent whose updates conclude with the given result.
    #[must_use]
    pub fn with_result(result: OtaUpdateResult) -> Self {
        Self {
            result,
            refusal: None,
            uploads: Mutex::new(Vec::new()),
            sign_requests: Mutex::new(Vec::new()),
            stream_sources: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            cleanups: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns an agent whose device accepts every update.
    #[must_use]
    pub fn accepting() -> Self {
        Self::with_result(OtaUpdateResult::bare(OtaTerminalStatus::Accepted))
    }

    /// Returns an agent whose device rejects every update.
    #[must_use]
    pub fn rejecting(detail: &str) -> Self {
        Self::with_result(OtaUpdateResult {
            status: OtaTerminalStatus::Rejected,
            detail: Some(detail.to_string()),
        })
    }

    /// Returns an agent whose service refuses every submission.
    #[must_use]
    pub fn refusing(detail: &str) -> Self {
        let mut agent = Self::accepting();
        agent.refusal = Some(detail.to_string());
        agent
    }

    /// Returns the object keys uploaded so far.
    #[must_use]
    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the signed object names requested so far.
    #[must_use]
    pub fn signed_names(&self) -> Vec<String> {
        self.sign_requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the signer jobs streams were created from.
    #[must_use]
    pub fn stream_sources(&self) -> Vec<SignerJobId> {
        self.stream_sources.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the update requests submitted so far.
    #[must_use]
    pub fn submitted_requests(&self) -> Vec<OtaUpdateRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the updates cleaned up so far.
    #[must_use]
    pub fn cleaned_up(&self) -> Vec<OtaUpdateId> {
        self.cleanups.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the next value of the identifier counter.
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl OtaAgent for ScriptedAgent {
    async fn upload_firmware(
        &self,
        _local_path: &Path,
        object_key: &str,
    ) -> Result<FirmwareObject, AgentError> {
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(object_key.to_string());
        Ok(FirmwareObject {
            key: object_key.to_string(),
            version_id: format!("version-{}", self.next_sequence()),
        })
    }

    async fn sign_firmware(
        &self,
        _object: &FirmwareObject,
        signed_object_name: &str,
    ) -> Result<SignerJobId, AgentError> {
        self.sign_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signed_object_name.to_string());
        Ok(SignerJobId::new(format!("signer-job-{}", self.next_sequence())))
    }

    async fn create_stream(&self, signer_job_id: &SignerJobId) -> Result<StreamId, AgentError> {
        self.stream_sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signer_job_id.clone());
        Ok(StreamId::new(format!("stream-{}", self.next_sequence())))
    }

    async fn create_ota_update(
        &self,
        request: &OtaUpdateRequest,
    ) -> Result<OtaSubmission, AgentError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());
        if let Some(detail) = &self.refusal {
            return Ok(OtaSubmission::Refused {
                detail: detail.clone(),
            });
        }
        Ok(OtaSubmission::Submitted(OtaUpdateId::new(format!(
            "update-{}",
            self.next_sequence()
        ))))
    }

    async fn await_update_result(
        &self,
        _update_id: &OtaUpdateId,
    ) -> Result<OtaUpdateResult, AgentError> {
        Ok(self.result.clone())
    }

    async fn cleanup_update(&self, update_id: &OtaUpdateId) -> Result<(), AgentError> {
        self.cleanups.lock().unwrap_or_else(PoisonError::into_inner).push(update_id.clone());
        Ok(())
    }
}
