// crates/ota-harness-core/src/core/update.rs
// ============================================================================
// Module: OTA Update Descriptor
// Description: Deployment-files descriptor and terminal result types.
// Purpose: Model the update job document locally so cases can corrupt fields.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An OTA update is described by a list of deployment files, each naming a
//! file version, a source location (a previously created data stream plus a
//! file index), and a code-signing job reference. Every field a case may
//! deliberately omit is optional here; omitted fields stay omitted on the
//! wire. No invariants are enforced locally — the remote jobs service is the
//! sole validator, and the harness only observes its verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::SignerJobId;
use crate::core::identifiers::StreamId;

// ============================================================================
// SECTION: Update Descriptor
// ============================================================================

/// Delivery protocol for an OTA update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OtaProtocol {
    /// Stream file blocks over MQTT.
    Mqtt,
    /// Serve file blocks over HTTP.
    Http,
}

impl OtaProtocol {
    /// Returns the stable wire label for the protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mqtt => "MQTT",
            Self::Http => "HTTP",
        }
    }
}

/// Reference to a data stream entry serving the update image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRef {
    /// Stream identifier created ahead of the update.
    pub stream_id: StreamId,
    /// Index of the file within the stream.
    pub file_id: u32,
}

/// One deployment file entry within an update descriptor.
///
/// All fields are optional so that negative cases can submit documents with a
/// specific field missing. A well-formed entry populates every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentFile {
    /// Destination file name on the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// File version string carried in the job document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_version: Option<String>,
    /// Source location for the image bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<StreamRef>,
    /// Code-signing job whose signature the device must verify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_job_id: Option<SignerJobId>,
}

impl DeploymentFile {
    /// Returns a fully populated entry for a well-formed update.
    #[must_use]
    pub fn complete(
        file_name: impl Into<String>,
        file_version: impl Into<String>,
        location: StreamRef,
        signer_job_id: SignerJobId,
    ) -> Self {
        Self {
            file_name: Some(file_name.into()),
            file_version: Some(file_version.into()),
            location: Some(location),
            signer_job_id: Some(signer_job_id),
        }
    }
}

/// OTA update request submitted to the jobs service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtaUpdateRequest {
    /// Delivery protocols offered to the device.
    pub protocols: Vec<OtaProtocol>,
    /// Deployment file entries.
    pub files: Vec<DeploymentFile>,
}

// ============================================================================
// SECTION: Firmware Object
// ============================================================================

/// Handle to an uploaded, not yet signed firmware object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareObject {
    /// Object key within the unsigned-firmware bucket.
    pub key: String,
    /// Object version id assigned by the versioned bucket.
    pub version_id: String,
}

// ============================================================================
// SECTION: Submission Outcome
// ============================================================================

/// Outcome of submitting an update request to the jobs service.
///
/// Several negative cases submit documents the service refuses outright
/// instead of handing them to the device; that refusal is an observed
/// rejection, not a harness failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtaSubmission {
    /// The service accepted the document and created an update.
    Submitted(crate::core::identifiers::OtaUpdateId),
    /// The service refused the document at submission time.
    Refused {
        /// Service-reported refusal detail.
        detail: String,
    },
}

// ============================================================================
// SECTION: Terminal Results
// ============================================================================

/// Terminal outcome of an OTA update as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtaTerminalStatus {
    /// The device accepted and applied the update.
    Accepted,
    /// The device or the service rejected the update document.
    Rejected,
    /// The update failed after being accepted for processing.
    Failed,
    /// No terminal status was reported before the harness deadline.
    TimedOut,
}

impl fmt::Display for OtaTerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
            Self::TimedOut => "timed out",
        };
        f.write_str(label)
    }
}

/// Terminal result of an OTA update with service-reported detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtaUpdateResult {
    /// Terminal status observed for the device under test.
    pub status: OtaTerminalStatus,
    /// Detail text reported by the service, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl OtaUpdateResult {
    /// Returns a result with no detail text.
    #[must_use]
    pub const fn bare(status: OtaTerminalStatus) -> Self {
        Self {
            status,
            detail: None,
        }
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
    use super::DeploymentFile;
    use super::OtaProtocol;
    use super::OtaUpdateRequest;
    use super::StreamRef;
    use crate::core::identifiers::SignerJobId;
    use crate::core::identifiers::StreamId;

    #[test]
    fn omitted_fields_are_absent_from_the_wire_form() {
        let entry = DeploymentFile {
            file_version: Some("1".to_string()),
            location: Some(StreamRef {
                stream_id: StreamId::new("stream-1"),
                file_id: 0,
            }),
            signer_job_id: Some(SignerJobId::new("job-1")),
            ..DeploymentFile::default()
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        let object = json.as_object().expect("object");
        assert!(!object.contains_key("file_name"));
        assert_eq!(object["file_version"], "1");
    }

    #[test]
    fn complete_entry_populates_every_field() {
        let entry = DeploymentFile::complete(
            "firmware.bin",
            "2",
            StreamRef {
                stream_id: StreamId::new("stream-2"),
                file_id: 0,
            },
            SignerJobId::new("job-2"),
        );
        assert!(entry.file_name.is_some());
        assert!(entry.file_version.is_some());
        assert!(entry.location.is_some());
        assert!(entry.signer_job_id.is_some());
    }

    #[test]
    fn protocols_carry_stable_labels() {
        let request = OtaUpdateRequest {
            protocols: vec![OtaProtocol::Mqtt, OtaProtocol::Http],
            files: Vec::new(),
        };
        let labels: Vec<&str> = request.protocols.iter().map(|p| p.as_str()).collect();
        assert_eq!(labels, vec!["MQTT", "HTTP"]);
    }
}
