// crates/ota-harness-aws/src/agent.rs
// ============================================================================
// Module: AWS OTA Agent
// Description: Upload, sign, stream, submit, and await an OTA update.
// Purpose: Sequential pass-through over the S3, Signer, and IoT jobs APIs.
// Dependencies: aws-sdk-iot, aws-sdk-s3, aws-sdk-signer, tokio
// ============================================================================

//! ## Overview
//! The agent drives the cloud side of one update: put the image into the
//! versioned unsigned bucket, sign it into the signed bucket, create a data
//! stream over the signed object, submit the update document, and poll the
//! jobs service until the device under test reports a terminal status. The
//! service performs all validation; the agent merely relays documents and
//! observes verdicts. The only waiting is interval polling bounded by the
//! configured deadline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::time::Duration;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use aws_sdk_iot::types::CodeSigning;
use aws_sdk_iot::types::FileLocation;
use aws_sdk_iot::types::JobExecutionStatus;
use aws_sdk_iot::types::OtaUpdateFile;
use aws_sdk_iot::types::OtaUpdateStatus;
use aws_sdk_iot::types::Protocol;
use aws_sdk_iot::types::S3Location;
use aws_sdk_iot::types::Stream;
use aws_sdk_iot::types::StreamFile;
use aws_sdk_iot::types::TargetSelection;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_signer::types::Destination;
use aws_sdk_signer::types::S3Destination;
use aws_sdk_signer::types::S3Source;
use aws_sdk_signer::types::SigningMaterial;
use aws_sdk_signer::types::SigningStatus;
use aws_sdk_signer::types::Source;
use ota_harness_config::HarnessConfig;
use ota_harness_core::AgentError;
use ota_harness_core::DeploymentFile;
use ota_harness_core::FirmwareObject;
use ota_harness_core::OtaAgent;
use ota_harness_core::OtaProtocol;
use ota_harness_core::OtaSubmission;
use ota_harness_core::OtaTerminalStatus;
use ota_harness_core::OtaUpdateId;
use ota_harness_core::OtaUpdateRequest;
use ota_harness_core::OtaUpdateResult;
use ota_harness_core::SignerJobId;
use ota_harness_core::StreamId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File index used for the single entry of a created stream.
const STREAM_FILE_ID: i32 = 0;

// ============================================================================
// SECTION: Agent
// ============================================================================

/// AWS-backed OTA agent.
pub struct AwsOtaAgent {
    /// IoT control-plane client.
    iot: aws_sdk_iot::Client,
    /// S3 client for firmware uploads.
    s3: aws_sdk_s3::Client,
    /// Code-signing client.
    signer: aws_sdk_signer::Client,
    /// Validated harness configuration.
    config: HarnessConfig,
}

impl AwsOtaAgent {
    /// Creates an agent for the configured region.
    pub async fn connect(config: HarnessConfig) -> Self {
        let shared = crate::load_sdk_config(&config.aws.region).await;
        Self {
            iot: aws_sdk_iot::Client::new(&shared),
            s3: aws_sdk_s3::Client::new(&shared),
            signer: aws_sdk_signer::Client::new(&shared),
            config,
        }
    }

    /// Returns the polling interval.
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.timing.poll_interval_ms)
    }

    /// Returns the completion deadline measured from now.
    fn deadline(&self) -> Instant {
        Instant::now() + Duration::from_millis(self.config.timing.completion_timeout_ms)
    }

    /// Ensures the configured signing profile exists.
    async fn ensure_signing_profile(&self) -> Result<(), AgentError> {
        let material = SigningMaterial::builder()
            .certificate_arn(&self.config.signer.certificate_arn)
            .build()
            .map_err(|err| AgentError::Api(err.to_string()))?;
        self.signer
            .put_signing_profile()
            .profile_name(&self.config.signer.profile_name)
            .signing_material(material)
            .platform_id(&self.config.signer.platform_id)
            .send()
            .await
            .map_err(|err| AgentError::Api(err.to_string()))?;
        Ok(())
    }

    /// Polls a signing job until it reaches a terminal status.
    async fn await_signing_job(&self, job_id: &str) -> Result<(), AgentError> {
        let deadline = self.deadline();
        loop {
            let job = self
                .signer
                .describe_signing_job()
                .job_id(job_id)
                .send()
                .await
                .map_err(|err| AgentError::Api(err.to_string()))?;
            match job.status() {
                Some(SigningStatus::Succeeded) => return Ok(()),
                Some(SigningStatus::Failed) => {
                    let reason = job.status_reason().unwrap_or("signing job failed");
                    return Err(AgentError::SigningFailed(reason.to_string()));
                }
                _ => {}
            }
            if Instant::now() >= deadline {
                return Err(AgentError::Timeout(format!("signing job {job_id}")));
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }

    /// Resolves the signed object location produced by a signer job.
    async fn signed_object_location(
        &self,
        signer_job_id: &SignerJobId,
    ) -> Result<(String, String), AgentError> {
        let job = self
            .signer
            .describe_signing_job()
            .job_id(signer_job_id.as_str())
            .send()
            .await
            .map_err(|err| AgentError::Api(err.to_string()))?;
        let object = job
            .signed_object()
            .and_then(|signed| signed.s3())
            .ok_or_else(|| {
                AgentError::Api(format!("signer job {signer_job_id} has no signed object"))
            })?;
        let bucket = object
            .bucket_name()
            .ok_or_else(|| AgentError::Api("signed object has no bucket".to_string()))?;
        let key = object
            .key()
            .ok_or_else(|| AgentError::Api("signed object has no key".to_string()))?;
        Ok((bucket.to_string(), key.to_string()))
    }

    /// Resolves the ARN of the device under test.
    async fn thing_arn(&self) -> Result<String, AgentError> {
        let thing = self
            .iot
            .describe_thing()
            .thing_name(&self.config.iot.thing_name)
            .send()
            .await
            .map_err(|err| AgentError::Api(err.to_string()))?;
        thing
            .thing_arn()
            .map(ToString::to_string)
            .ok_or_else(|| AgentError::Api("thing has no ARN".to_string()))
    }

    /// Polls the update until creation settles; returns the IoT job id.
    async fn await_update_creation(
        &self,
        update_id: &OtaUpdateId,
        deadline: Instant,
    ) -> Result<Result<String, OtaUpdateResult>, AgentError> {
        loop {
            let update = self
                .iot
                .get_ota_update()
                .ota_update_id(update_id.as_str())
                .send()
                .await
                .map_err(|err| AgentError::Api(err.to_string()))?;
            let info = update
                .ota_update_info()
                .ok_or_else(|| AgentError::Api("update has no info".to_string()))?;
            match info.ota_update_status() {
                Some(OtaUpdateStatus::CreateComplete) => {
                    let job_id = info
                        .aws_iot_job_id()
                        .ok_or_else(|| AgentError::Api("update has no job id".to_string()))?;
                    return Ok(Ok(job_id.to_string()));
                }
                Some(OtaUpdateStatus::CreateFailed) => {
                    let detail = info
                        .error_info()
                        .and_then(|error| error.message())
                        .unwrap_or("update creation failed")
                        .to_string();
                    return Ok(Err(OtaUpdateResult {
                        status: OtaTerminalStatus::Rejected,
                        detail: Some(detail),
                    }));
                }
                _ => {}
            }
            if Instant::now() >= deadline {
                return Ok(Err(OtaUpdateResult::bare(OtaTerminalStatus::TimedOut)));
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }

    /// Polls the device job execution until a terminal status or deadline.
    async fn await_job_execution(
        &self,
        job_id: &str,
        deadline: Instant,
    ) -> Result<OtaUpdateResult, AgentError> {
        loop {
            let execution = self
                .iot
                .describe_job_execution()
                .job_id(job_id)
                .thing_name(&self.config.iot.thing_name)
                .send()
                .await
                .map_err(|err| AgentError::Api(err.to_string()))?;
            let status = execution.execution().and_then(|exec| exec.status());
            if let Some(status) = status
                && let Some(terminal) = terminal_status(status)
            {
                return Ok(OtaUpdateResult::bare(terminal));
            }
            if Instant::now() >= deadline {
                return Ok(OtaUpdateResult::bare(OtaTerminalStatus::TimedOut));
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }
}

#[async_trait]
impl OtaAgent for AwsOtaAgent {
    async fn upload_firmware(
        &self,
        local_path: &Path,
        object_key: &str,
    ) -> Result<FirmwareObject, AgentError> {
        tracing::info!(key = object_key, "uploading firmware image");
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|err| AgentError::Io(err.to_string()))?;
        let output = self
            .s3
            .put_object()
            .bucket(&self.config.s3.unsigned_bucket)
            .key(object_key)
            .body(body)
            .send()
            .await
            .map_err(|err| AgentError::Api(err.to_string()))?;
        let version_id = output.version_id().ok_or_else(|| {
            AgentError::Api("unsigned bucket must have versioning enabled".to_string())
        })?;
        Ok(FirmwareObject {
            key: object_key.to_string(),
            version_id: version_id.to_string(),
        })
    }

    async fn sign_firmware(
        &self,
        object: &FirmwareObject,
        signed_object_name: &str,
    ) -> Result<SignerJobId, AgentError> {
        tracing::info!(key = object.key, "starting signing job");
        self.ensure_signing_profile().await?;
        let source = S3Source::builder()
            .bucket_name(&self.config.s3.unsigned_bucket)
            .key(&object.key)
            .version(&object.version_id)
            .build()
            .map_err(|err| AgentError::Api(err.to_string()))?;
        let prefix =
            signed_prefix(&self.config.signer.signed_object_prefix, signed_object_name);
        let destination = S3Destination::builder()
            .bucket_name(&self.config.s3.signed_bucket)
            .prefix(prefix)
            .build();
        let job = self
            .signer
            .start_signing_job()
            .source(Source::builder().s3(source).build())
            .destination(Destination::builder().s3(destination).build())
            .profile_name(&self.config.signer.profile_name)
            .client_request_token(unique_suffix())
            .send()
            .await
            .map_err(|err| AgentError::Api(err.to_string()))?;
        let job_id = job
            .job_id()
            .ok_or_else(|| AgentError::Api("signing job has no id".to_string()))?
            .to_string();
        self.await_signing_job(&job_id).await?;
        Ok(SignerJobId::new(job_id))
    }

    async fn create_stream(&self, signer_job_id: &SignerJobId) -> Result<StreamId, AgentError> {
        let (bucket, key) = self.signed_object_location(signer_job_id).await?;
        let stream_id = format!("{}-{}", self.config.iot.stream_prefix, unique_suffix());
        tracing::info!(stream = stream_id, %bucket, %key, "creating stream");
        let file = StreamFile::builder()
            .file_id(STREAM_FILE_ID)
            .s3_location(S3Location::builder().bucket(bucket).key(key).build())
            .build();
        let output = self
            .iot
            .create_stream()
            .stream_id(&stream_id)
            .files(file)
            .role_arn(&self.config.iot.role_arn)
            .send()
            .await
            .map_err(|err| AgentError::Api(err.to_string()))?;
        let created = output
            .stream_id()
            .ok_or_else(|| AgentError::Api("stream has no id".to_string()))?;
        Ok(StreamId::new(created))
    }

    async fn create_ota_update(
        &self,
        request: &OtaUpdateRequest,
    ) -> Result<OtaSubmission, AgentError> {
        let target = self.thing_arn().await?;
        let update_id = format!("{}-{}", self.config.iot.update_prefix, unique_suffix());
        tracing::info!(update = update_id, "submitting ota update");
        let mut call = self
            .iot
            .create_ota_update()
            .ota_update_id(&update_id)
            .target_selection(TargetSelection::Snapshot)
            .targets(target)
            .role_arn(&self.config.iot.role_arn);
        for protocol in &request.protocols {
            call = call.protocols(to_sdk_protocol(*protocol));
        }
        for file in &request.files {
            call = call.files(to_sdk_file(file)?);
        }
        match call.send().await {
            Ok(_) => Ok(OtaSubmission::Submitted(OtaUpdateId::new(update_id))),
            Err(err) => err.as_service_error().map_or_else(
                || Err(AgentError::Api(err.to_string())),
                |service_err| {
                    Ok(OtaSubmission::Refused {
                        detail: service_err.to_string(),
                    })
                },
            ),
        }
    }

    async fn await_update_result(
        &self,
        update_id: &OtaUpdateId,
    ) -> Result<OtaUpdateResult, AgentError> {
        let deadline = self.deadline();
        let job_id = match self.await_update_creation(update_id, deadline).await? {
            Ok(job_id) => job_id,
            Err(result) => return Ok(result),
        };
        tracing::info!(update = %update_id, job = job_id, "awaiting device verdict");
        self.await_job_execution(&job_id, deadline).await
    }

    async fn cleanup_update(&self, update_id: &OtaUpdateId) -> Result<(), AgentError> {
        tracing::info!(update = %update_id, "deleting ota update");
        self.iot
            .delete_ota_update()
            .ota_update_id(update_id.as_str())
            .delete_stream(true)
            .force_delete_aws_job(true)
            .send()
            .await
            .map_err(|err| AgentError::Api(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a unique identifier suffix from the wall clock.
fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    format!("{nanos}")
}

/// Builds the destination key prefix for a signed object.
///
/// The configured prefix is prepended so the signed object name always
/// appears in the destination key.
fn signed_prefix(configured: &str, signed_object_name: &str) -> String {
    format!("{configured}{signed_object_name}-")
}

/// Converts a delivery protocol to its SDK form.
const fn to_sdk_protocol(protocol: OtaProtocol) -> Protocol {
    match protocol {
        OtaProtocol::Mqtt => Protocol::Mqtt,
        OtaProtocol::Http => Protocol::Http,
    }
}

/// Converts a deployment file entry to its SDK form.
///
/// Fields a case deliberately omitted stay unset on the wire.
fn to_sdk_file(file: &DeploymentFile) -> Result<OtaUpdateFile, AgentError> {
    let mut builder = OtaUpdateFile::builder();
    if let Some(name) = &file.file_name {
        builder = builder.file_name(name);
    }
    if let Some(version) = &file.file_version {
        builder = builder.file_version(version);
    }
    if let Some(location) = &file.location {
        let file_id = i32::try_from(location.file_id)
            .map_err(|_| AgentError::Api("stream file id out of range".to_string()))?;
        let stream = Stream::builder()
            .stream_id(location.stream_id.as_str())
            .file_id(file_id)
            .build();
        builder = builder.file_location(FileLocation::builder().stream(stream).build());
    }
    if let Some(signer_job_id) = &file.signer_job_id {
        builder = builder
            .code_signing(CodeSigning::builder().aws_signer_job_id(signer_job_id.as_str()).build());
    }
    Ok(builder.build())
}

/// Maps a job-execution status to a terminal outcome, when terminal.
const fn terminal_status(status: &JobExecutionStatus) -> Option<OtaTerminalStatus> {
    match status {
        JobExecutionStatus::Succeeded => Some(OtaTerminalStatus::Accepted),
        JobExecutionStatus::Rejected => Some(OtaTerminalStatus::Rejected),
        JobExecutionStatus::Failed | JobExecutionStatus::Canceled | JobExecutionStatus::Removed => {
            Some(OtaTerminalStatus::Failed)
        }
        JobExecutionStatus::TimedOut => Some(OtaTerminalStatus::TimedOut),
        _ => None,
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
    use aws_sdk_iot::types::JobExecutionStatus;
    use ota_harness_core::DeploymentFile;
    use ota_harness_core::OtaTerminalStatus;
    use ota_harness_core::SignerJobId;
    use ota_harness_core::StreamId;
    use ota_harness_core::StreamRef;

    use super::signed_prefix;
    use super::terminal_status;
    use super::to_sdk_file;

    #[test]
    fn signed_prefix_always_carries_the_object_name() {
        assert_eq!(signed_prefix("", "firmware.bin"), "firmware.bin-");
        assert_eq!(signed_prefix("signed/", "firmware.bin"), "signed/firmware.bin-");
    }

    #[test]
    fn terminal_mapping_covers_the_documented_statuses() {
        assert_eq!(
            terminal_status(&JobExecutionStatus::Succeeded),
            Some(OtaTerminalStatus::Accepted)
        );
        assert_eq!(
            terminal_status(&JobExecutionStatus::Rejected),
            Some(OtaTerminalStatus::Rejected)
        );
        assert_eq!(terminal_status(&JobExecutionStatus::Failed), Some(OtaTerminalStatus::Failed));
        assert_eq!(
            terminal_status(&JobExecutionStatus::TimedOut),
            Some(OtaTerminalStatus::TimedOut)
        );
        assert_eq!(terminal_status(&JobExecutionStatus::InProgress), None);
        assert_eq!(terminal_status(&JobExecutionStatus::Queued), None);
    }

    #[test]
    fn omitted_file_name_stays_unset_in_the_sdk_form() {
        let entry = DeploymentFile {
            file_name: None,
            file_version: Some("1".to_string()),
            location: Some(StreamRef {
                stream_id: StreamId::new("stream-1"),
                file_id: 0,
            }),
            signer_job_id: Some(SignerJobId::new("job-1")),
        };
        let sdk = to_sdk_file(&entry).expect("convert");
        assert!(sdk.file_name().is_none());
        assert_eq!(sdk.file_version(), Some("1"));
        assert!(sdk.file_location().is_some());
        assert!(sdk.code_signing().is_some());
    }

    #[test]
    fn complete_entry_maps_every_field() {
        let entry = DeploymentFile::complete(
            "firmware.bin",
            "2",
            StreamRef {
                stream_id: StreamId::new("stream-2"),
                file_id: 0,
            },
            SignerJobId::new("job-2"),
        );
        let sdk = to_sdk_file(&entry).expect("convert");
        assert_eq!(sdk.file_name(), Some("firmware.bin"));
        let location = sdk.file_location().and_then(|loc| loc.stream());
        assert_eq!(location.and_then(|stream| stream.stream_id()), Some("stream-2"));
        let signer = sdk.code_signing().and_then(|cs| cs.aws_signer_job_id());
        assert_eq!(signer, Some("job-2"));
    }
}
