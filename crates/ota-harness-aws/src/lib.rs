// crates/ota-harness-aws/src/lib.rs
// ============================================================================
// Module: OTA Harness AWS Library
// Description: AWS-backed policy store and OTA agent implementations.
// Purpose: Thin pass-through wrappers over the IoT, S3, and Signer APIs.
// Dependencies: aws-config, aws-sdk-iot, aws-sdk-s3, aws-sdk-signer
// ============================================================================

//! ## Overview
//! `ota-harness-aws` implements the core trait seams against the real cloud
//! backend: [`IotPolicyManager`] for named IoT policies and [`AwsOtaAgent`]
//! for the upload, sign, stream, submit, and await workflow. Every method is
//! a sequential wrapper over remote calls; all validation and state tracking
//! stays with the service.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod agent;
pub mod policy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use agent::AwsOtaAgent;
pub use policy::IotPolicyManager;

// ============================================================================
// SECTION: Shared Client Loading
// ============================================================================

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::SdkConfig;

/// Loads the shared AWS configuration for the given region.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
