// crates/ota-harness-aws/src/policy.rs
// ============================================================================
// Module: IoT Policy Manager
// Description: Create, delete, and existence-check named IoT policies.
// Purpose: Direct pass-through over the IoT policy-management API.
// Dependencies: aws-sdk-iot, ota-harness-core
// ============================================================================

//! ## Overview
//! Three operations over the remote policy API: create (fails if the policy
//! already exists), delete (fails if it does not), and an existence check
//! that linearly scans the full policy list returned by the service. The
//! service is the sole authority; nothing is cached locally and no retries
//! are attempted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use aws_sdk_iot::Client;
use ota_harness_core::PolicyError;
use ota_harness_core::PolicyName;
use ota_harness_core::PolicyStore;

// ============================================================================
// SECTION: Policy Manager
// ============================================================================

/// AWS-backed store of named IoT policies.
#[derive(Debug, Clone)]
pub struct IotPolicyManager {
    /// IoT control-plane client.
    client: Client,
}

impl IotPolicyManager {
    /// Creates a policy manager over an existing IoT client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    /// Creates a policy manager for the given region.
    pub async fn connect(region: &str) -> Self {
        let config = crate::load_sdk_config(region).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl PolicyStore for IotPolicyManager {
    async fn create(&self, name: &PolicyName, document: &str) -> Result<(), PolicyError> {
        if self.exists(name).await? {
            return Err(PolicyError::AlreadyExists(name.clone()));
        }
        tracing::info!(policy = %name, "creating policy");
        self.client
            .create_policy()
            .policy_name(name.as_str())
            .policy_document(document)
            .send()
            .await
            .map_err(|err| PolicyError::Api(err.to_string()))?;
        Ok(())
    }

    async fn delete(&self, name: &PolicyName) -> Result<(), PolicyError> {
        if !self.exists(name).await? {
            return Err(PolicyError::NotFound(name.clone()));
        }
        tracing::info!(policy = %name, "deleting policy");
        self.client
            .delete_policy()
            .policy_name(name.as_str())
            .send()
            .await
            .map_err(|err| PolicyError::Api(err.to_string()))?;
        Ok(())
    }

    async fn exists(&self, name: &PolicyName) -> Result<bool, PolicyError> {
        let mut policies = self.client.list_policies().into_paginator().items().send();
        while let Some(policy) = policies.next().await {
            let policy = policy.map_err(|err| PolicyError::Api(err.to_string()))?;
            if policy.policy_name() == Some(name.as_str()) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
