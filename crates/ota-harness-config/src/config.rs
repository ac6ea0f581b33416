// crates/ota-harness-config/src/config.rs
// ============================================================================
// Module: OTA Harness Configuration
// Description: Configuration loading and validation for the OTA harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: ota-harness-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every identifier the harness later hands to the cloud backend (buckets,
//! ARNs, prefixes, the thing name) is validated here so case scripts never
//! run against a partially configured account.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ota_harness_core::AppVersion;
use ota_harness_core::OtaProtocol;
use ota_harness_core::ThingName;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "ota-harness.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "OTA_HARNESS_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum S3 bucket name length.
pub(crate) const MAX_BUCKET_NAME_LENGTH: usize = 63;
/// Maximum length accepted for ARNs and prefixes.
pub(crate) const MAX_IDENTIFIER_LENGTH: usize = 2048;
/// Maximum number of build command elements.
pub(crate) const MAX_BUILD_COMMAND_LENGTH: usize = 64;
/// Minimum allowed poll interval in milliseconds.
pub(crate) const MIN_POLL_INTERVAL_MS: u64 = 1_000;
/// Maximum allowed poll interval in milliseconds.
pub(crate) const MAX_POLL_INTERVAL_MS: u64 = 60_000;
/// Default poll interval in milliseconds.
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
/// Minimum allowed completion timeout in milliseconds.
pub(crate) const MIN_COMPLETION_TIMEOUT_MS: u64 = 10_000;
/// Maximum allowed completion timeout in milliseconds.
pub(crate) const MAX_COMPLETION_TIMEOUT_MS: u64 = 3_600_000;
/// Default completion timeout in milliseconds.
pub(crate) const DEFAULT_COMPLETION_TIMEOUT_MS: u64 = 900_000;
/// Default stream identifier prefix.
const DEFAULT_STREAM_PREFIX: &str = "ota-e2e-stream";
/// Default OTA update identifier prefix.
const DEFAULT_UPDATE_PREFIX: &str = "ota-e2e-update";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// OTA harness configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// AWS account and region settings.
    pub aws: AwsSection,
    /// S3 bucket settings for unsigned and signed firmware.
    pub s3: S3Section,
    /// Code-signing settings.
    pub signer: SignerSection,
    /// IoT jobs and streaming settings.
    pub iot: IotSection,
    /// Local firmware project settings.
    pub firmware: FirmwareSection,
    /// Polling and deadline settings.
    #[serde(default)]
    pub timing: TimingSection,
}

/// AWS account and region settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsSection {
    /// Region hosting the IoT, S3, and signing resources.
    pub region: String,
}

/// S3 bucket settings.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Section {
    /// Versioned bucket receiving unsigned firmware uploads.
    pub unsigned_bucket: String,
    /// Bucket receiving signed firmware objects.
    pub signed_bucket: String,
}

/// Code-signing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SignerSection {
    /// Signing profile name, created idempotently on first use.
    pub profile_name: String,
    /// ARN of the signing certificate imported into the account.
    pub certificate_arn: String,
    /// Signing platform identifier for the device hardware.
    pub platform_id: String,
    /// Key prefix for signed objects in the signed bucket.
    #[serde(default)]
    pub signed_object_prefix: String,
}

/// IoT jobs and streaming settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IotSection {
    /// Thing name of the device under test.
    pub thing_name: String,
    /// Service role ARN granted to OTA updates and streams.
    pub role_arn: String,
    /// Prefix for generated stream identifiers.
    #[serde(default = "default_stream_prefix")]
    pub stream_prefix: String,
    /// Prefix for generated OTA update identifiers.
    #[serde(default = "default_update_prefix")]
    pub update_prefix: String,
    /// Delivery protocols offered to the device.
    #[serde(default = "default_protocols")]
    pub protocols: Vec<OtaProtocol>,
}

/// Local firmware project settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FirmwareSection {
    /// Path of the built firmware image.
    pub image_path: PathBuf,
    /// Path of the version header stamped before each build.
    pub version_header: PathBuf,
    /// Build command as program plus arguments.
    pub build_command: Vec<String>,
    /// Destination file name expected by the device.
    pub device_file_name: String,
    /// Version the device under test currently runs.
    pub base_version: AppVersion,
}

/// Polling and deadline settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingSection {
    /// Interval between status polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Deadline for a single update to reach a terminal state, milliseconds.
    #[serde(default = "default_completion_timeout_ms")]
    pub completion_timeout_ms: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            completion_timeout_ms: DEFAULT_COMPLETION_TIMEOUT_MS,
        }
    }
}

// ============================================================================
// SECTION: Serde Defaults
// ============================================================================

/// Returns the default stream identifier prefix.
fn default_stream_prefix() -> String {
    DEFAULT_STREAM_PREFIX.to_string()
}

/// Returns the default OTA update identifier prefix.
fn default_update_prefix() -> String {
    DEFAULT_UPDATE_PREFIX.to_string()
}

/// Returns the default delivery protocols.
fn default_protocols() -> Vec<OtaProtocol> {
    vec![OtaProtocol::Mqtt]
}

/// Returns the default poll interval in milliseconds.
const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Returns the default completion timeout in milliseconds.
const fn default_completion_timeout_ms() -> u64 {
    DEFAULT_COMPLETION_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl HarnessConfig {
    /// Loads and validates configuration from the given or default path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let text = read_config_text(path)?;
        Self::from_toml(&text)
    }

    /// Loads only the AWS region from the given or default path.
    ///
    /// Policy management needs nothing beyond the region, so the remaining
    /// sections may be absent or incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or
    /// when the region is missing or empty.
    pub fn load_region(path: Option<&Path>) -> Result<String, ConfigError> {
        let text = read_config_text(path)?;
        let config: RegionConfig =
            toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        require_nonempty("aws.region", &config.aws.region)?;
        Ok(config.aws.region)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        if text.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the thing name of the device under test.
    #[must_use]
    pub fn thing_name(&self) -> ThingName {
        ThingName::new(self.iot.thing_name.clone())
    }

    /// Validates the configuration against the hard limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_nonempty("aws.region", &self.aws.region)?;
        validate_bucket("s3.unsigned_bucket", &self.s3.unsigned_bucket)?;
        validate_bucket("s3.signed_bucket", &self.s3.signed_bucket)?;
        require_nonempty("signer.profile_name", &self.signer.profile_name)?;
        require_identifier("signer.certificate_arn", &self.signer.certificate_arn)?;
        require_nonempty("signer.platform_id", &self.signer.platform_id)?;
        if self.signer.signed_object_prefix.len() > MAX_IDENTIFIER_LENGTH {
            return Err(ConfigError::Invalid(
                "signer.signed_object_prefix exceeds max length".to_string(),
            ));
        }
        require_nonempty("iot.thing_name", &self.iot.thing_name)?;
        require_identifier("iot.role_arn", &self.iot.role_arn)?;
        require_nonempty("iot.stream_prefix", &self.iot.stream_prefix)?;
        require_nonempty("iot.update_prefix", &self.iot.update_prefix)?;
        if self.iot.protocols.is_empty() {
            return Err(ConfigError::Invalid("iot.protocols must not be empty".to_string()));
        }
        validate_config_path("firmware.image_path", &self.firmware.image_path)?;
        validate_config_path("firmware.version_header", &self.firmware.version_header)?;
        if self.firmware.build_command.is_empty() {
            return Err(ConfigError::Invalid(
                "firmware.build_command must not be empty".to_string(),
            ));
        }
        if self.firmware.build_command.len() > MAX_BUILD_COMMAND_LENGTH {
            return Err(ConfigError::Invalid(
                "firmware.build_command exceeds max length".to_string(),
            ));
        }
        require_nonempty("firmware.device_file_name", &self.firmware.device_file_name)?;
        if !(MIN_POLL_INTERVAL_MS ..= MAX_POLL_INTERVAL_MS)
            .contains(&self.timing.poll_interval_ms)
        {
            return Err(ConfigError::Invalid(
                "timing.poll_interval_ms outside allowed range".to_string(),
            ));
        }
        if !(MIN_COMPLETION_TIMEOUT_MS ..= MAX_COMPLETION_TIMEOUT_MS)
            .contains(&self.timing.completion_timeout_ms)
        {
            return Err(ConfigError::Invalid(
                "timing.completion_timeout_ms outside allowed range".to_string(),
            ));
        }
        if self.timing.poll_interval_ms >= self.timing.completion_timeout_ms {
            return Err(ConfigError::Invalid(
                "timing.poll_interval_ms must be below completion timeout".to_string(),
            ));
        }
        Ok(())
    }
}

/// Region-only slice of the configuration.
#[derive(Debug, Deserialize)]
struct RegionConfig {
    /// AWS account and region settings.
    aws: AwsSection,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the config file after path and size checks.
fn read_config_text(path: Option<&Path>) -> Result<String, ConfigError> {
    let path = resolve_path(path)?;
    validate_path(&path)?;
    let metadata = fs::metadata(&path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE as u64 {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    fs::read_to_string(&path).map_err(|err| ConfigError::Io(err.to_string()))
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against the length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path field.
fn validate_config_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be set")));
    }
    validate_path(path).map_err(|_| ConfigError::Invalid(format!("{field} exceeds path limits")))
}

/// Requires a non-empty string field.
fn require_nonempty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be set")));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Requires a non-empty identifier that looks like an ARN.
fn require_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    require_nonempty(field, value)?;
    if !value.starts_with("arn:") {
        return Err(ConfigError::Invalid(format!("{field} must be an ARN")));
    }
    Ok(())
}

/// Validates an S3 bucket name field.
fn validate_bucket(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be set")));
    }
    if value.len() > MAX_BUCKET_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds bucket name length")));
    }
    Ok(())
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
    use super::HarnessConfig;

    /// Returns a minimal valid configuration document.
    fn valid_toml() -> String {
        r#"
            [aws]
            region = "us-west-2"

            [s3]
            unsigned_bucket = "ota-e2e-unsigned"
            signed_bucket = "ota-e2e-signed"

            [signer]
            profile_name = "ota_e2e_profile"
            certificate_arn = "arn:aws:acm:us-west-2:123456789012:certificate/abc"
            platform_id = "AmazonFreeRTOS-Default"

            [iot]
            thing_name = "ota-e2e-thing"
            role_arn = "arn:aws:iam::123456789012:role/ota-service-role"

            [firmware]
            image_path = "build/firmware.bin"
            version_header = "src/app_version.h"
            build_command = ["make", "-C", "build"]
            device_file_name = "firmware.bin"
            base_version = { major = 0, minor = 9, build = 0 }
        "#
        .to_string()
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config = HarnessConfig::from_toml(&valid_toml()).expect("parse");
        assert_eq!(config.iot.stream_prefix, "ota-e2e-stream");
        assert_eq!(config.iot.update_prefix, "ota-e2e-update");
        assert_eq!(config.timing.poll_interval_ms, 5_000);
        assert_eq!(config.timing.completion_timeout_ms, 900_000);
        assert_eq!(config.thing_name().as_str(), "ota-e2e-thing");
    }
}
