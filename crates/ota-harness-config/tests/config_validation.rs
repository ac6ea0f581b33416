// crates/ota-harness-config/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Fail-closed validation coverage for ota-harness.toml.
// Purpose: Ensure malformed configuration never reaches the cloud backend.
// Dependencies: ota-harness-config, tempfile
// ============================================================================

//! ## Overview
//! Exercises the hard limits and required-field rules of the configuration
//! model against complete TOML documents.

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

use ota_harness_config::ConfigError;
use ota_harness_config::HarnessConfig;

/// Returns a complete valid configuration document.
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
        protocols = ["MQTT", "HTTP"]

        [firmware]
        image_path = "build/firmware.bin"
        version_header = "src/app_version.h"
        build_command = ["make", "-C", "build"]
        device_file_name = "firmware.bin"
        base_version = { major = 0, minor = 9, build = 0 }

        [timing]
        poll_interval_ms = 2000
        completion_timeout_ms = 120000
    "#
    .to_string()
}

/// Replaces one line of the valid document with a substitute.
fn with_line_replaced(needle: &str, replacement: &str) -> String {
    let base = valid_toml();
    assert!(base.contains(needle), "fixture must contain {needle}");
    base.replace(needle, replacement)
}

#[test]
fn full_config_parses_and_validates() {
    let config = HarnessConfig::from_toml(&valid_toml()).expect("parse");
    assert_eq!(config.timing.poll_interval_ms, 2_000);
    assert_eq!(config.iot.protocols.len(), 2);
}

#[test]
fn empty_region_is_rejected() {
    let text = with_line_replaced("region = \"us-west-2\"", "region = \"  \"");
    let result = HarnessConfig::from_toml(&text);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn overlong_bucket_name_is_rejected() {
    let long = "b".repeat(80);
    let text = with_line_replaced(
        "unsigned_bucket = \"ota-e2e-unsigned\"",
        &format!("unsigned_bucket = \"{long}\""),
    );
    let result = HarnessConfig::from_toml(&text);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn non_arn_role_is_rejected() {
    let text = with_line_replaced(
        "role_arn = \"arn:aws:iam::123456789012:role/ota-service-role\"",
        "role_arn = \"ota-service-role\"",
    );
    let result = HarnessConfig::from_toml(&text);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn empty_build_command_is_rejected() {
    let text = with_line_replaced(
        "build_command = [\"make\", \"-C\", \"build\"]",
        "build_command = []",
    );
    let result = HarnessConfig::from_toml(&text);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn empty_protocol_list_is_rejected() {
    let text = with_line_replaced("protocols = [\"MQTT\", \"HTTP\"]", "protocols = []");
    let result = HarnessConfig::from_toml(&text);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn poll_interval_below_minimum_is_rejected() {
    let text =
        with_line_replaced("poll_interval_ms = 2000", "poll_interval_ms = 10");
    let result = HarnessConfig::from_toml(&text);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn poll_interval_must_stay_below_the_deadline() {
    let text = with_line_replaced(
        "completion_timeout_ms = 120000",
        "completion_timeout_ms = 10000",
    )
    .replace("poll_interval_ms = 2000", "poll_interval_ms = 20000");
    let result = HarnessConfig::from_toml(&text);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn missing_section_fails_to_parse() {
    let text = valid_toml().replace("[signer]", "[signer_disabled]");
    let result = HarnessConfig::from_toml(&text);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn load_reads_the_file_at_the_given_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ota-harness.toml");
    fs::write(&path, valid_toml()).expect("write config");
    let config = HarnessConfig::load(Some(&path)).expect("load");
    assert_eq!(config.aws.region, "us-west-2");
}

#[test]
fn region_loads_without_the_remaining_sections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ota-harness.toml");
    fs::write(&path, "[aws]\nregion = \"eu-central-1\"\n").expect("write config");
    let region = HarnessConfig::load_region(Some(&path)).expect("load region");
    assert_eq!(region, "eu-central-1");
}

#[test]
fn region_load_rejects_an_empty_region() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ota-harness.toml");
    fs::write(&path, "[aws]\nregion = \"  \"\n").expect("write config");
    let result = HarnessConfig::load_region(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn load_rejects_a_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing.toml");
    let result = HarnessConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
