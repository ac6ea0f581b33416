// crates/ota-harness-config/src/lib.rs
// ============================================================================
// Module: OTA Harness Config Library
// Description: Canonical config model and validation for the harness.
// Purpose: Single source of truth for ota-harness.toml semantics.
// Dependencies: ota-harness-core, serde, toml
// ============================================================================

//! ## Overview
//! `ota-harness-config` defines the canonical configuration model for the OTA
//! harness. Configuration is loaded from a TOML file with strict size and
//! path limits; missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
