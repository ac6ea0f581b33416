// crates/ota-harness-core/src/core/mod.rs
// ============================================================================
// Module: Core Model
// Description: Identifier, version, and update-descriptor types.
// Purpose: Group the passive domain model separately from runtime behavior.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Passive domain types shared by the case runtime and backend
//! implementations.

pub mod identifiers;
pub mod update;
pub mod version;
