// crates/ota-harness-core/src/runtime/mod.rs
// ============================================================================
// Module: Case Runtime
// Description: Firmware project handling, case contract, and sequential runner.
// Purpose: Execute fixed linear case scripts and collect verdicts.
// Dependencies: async-trait, thiserror, tracing
// ============================================================================

//! ## Overview
//! The runtime executes test-case scripts one at a time, blocking on remote
//! calls, and aggregates the per-case reports. No state is shared between
//! cases.

pub mod case;
pub mod project;
pub mod runner;
pub mod testing;
