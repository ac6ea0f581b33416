// crates/ota-harness-core/src/core/identifiers.rs
// ============================================================================
// Module: OTA Harness Identifiers
// Description: Canonical opaque identifiers for policies, streams, and jobs.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used throughout
//! the harness. Identifiers are opaque and serialize as strings. Validation is
//! performed by the remote service, not within these simple wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Named IoT policy identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyName(String);

impl PolicyName {
    /// Creates a new policy name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PolicyName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PolicyName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// IoT data stream identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    /// Creates a new stream identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for StreamId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StreamId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Code-signing job identifier issued by the signing service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignerJobId(String);

impl SignerJobId {
    /// Creates a new signer job identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignerJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SignerJobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SignerJobId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// OTA update identifier assigned when an update is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtaUpdateId(String);

impl OtaUpdateId {
    /// Creates a new OTA update identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtaUpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for OtaUpdateId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OtaUpdateId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// IoT thing name of the device under test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThingName(String);

impl ThingName {
    /// Creates a new thing name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ThingName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ThingName {
    fn from(value: String) -> Self {
        Self::new(value)
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
    use super::OtaUpdateId;
    use super::PolicyName;

    #[test]
    fn identifiers_round_trip_as_transparent_strings() {
        let name = PolicyName::new("device-policy");
        let json = serde_json::to_string(&name).expect("serialize");
        assert_eq!(json, "\"device-policy\"");
        let back: PolicyName = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, name);
    }

    #[test]
    fn identifiers_display_their_inner_value() {
        let id = OtaUpdateId::new("ota-e2e-17");
        assert_eq!(id.to_string(), "ota-e2e-17");
        assert_eq!(id.as_str(), "ota-e2e-17");
    }
}
