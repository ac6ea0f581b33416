// crates/ota-harness-core/src/core/version.rs
// ============================================================================
// Module: Application Version
// Description: Firmware application version triple.
// Purpose: Drive version-header rewrites and version-based case variants.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The device firmware advertises a `major.minor.build` application version.
//! Case scripts bump or hold this version to provoke acceptance or rejection
//! of an update; the triple itself carries no ordering policy beyond the
//! natural lexicographic comparison on its components.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Version Type
// ============================================================================

/// Firmware application version as embedded in the image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppVersion {
    /// Major version component.
    pub major: u32,
    /// Minor version component.
    pub minor: u32,
    /// Build version component.
    pub build: u32,
}

impl AppVersion {
    /// Creates a new application version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            build,
        }
    }

    /// Returns the next build of the same major/minor line.
    #[must_use]
    pub const fn next_build(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor,
            build: self.build.saturating_add(1),
        }
    }

    /// Returns the previous build, saturating at zero.
    #[must_use]
    pub const fn previous_build(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor,
            build: self.build.saturating_sub(1),
        }
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
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
    use super::AppVersion;

    #[test]
    fn display_uses_dotted_triple() {
        assert_eq!(AppVersion::new(0, 9, 1).to_string(), "0.9.1");
    }

    #[test]
    fn ordering_follows_components() {
        assert!(AppVersion::new(0, 9, 1) < AppVersion::new(0, 9, 2));
        assert!(AppVersion::new(0, 9, 9) < AppVersion::new(0, 10, 0));
        assert!(AppVersion::new(1, 0, 0) > AppVersion::new(0, 99, 99));
    }

    #[test]
    fn build_stepping_saturates() {
        assert_eq!(AppVersion::new(0, 9, 0).previous_build(), AppVersion::new(0, 9, 0));
        assert_eq!(AppVersion::new(0, 9, 1).next_build(), AppVersion::new(0, 9, 2));
    }
}
