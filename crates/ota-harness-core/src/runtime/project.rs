// crates/ota-harness-core/src/runtime/project.rs
// ============================================================================
// Module: Firmware Project
// Description: Version-header rewrite and image build for the device firmware.
// Purpose: Let case scripts stamp a version and produce a fresh image.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The firmware project wraps the local build tree of the device under test.
//! A case stamps the desired application version into the configured version
//! header, then runs the configured build command to produce the image that
//! will be uploaded and signed. Both steps are fallible and neither retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

use crate::core::version::AppVersion;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header define carrying the major version component.
const VERSION_MAJOR_KEY: &str = "APP_VERSION_MAJOR";
/// Header define carrying the minor version component.
const VERSION_MINOR_KEY: &str = "APP_VERSION_MINOR";
/// Header define carrying the build version component.
const VERSION_BUILD_KEY: &str = "APP_VERSION_BUILD";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Firmware project errors.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Reading or writing a project file failed.
    #[error("project io error: {0}")]
    Io(String),
    /// The build command exited unsuccessfully.
    #[error("firmware build failed: {0}")]
    BuildFailed(String),
    /// The version header does not contain an expected define.
    #[error("version header missing define: {0}")]
    VersionKeyMissing(String),
    /// The project configuration is unusable.
    #[error("invalid project: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Firmware Project
// ============================================================================

/// Local firmware build tree for the device under test.
#[derive(Debug, Clone)]
pub struct FirmwareProject {
    /// Path of the built firmware image.
    image_path: PathBuf,
    /// Path of the header holding the application version defines.
    version_header: PathBuf,
    /// Build command as program plus arguments.
    build_command: Vec<String>,
}

impl FirmwareProject {
    /// Creates a firmware project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Invalid`] when the build command is empty.
    pub fn new(
        image_path: impl Into<PathBuf>,
        version_header: impl Into<PathBuf>,
        build_command: Vec<String>,
    ) -> Result<Self, ProjectError> {
        if build_command.is_empty() {
            return Err(ProjectError::Invalid("build command must not be empty".to_string()));
        }
        Ok(Self {
            image_path: image_path.into(),
            version_header: version_header.into(),
            build_command,
        })
    }

    /// Returns the path of the built firmware image.
    #[must_use]
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Returns the base file name of the firmware image.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Invalid`] when the image path has no UTF-8
    /// file name component.
    pub fn image_file_name(&self) -> Result<String, ProjectError> {
        self.image_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToString::to_string)
            .ok_or_else(|| ProjectError::Invalid("image path has no usable file name".to_string()))
    }

    /// Stamps the application version into the version header.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError`] when the header cannot be read or written, or
    /// when one of the version defines is absent.
    pub fn set_application_version(&self, version: AppVersion) -> Result<(), ProjectError> {
        let source = fs::read_to_string(&self.version_header)
            .map_err(|err| ProjectError::Io(err.to_string()))?;
        let stamped = rewrite_define(&source, VERSION_MAJOR_KEY, version.major)?;
        let stamped = rewrite_define(&stamped, VERSION_MINOR_KEY, version.minor)?;
        let stamped = rewrite_define(&stamped, VERSION_BUILD_KEY, version.build)?;
        fs::write(&self.version_header, stamped).map_err(|err| ProjectError::Io(err.to_string()))
    }

    /// Builds the firmware image with the configured command.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::BuildFailed`] when the command cannot be
    /// spawned or exits unsuccessfully.
    pub fn build(&self) -> Result<(), ProjectError> {
        let program = &self.build_command[0];
        let output = Command::new(program)
            .args(&self.build_command[1 ..])
            .output()
            .map_err(|err| ProjectError::BuildFailed(format!("{program}: {err}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProjectError::BuildFailed(format!("{program}: {stderr}")));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rewrites the value of a `#define` line, preserving all other lines.
fn rewrite_define(source: &str, key: &str, value: u32) -> Result<String, ProjectError> {
    let mut found = false;
    let mut lines = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        let is_target = trimmed
            .strip_prefix("#define")
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix(key))
            .is_some_and(|rest| rest.starts_with(char::is_whitespace) || rest.is_empty());
        if is_target {
            found = true;
            lines.push(format!("#define {key}    {value}"));
        } else {
            lines.push(line.to_string());
        }
    }
    if !found {
        return Err(ProjectError::VersionKeyMissing(key.to_string()));
    }
    let mut rewritten = lines.join("\n");
    if source.ends_with('\n') {
        rewritten.push('\n');
    }
    Ok(rewritten)
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
    use std::fs;

    use super::FirmwareProject;
    use super::ProjectError;
    use super::rewrite_define;
    use crate::core::version::AppVersion;

    /// Sample version header used by rewrite tests.
    const HEADER: &str = "#ifndef APP_VERSION_H\n\
                          #define APP_VERSION_MAJOR    0\n\
                          #define APP_VERSION_MINOR    9\n\
                          #define APP_VERSION_BUILD    0\n\
                          #endif\n";

    #[test]
    fn rewrite_replaces_only_the_target_define() {
        let rewritten = rewrite_define(HEADER, "APP_VERSION_MINOR", 10).expect("rewrite");
        assert!(rewritten.contains("#define APP_VERSION_MINOR    10"));
        assert!(rewritten.contains("#define APP_VERSION_MAJOR    0"));
        assert!(rewritten.contains("#ifndef APP_VERSION_H"));
    }

    #[test]
    fn rewrite_does_not_match_prefixed_keys() {
        let source = "#define APP_VERSION_MAJOR_LIMIT 99\n#define APP_VERSION_MAJOR 1\n";
        let rewritten = rewrite_define(source, "APP_VERSION_MAJOR", 2).expect("rewrite");
        assert!(rewritten.contains("#define APP_VERSION_MAJOR_LIMIT 99"));
        assert!(rewritten.contains("#define APP_VERSION_MAJOR    2"));
    }

    #[test]
    fn rewrite_fails_when_define_is_absent() {
        let result = rewrite_define("#define OTHER 1\n", "APP_VERSION_MAJOR", 1);
        assert!(matches!(result, Err(ProjectError::VersionKeyMissing(_))));
    }

    #[test]
    fn set_application_version_stamps_the_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let header_path = dir.path().join("app_version.h");
        fs::write(&header_path, HEADER).expect("write header");
        let project = FirmwareProject::new(
            dir.path().join("firmware.bin"),
            &header_path,
            vec!["true".to_string()],
        )
        .expect("project");
        project.set_application_version(AppVersion::new(0, 9, 1)).expect("stamp");
        let stamped = fs::read_to_string(&header_path).expect("read header");
        assert!(stamped.contains("#define APP_VERSION_BUILD    1"));
    }

    #[test]
    fn empty_build_command_is_rejected() {
        let result = FirmwareProject::new("firmware.bin", "version.h", Vec::new());
        assert!(matches!(result, Err(ProjectError::Invalid(_))));
    }

    #[test]
    fn build_reports_command_failure() {
        let project =
            FirmwareProject::new("firmware.bin", "version.h", vec!["false".to_string()])
                .expect("project");
        assert!(matches!(project.build(), Err(ProjectError::BuildFailed(_))));
    }

    #[test]
    fn image_file_name_is_the_base_name() {
        let project = FirmwareProject::new(
            "/tmp/out/firmware.bin",
            "version.h",
            vec!["true".to_string()],
        )
        .expect("project");
        assert_eq!(project.image_file_name().expect("name"), "firmware.bin");
    }
}
