// crates/ota-harness-cli/src/main.rs
// ============================================================================
// Module: OTA Harness CLI Entry Point
// Description: Command dispatcher for case execution and policy management.
// Purpose: Run end-to-end OTA cases against a live account from the shell.
// Dependencies: clap, ota-harness-aws, ota-harness-cases, ota-harness-config,
//               ota-harness-core, thiserror, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! The harness CLI exposes three surfaces: listing the built-in case scripts,
//! running a selection of them against the configured device and account, and
//! managing the named IoT policies the device under test authenticates with.
//! Configuration is loaded from `ota-harness.toml` unless overridden.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use ota_harness_aws::AwsOtaAgent;
use ota_harness_aws::IotPolicyManager;
use ota_harness_cases::select_cases;
use ota_harness_config::HarnessConfig;
use ota_harness_core::CaseSettings;
use ota_harness_core::FirmwareProject;
use ota_harness_core::OtaTestCase;
use ota_harness_core::PolicyName;
use ota_harness_core::PolicyStore;
use ota_harness_core::TestContext;
use ota_harness_core::TestVerdict;
use ota_harness_core::overall_verdict;
use ota_harness_core::run_cases;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a policy document file supplied on the command line.
const MAX_POLICY_DOCUMENT_BYTES: usize = 32 * 1024;
/// File index the backend registers stream entries under.
const STREAM_FILE_ID: u32 = 0;

/// Policy document applied when no document file is supplied.
const DEFAULT_POLICY_DOCUMENT: &str = r#"{
  "Version": "2012-10-17",
  "Statement": [
    {
      "Effect": "Allow",
      "Action": [
        "iot:Connect",
        "iot:Publish",
        "iot:Subscribe",
        "iot:Receive"
      ],
      "Resource": "*"
    }
  ]
}"#;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "ota-harness", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in test cases.
    List,
    /// Run a selection of test cases against the configured device.
    Run(RunCommand),
    /// Manage named IoT policies.
    Policy {
        /// Selected policy subcommand.
        #[command(subcommand)]
        command: PolicyCommand,
    },
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
struct RunCommand {
    /// Case to run; repeatable, defaults to every case.
    #[arg(long = "case", value_name = "NAME")]
    cases: Vec<String>,
    /// Path of the harness configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Policy management subcommands.
#[derive(Subcommand, Debug)]
enum PolicyCommand {
    /// Create a named policy.
    Create(PolicyCreateCommand),
    /// Delete a named policy.
    Delete(PolicyRefCommand),
    /// Check whether a named policy exists.
    Check(PolicyRefCommand),
}

/// Arguments for `policy create`.
#[derive(Parser, Debug)]
struct PolicyCreateCommand {
    /// Name of the policy to create.
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Path of a JSON policy document; a permissive default is used otherwise.
    #[arg(long, value_name = "PATH")]
    document: Option<PathBuf>,
    /// Path of the harness configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for policy subcommands addressing an existing policy.
#[derive(Parser, Debug)]
struct PolicyRefCommand {
    /// Name of the policy.
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Path of the harness configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_tracing();
    match cli.command {
        Commands::List => command_list(),
        Commands::Run(command) => command_run(command).await,
        Commands::Policy {
            command,
        } => command_policy(command).await,
    }
}

/// Installs the process-wide tracing subscriber.
///
/// The filter honors `RUST_LOG` and defaults to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

// ============================================================================
// SECTION: List Command
// ============================================================================

/// Executes the `list` command.
fn command_list() -> CliResult<ExitCode> {
    for case in ota_harness_cases::all_cases() {
        let expectation = if case.expects_acceptance() {
            "expects acceptance"
        } else {
            "expects rejection"
        };
        write_stdout_line(&format!("{:<22} {} [{expectation}]", case.name(), case.summary()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let cases = select_cases(&command.cases)
        .map_err(|err| CliError::new(err.to_string()))?;
    let project = FirmwareProject::new(
        config.firmware.image_path.clone(),
        config.firmware.version_header.clone(),
        config.firmware.build_command.clone(),
    )
    .map_err(|err| CliError::new(format!("invalid firmware project: {err}")))?;
    let settings = CaseSettings {
        base_version: config.firmware.base_version,
        device_file_name: config.firmware.device_file_name.clone(),
        file_id: STREAM_FILE_ID,
        protocols: config.iot.protocols.clone(),
    };
    let agent = AwsOtaAgent::connect(config).await;
    let ctx = TestContext::new(&agent, &project, settings);
    let case_refs: Vec<&dyn OtaTestCase> = cases.iter().map(AsRef::as_ref).collect();
    let reports = run_cases(&case_refs, &ctx).await;
    for report in &reports {
        write_stdout_line(&report.to_string())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    let verdict = overall_verdict(&reports);
    write_stdout_line(&format!("overall: {verdict} ({} cases)", reports.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(match verdict {
        TestVerdict::Pass => ExitCode::SUCCESS,
        TestVerdict::Fail => ExitCode::FAILURE,
    })
}

// ============================================================================
// SECTION: Policy Commands
// ============================================================================

/// Executes a `policy` subcommand.
async fn command_policy(command: PolicyCommand) -> CliResult<ExitCode> {
    match command {
        PolicyCommand::Create(command) => command_policy_create(command).await,
        PolicyCommand::Delete(command) => command_policy_delete(command).await,
        PolicyCommand::Check(command) => command_policy_check(command).await,
    }
}

/// Executes `policy create`.
async fn command_policy_create(command: PolicyCreateCommand) -> CliResult<ExitCode> {
    let region = load_region(command.config.as_deref())?;
    let document = match command.document.as_deref() {
        Some(path) => read_policy_document(path)?,
        None => DEFAULT_POLICY_DOCUMENT.to_string(),
    };
    let name = PolicyName::new(command.name);
    let store = IotPolicyManager::connect(&region).await;
    store.create(&name, &document).await.map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!("created policy {name}"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `policy delete`.
async fn command_policy_delete(command: PolicyRefCommand) -> CliResult<ExitCode> {
    let region = load_region(command.config.as_deref())?;
    let name = PolicyName::new(command.name);
    let store = IotPolicyManager::connect(&region).await;
    store.delete(&name).await.map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!("deleted policy {name}"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `policy check`.
async fn command_policy_check(command: PolicyRefCommand) -> CliResult<ExitCode> {
    let region = load_region(command.config.as_deref())?;
    let name = PolicyName::new(command.name);
    let store = IotPolicyManager::connect(&region).await;
    let exists = store.exists(&name).await.map_err(|err| CliError::new(err.to_string()))?;
    let message = if exists {
        format!("policy {name} exists")
    } else {
        format!("policy {name} does not exist")
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates the harness configuration.
fn load_config(path: Option<&Path>) -> CliResult<HarnessConfig> {
    HarnessConfig::load(path)
        .map_err(|err| CliError::new(format!("configuration load failed: {err}")))
}

/// Loads only the AWS region; policy commands need nothing else.
fn load_region(path: Option<&Path>) -> CliResult<String> {
    HarnessConfig::load_region(path)
        .map_err(|err| CliError::new(format!("configuration load failed: {err}")))
}

/// Reads a policy document file, enforcing the size limit.
fn read_policy_document(path: &Path) -> CliResult<String> {
    let text = fs::read_to_string(path).map_err(|err| {
        CliError::new(format!("cannot read policy document {}: {err}", path.display()))
    })?;
    if text.len() > MAX_POLICY_DOCUMENT_BYTES {
        return Err(CliError::new(format!(
            "policy document {} exceeds {MAX_POLICY_DOCUMENT_BYTES} bytes",
            path.display()
        )));
    }
    Ok(text)
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed writing to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
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
    use clap::Parser;

    use super::Cli;
    use super::Commands;
    use super::PolicyCommand;

    #[test]
    fn run_accepts_repeated_case_flags() {
        let cli = Cli::try_parse_from([
            "ota-harness",
            "run",
            "--case",
            "missing-filename",
            "--case",
            "greater-version",
        ])
        .expect("parse");
        let Commands::Run(command) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(command.cases, vec!["missing-filename", "greater-version"]);
        assert!(command.config.is_none());
    }

    #[test]
    fn run_accepts_a_config_override() {
        let cli = Cli::try_parse_from(["ota-harness", "run", "--config", "/tmp/harness.toml"])
            .expect("parse");
        let Commands::Run(command) = cli.command else {
            panic!("expected run command");
        };
        assert!(command.cases.is_empty());
        assert_eq!(command.config.as_deref().map(|p| p.to_string_lossy().into_owned()),
            Some("/tmp/harness.toml".to_string()));
    }

    #[test]
    fn policy_create_requires_a_name() {
        let result = Cli::try_parse_from(["ota-harness", "policy", "create"]);
        assert!(result.is_err());
        let cli = Cli::try_parse_from(["ota-harness", "policy", "create", "--name", "device"])
            .expect("parse");
        let Commands::Policy {
            command: PolicyCommand::Create(command),
        } = cli.command
        else {
            panic!("expected policy create");
        };
        assert_eq!(command.name, "device");
        assert!(command.document.is_none());
    }

    #[test]
    fn policy_check_parses_name_and_config() {
        let cli = Cli::try_parse_from([
            "ota-harness",
            "policy",
            "check",
            "--name",
            "device",
            "--config",
            "harness.toml",
        ])
        .expect("parse");
        let Commands::Policy {
            command: PolicyCommand::Check(command),
        } = cli.command
        else {
            panic!("expected policy check");
        };
        assert_eq!(command.name, "device");
        assert!(command.config.is_some());
    }
}
