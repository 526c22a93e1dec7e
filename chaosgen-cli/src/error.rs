//! CLI-specific error types and exit code mapping

use chaosgen_core::error::{ChaosgenError, PortError};
use chaosgen_scenario::ScenarioGenError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes so scripts
/// can tell a bad argument from a broken template tree.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Scenario arguments or plan contents rejected before writing.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// Template missing from the template root.
    #[error("template missing: {0}")]
    TemplateMissing(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from chaosgen-core.
    #[error("{0}")]
    Core(#[from] ChaosgenError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 3    | Invalid scenario argument or plan    |
    /// | 4    | Template missing                     |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(ChaosgenError::Config(_)) => 2,
            Self::InvalidScenario(_) => 3,
            Self::TemplateMissing(_) => 4,
            Self::Io(_) | Self::Core(ChaosgenError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<ScenarioGenError> for CliError {
    fn from(e: ScenarioGenError) -> Self {
        match e {
            ScenarioGenError::InvalidArgument(_) | ScenarioGenError::Plan { .. } => {
                Self::InvalidScenario(e.to_string())
            }
            ScenarioGenError::TemplateNotFound { path } => Self::TemplateMissing(path),
            ScenarioGenError::Render { .. } | ScenarioGenError::Io { .. } => {
                Self::Command(e.to_string())
            }
        }
    }
}

impl From<PortError> for CliError {
    fn from(e: PortError) -> Self {
        Self::Core(ChaosgenError::Port(e))
    }
}
