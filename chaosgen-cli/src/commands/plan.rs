//! `chaosgen plan` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use chaosgen_core::config::ChaosgenConfig;
use chaosgen_scenario::{Plan, PlannedScenario};

use crate::cli::{PlanAction, PlanArgs};
use crate::commands::{default_scenario_dir, scenario_generator};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `plan` command.
pub async fn execute(
    args: PlanArgs,
    config: &ChaosgenConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        PlanAction::Apply { file, scenario_dir } => {
            execute_apply(&file, scenario_dir, config, writer).await
        }
        PlanAction::Validate { file } => execute_validate(&file, writer).await,
    }
}

/// Write every scenario in the plan, stopping at the first failure.
///
/// Output directory precedence: `--scenario-dir`, then the plan's
/// `scenario_dir`, then `scenario.output_dir`.
async fn execute_apply(
    file: &Path,
    scenario_dir: Option<PathBuf>,
    config: &ChaosgenConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let plan = Plan::load(file)?;
    let dir = scenario_dir
        .or_else(|| plan.scenario_dir.clone())
        .unwrap_or_else(|| default_scenario_dir(config));
    info!(plan = %file.display(), entries = plan.len(), dir = %dir.display(), "applying plan");

    let written = plan.apply(&scenario_generator(config), Some(dir.as_path()))?;

    writer.render(&PlanApplyReport {
        source: file.display().to_string(),
        scenario_dir: dir.display().to_string(),
        files: written.iter().map(|p| p.display().to_string()).collect(),
    })
}

/// Assemble every scenario without touching the file system.
async fn execute_validate(file: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let plan = Plan::load(file)?;

    let report = match plan.validate() {
        Ok(planned) => PlanValidationReport {
            source: file.display().to_string(),
            valid: true,
            scenarios: planned.into_iter().map(PlannedEntry::from).collect(),
            errors: Vec::new(),
        },
        Err(e) => PlanValidationReport {
            source: file.display().to_string(),
            valid: false,
            scenarios: Vec::new(),
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::InvalidScenario("plan is invalid".to_owned()));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct PlanApplyReport {
    pub source: String,
    pub scenario_dir: String,
    pub files: Vec<String>,
}

impl Render for PlanApplyReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "{} {} scenario(s) from {}",
            "Applied".green().bold(),
            self.files.len(),
            self.source
        )?;
        writeln!(w, "  dir: {}", self.scenario_dir)?;
        for file in &self.files {
            writeln!(w, "  - {file}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct PlannedEntry {
    pub kind: String,
    pub file_name: String,
}

impl From<PlannedScenario> for PlannedEntry {
    fn from(p: PlannedScenario) -> Self {
        Self {
            kind: p.kind,
            file_name: p.file_name,
        }
    }
}

#[derive(Serialize)]
pub struct PlanValidationReport {
    pub source: String,
    pub valid: bool,
    pub scenarios: Vec<PlannedEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Render for PlanValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.valid {
            writeln!(w, "{} {}", "Valid".green().bold(), self.source)?;
            for entry in &self.scenarios {
                writeln!(w, "  {:<24} {}", entry.kind, entry.file_name)?;
            }
        } else {
            writeln!(w, "{} {}", "Invalid".red().bold(), self.source)?;
            for error in &self.errors {
                writeln!(w, "  - {error}")?;
            }
        }
        Ok(())
    }
}
