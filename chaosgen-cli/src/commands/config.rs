//! `chaosgen config` command handler

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use chaosgen_core::config::ChaosgenConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
pub const SECTIONS: [&str; 3] = ["general", "scenario", "ports"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if the file is missing, malformed or holds invalid values.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match ChaosgenConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
///
/// A missing file falls back to defaults, the same way every other command does.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = ChaosgenConfig::load_or_default(config_path).await?;
    let report = ConfigReport::build(config_path, &config, section)?;

    writer.render(&report)
}

fn to_toml<T: Serialize>(value: &T) -> String {
    toml::to_string_pretty(value).unwrap_or_else(|e| format!("(serialization error: {e})"))
}

/// Effective configuration, optionally narrowed to one section.
///
/// `config_toml` is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
    pub config: serde_json::Value,
}

impl ConfigReport {
    pub fn build(
        config_path: &Path,
        config: &ChaosgenConfig,
        section: Option<String>,
    ) -> Result<Self, CliError> {
        let (config_toml, value) = match section.as_deref() {
            None => (to_toml(config), serde_json::to_value(config)?),
            Some("general") => (to_toml(&config.general), serde_json::to_value(&config.general)?),
            Some("scenario") => (
                to_toml(&config.scenario),
                serde_json::to_value(&config.scenario)?,
            ),
            Some("ports") => (to_toml(&config.ports), serde_json::to_value(&config.ports)?),
            Some(other) => {
                return Err(CliError::Command(format!(
                    "unknown section: {other} (expected: {})",
                    SECTIONS.join(", ")
                )));
            }
        };

        Ok(Self {
            source: config_path.display().to_string(),
            section,
            config_toml,
            config: value,
        })
    }
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match &self.section {
            Some(section) => writeln!(w, "# {} [{section}]", self.source)?,
            None => writeln!(w, "# {}", self.source)?,
        }
        write!(w, "{}", self.config_toml)
    }
}

#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.valid {
            writeln!(w, "{} {}", "Valid".green().bold(), self.source)?;
        } else {
            writeln!(w, "{} {}", "Invalid".red().bold(), self.source)?;
            for error in &self.errors {
                writeln!(w, "  - {error}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<T: Render>(report: &T) -> String {
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn test_config_report_full() {
        let report =
            ConfigReport::build(Path::new("chaosgen.toml"), &ChaosgenConfig::default(), None)
                .unwrap();
        let output = render(&report);
        assert!(output.starts_with("# chaosgen.toml\n"));
        assert!(output.contains("[general]"));
        assert!(output.contains("[ports]"));
        assert_eq!(report.config["ports"]["default_port"], 8081);
    }

    #[test]
    fn test_config_report_section() {
        let report = ConfigReport::build(
            Path::new("chaosgen.toml"),
            &ChaosgenConfig::default(),
            Some("scenario".to_owned()),
        )
        .unwrap();
        let output = render(&report);
        assert!(output.contains("[scenario]"));
        assert!(output.contains("template_dir"));
        assert!(!output.contains("default_port"));
        assert_eq!(report.config["storage_namespace"], "openshift-storage");
    }

    #[test]
    fn test_config_report_unknown_section() {
        let result = ConfigReport::build(
            Path::new("chaosgen.toml"),
            &ChaosgenConfig::default(),
            Some("ebpf".to_owned()),
        );
        match result {
            Err(CliError::Command(msg)) => assert!(msg.contains("general, scenario, ports")),
            _ => panic!("unknown section should fail"),
        }
    }

    #[test]
    fn test_config_report_json_skips_toml_text() {
        let report =
            ConfigReport::build(Path::new("c.toml"), &ChaosgenConfig::default(), None).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("config_toml").is_none());
        assert!(json.get("section").is_none());
        assert_eq!(json["config"]["general"]["log_level"], "info");
    }

    #[test]
    fn test_validation_report_invalid() {
        let output = render(&ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["failed to parse config".to_owned()],
        });
        assert!(output.contains("Invalid"));
        assert!(output.contains("  - failed to parse config"));
    }
}
