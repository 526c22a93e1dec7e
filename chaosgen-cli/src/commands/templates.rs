//! `chaosgen templates` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use tracing::warn;

use chaosgen_core::config::ChaosgenConfig;
use chaosgen_scenario::{ScenarioGenerator, TEMPLATES};

use crate::cli::{TemplatesAction, TemplatesArgs};
use crate::commands::scenario_generator;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `templates` command.
pub async fn execute(
    args: TemplatesArgs,
    config: &ChaosgenConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = TemplateReport::scan(&scenario_generator(config));
    writer.render(&report)?;

    match args.action {
        TemplatesAction::List => Ok(()),
        TemplatesAction::Check => match report.missing().first() {
            None => Ok(()),
            Some(first) => {
                warn!(missing = report.missing().len(), "builder templates missing");
                Err(CliError::TemplateMissing(format!(
                    "{} of {} templates missing under {} (first: {first})",
                    report.missing().len(),
                    report.templates.len(),
                    report.root
                )))
            }
        },
    }
}

#[derive(Serialize)]
pub struct TemplateEntry {
    pub name: String,
    pub present: bool,
}

#[derive(Serialize)]
pub struct TemplateReport {
    pub root: String,
    pub templates: Vec<TemplateEntry>,
}

impl TemplateReport {
    /// Check every builder template under the generator's root.
    pub fn scan(generator: &ScenarioGenerator) -> Self {
        let root = generator.template_root();
        Self {
            root: root.display().to_string(),
            templates: TEMPLATES
                .iter()
                .map(|name| TemplateEntry {
                    name: (*name).to_owned(),
                    present: root.join(name).is_file(),
                })
                .collect(),
        }
    }

    pub fn missing(&self) -> Vec<&str> {
        self.templates
            .iter()
            .filter(|t| !t.present)
            .map(|t| t.name.as_str())
            .collect()
    }
}

impl Render for TemplateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Template root: {}", self.root)?;
        for t in &self.templates {
            let mark = if t.present {
                "ok".green()
            } else {
                "missing".red().bold()
            };
            writeln!(w, "  {:<40} {mark}", t.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_root_reports_every_template_missing() {
        let dir = TempDir::new().unwrap();
        let report = TemplateReport::scan(&ScenarioGenerator::new(dir.path()));
        assert_eq!(report.templates.len(), TEMPLATES.len());
        assert_eq!(report.missing().len(), TEMPLATES.len());
    }

    #[test]
    fn present_template_is_marked() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("kube")).unwrap();
        std::fs::write(dir.path().join("kube/cpu-hog.yml.j2"), "x").unwrap();

        let report = TemplateReport::scan(&ScenarioGenerator::new(dir.path()));
        assert!(!report.missing().contains(&"kube/cpu-hog.yml.j2"));
        assert_eq!(report.missing().len(), TEMPLATES.len() - 1);

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("kube/cpu-hog.yml.j2"));
        assert!(output.contains("missing"));
    }
}
