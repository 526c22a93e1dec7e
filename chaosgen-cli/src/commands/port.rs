//! `chaosgen port` command handler

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use chaosgen_core::config::ChaosgenConfig;
use chaosgen_ports::{
    PortManager, read_server_binding, resolve_port_conflict, rewrite_server_port,
    validate_port_range,
};

use crate::cli::{PortAction, PortArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `port` command.
pub async fn execute(
    args: PortArgs,
    config: &ChaosgenConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let manager = PortManager::new(config.ports.clone());

    match args.action {
        PortAction::Find { preferred } => {
            let port = manager.find_available_port(preferred)?;
            writer.render(&PortFindReport {
                host: manager.config().host.clone(),
                preferred,
                default_port: manager.config().default_port,
                port,
            })
        }
        PortAction::Check { ports } => {
            let results = manager.check_port_conflicts(&ports);
            writer.render(&PortCheckReport {
                host: manager.config().host.clone(),
                ports: results
                    .into_iter()
                    .map(|(port, available)| PortStatus { port, available })
                    .collect(),
            })
        }
        PortAction::ValidateRange { start, end } => {
            let report = match validate_port_range(start, end) {
                Ok(()) => RangeReport {
                    start,
                    end,
                    valid: true,
                    error: None,
                },
                Err(e) => RangeReport {
                    start,
                    end,
                    valid: false,
                    error: Some(e.to_string()),
                },
            };
            writer.render(&report)?;
            if report.valid {
                Ok(())
            } else {
                Err(CliError::Command(format!("invalid port range {start}-{end}")))
            }
        }
        PortAction::Rewrite { tool_config, port } => {
            let port = match port {
                Some(port) => port,
                None => {
                    let binding = read_server_binding(&tool_config)?;
                    manager
                        .with_host(binding.signal_address)
                        .port_for_chaos_server()?
                }
            };
            let change = rewrite_server_port(&tool_config, port)?;
            writer.render(&RewriteReport {
                tool_config: tool_config.display().to_string(),
                conflict: None,
                previous: Some(change.previous),
                port: Some(change.port),
            })
        }
        PortAction::Resolve {
            tool_config,
            stderr_file,
        } => {
            let stderr = read_stderr(&stderr_file)?;
            let change = resolve_port_conflict(&manager, &tool_config, &stderr)?;
            info!(conflict = change.is_some(), "port conflict check finished");
            writer.render(&RewriteReport {
                tool_config: tool_config.display().to_string(),
                conflict: Some(change.is_some()),
                previous: change.map(|c| c.previous),
                port: change.map(|c| c.port),
            })
        }
    }
}

fn read_stderr(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| {
        CliError::Command(format!("cannot read stderr file {}: {e}", path.display()))
    })
}

#[derive(Serialize)]
pub struct PortFindReport {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<u16>,
    pub default_port: u16,
    pub port: u16,
}

impl Render for PortFindReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{} {}:{}", "Available".green().bold(), self.host, self.port)?;
        if self.port != self.default_port {
            writeln!(
                w,
                "  {} default port {} is in use",
                "note:".yellow(),
                self.default_port
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct PortStatus {
    pub port: u16,
    pub available: bool,
}

#[derive(Serialize)]
pub struct PortCheckReport {
    pub host: String,
    pub ports: Vec<PortStatus>,
}

impl Render for PortCheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Host: {}", self.host)?;
        for status in &self.ports {
            let state = if status.available {
                "free".green()
            } else {
                "in use".red()
            };
            writeln!(w, "  {:<6} {state}", status.port)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct RangeReport {
    pub start: u32,
    pub end: u32,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for RangeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match &self.error {
            None => writeln!(w, "{} {}-{}", "Valid".green().bold(), self.start, self.end),
            Some(error) => {
                writeln!(w, "{} {}-{}", "Invalid".red().bold(), self.start, self.end)?;
                writeln!(w, "  - {error}")
            }
        }
    }
}

/// Outcome of `port rewrite` and `port resolve`.
#[derive(Serialize)]
pub struct RewriteReport {
    pub tool_config: String,
    /// Only set by `resolve`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<bool>,
    pub previous: Option<u16>,
    pub port: Option<u16>,
}

impl Render for RewriteReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match (self.previous, self.port) {
            (Some(previous), Some(port)) => writeln!(
                w,
                "{} {}: {previous} -> {port}",
                "Updated".green().bold(),
                self.tool_config
            ),
            _ => writeln!(w, "No port conflict, {} unchanged", self.tool_config),
        }
    }
}
