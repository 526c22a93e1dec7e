//! Command handlers -- one module per subcommand

pub mod config;
pub mod generate;
pub mod plan;
pub mod port;
pub mod templates;

use std::path::PathBuf;

use chaosgen_core::config::ChaosgenConfig;
use chaosgen_scenario::ScenarioGenerator;

use crate::cli::Commands;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Run every command that works on a loaded configuration.
///
/// `config` is handled before loading and never reaches this point.
pub async fn dispatch(
    command: Commands,
    config: &ChaosgenConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Generate(args) => generate::execute(args, config, writer).await,
        Commands::Plan(args) => plan::execute(args, config, writer).await,
        Commands::Templates(args) => templates::execute(args, config, writer).await,
        Commands::Port(args) => port::execute(args, config, writer).await,
        Commands::Config(_) => Err(CliError::Command(
            "config command needs the config path".to_owned(),
        )),
    }
}

/// Generator rooted at `scenario.template_dir`.
pub(crate) fn scenario_generator(config: &ChaosgenConfig) -> ScenarioGenerator {
    ScenarioGenerator::new(&config.scenario.template_dir)
}

/// Default output directory from `scenario.output_dir`.
pub(crate) fn default_scenario_dir(config: &ChaosgenConfig) -> PathBuf {
    PathBuf::from(&config.scenario.output_dir)
}
