use clap::Parser;
use tracing::debug;

use chaosgen_cli::cli::{Cli, Commands};
use chaosgen_cli::commands;
use chaosgen_cli::error::CliError;
use chaosgen_cli::logging;
use chaosgen_cli::output::OutputWriter;
use chaosgen_core::config::ChaosgenConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // `config validate` must be able to report a broken file, so a load
    // failure only becomes fatal for the other commands.
    let loaded = ChaosgenConfig::load_or_default(&cli.config).await;

    let mut general = loaded
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_default();
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    logging::init_tracing(&general).map_err(|e| CliError::Config(e.to_string()))?;
    chaosgen_core::metrics::describe_all();
    debug!(config = %cli.config.display(), "chaosgen starting");

    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        command => {
            let mut config = loaded.map_err(|e| CliError::Config(e.to_string()))?;
            if let Some(dir) = &cli.template_dir {
                config.scenario.template_dir = dir.display().to_string();
            }
            commands::dispatch(command, &config, &writer).await
        }
    }
}
