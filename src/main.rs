//! Journey CLI entry point.

use clap::Parser;

use journey::cli::commands;
use journey::cli::context::load_config;
use journey::cli::{handle_error, Cli, Commands};
use journey::infrastructure::logging::{LogConfig, LoggerImpl};

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config.as_deref(), cli.elevated, cli.json) {
        handle_error(err, cli.json);
    }
}

fn run(
    command: Commands,
    config_path: Option<&std::path::Path>,
    elevated: bool,
    json: bool,
) -> anyhow::Result<()> {
    // init runs before a configuration exists
    if let Commands::Init(args) = command {
        return commands::init::execute(args, json);
    }

    let config = load_config(config_path, elevated)?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match command {
        Commands::Init(_) => Ok(()),
        Commands::Status => commands::status::execute(&config, json),
        Commands::Stage(args) => commands::stage::execute(args, &config, json),
        Commands::Xp(args) => commands::xp::execute(args, &config, json),
        Commands::Trophy(args) => commands::trophy::execute(args, &config, json),
        Commands::Nodes(args) => commands::nodes::execute(args, &config, json),
    }
}
