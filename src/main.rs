//! issue-finder CLI entry point.

use clap::Parser;

use issue_finder::cli::{self, Cli, Commands};
use issue_finder::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Fetch(args) => cli::commands::fetch::execute(args, &config, cli.json).await,
        Commands::Readme(args) => cli::commands::readme::execute(args, &config, cli.json),
        Commands::Repos => cli::commands::repos::execute(&config, cli.json),
    };

    if let Err(err) = result {
        cli::handle_error(err, cli.json);
    }
}
