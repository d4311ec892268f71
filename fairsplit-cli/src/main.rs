use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use fairsplit_cli::app;
use fairsplit_cli::cli::Cli;
use fairsplit_cli::config::Config;
use fairsplit_cli::logging::init_logging;

/// Exit status for input the user has to correct.
const EXIT_INVALID_INPUT: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())?.with_overrides(cli.backend, cli.db);
    init_logging(&config.log_level, config.log_file.as_deref())?;
    debug!(backend = %config.backend, year = config.default_tax_year, "configuration loaded");

    match app::run(cli.command, &config).await {
        Ok(output) => {
            print!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match err.input_messages() {
            Some(messages) => {
                for message in &messages {
                    eprintln!("error: {message}");
                }
                Ok(ExitCode::from(EXIT_INVALID_INPUT))
            }
            None => Err(err.into()),
        },
    }
}
