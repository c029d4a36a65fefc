mod call;
mod tools;

use std::process::ExitCode;

use fintools_core::{init_logging, LogFormat, Settings};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    match &cli.command {
        Command::Tools(args) => {
            start_logging(cli, None);
            tools::run(args)
        }
        Command::Call(args) => {
            let settings = Settings::from_env()?;
            start_logging(cli, Some(&settings));
            call::run(args, &settings).await
        }
    }
}

/// Command-line flags win over settings; logs always go to stderr.
fn start_logging(cli: &Cli, settings: Option<&Settings>) {
    let level = cli
        .log_level
        .clone()
        .or_else(|| settings.map(|settings| settings.log_level.clone()))
        .unwrap_or_else(|| String::from("info"));
    let format = cli
        .log_format
        .map(LogFormat::from)
        .or_else(|| settings.map(|settings| settings.log_format))
        .unwrap_or_default();
    init_logging(&level, format);
}
