//! Main entry point for the `manioc` command line tool.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use manioc_server::{
    command::{self, Cli},
    model::{AppState, Configuration},
    startup,
};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let configuration = Configuration::load(&cli.overrides())?;
    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let state = AppState::new(configuration).await?;
    debug!(?state, "Services initialized");

    let rendered = command::execute(cli.command, &state).await?;
    println!("{}", rendered.json);

    Ok(if rendered.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
