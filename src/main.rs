// Entrypoint for the uploader.
// - Keeps `main` small: parse the configuration, build the API client and
//   hand both to the session loop.
// - Any fatal error is printed and ends the process with status 1.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use osc_uploader::api::ApiClient;
use osc_uploader::config::Config;
use osc_uploader::session::{self, Settings};
use osc_uploader::ui::{self, ConsoleOperator};

fn main() -> ExitCode {
    // Diagnostics go to stderr so they never interleave with the prompts.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "osc_uploader=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            ui::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::parse();
    config.validate()?;

    let api = ApiClient::new(&config.server, &config.user, &config.password)?;
    let settings = Settings {
        images_dir: config.images_dir.clone(),
        temp_dir: config.temp_dir.clone(),
        token_file: config.token_path(),
        split_size: config.split_size,
    };
    tracing::info!(?settings, server = %config.server, "starting session");

    let mut operator = ConsoleOperator;
    let summary = session::run(&settings, &api, &mut operator)?;
    tracing::info!(started = summary.started.len(), "session finished");
    Ok(())
}
