// posetrack_driver/src/bin/replay.rs

use std::process::ExitCode;

use clap::Parser;
use posetrack_driver::cli::Cli;
use posetrack_driver::replay;
use posetrack_driver::settings::DriverSettings;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let settings = match DriverSettings::load(&cli.settings) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.print_settings {
        return match toml::to_string_pretty(&settings) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize settings: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match replay::run(&settings, &cli.replay_options()) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
