use std::path::PathBuf;
use std::process::ExitCode;

use cityweather::config::{AppConfig, CliOverrides};
use cityweather::{logging, web};
use clap::Parser;

/// Current weather and a five-day forecast for any city, in your browser.
#[derive(Parser, Debug)]
#[command(name = "cityweather", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(short, long, env = "CITYWEATHER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, overrides server.host
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides server.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::load(
        cli.config,
        CliOverrides {
            host: cli.host,
            port: cli.port,
        },
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match web::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
