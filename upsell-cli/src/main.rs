mod cli;
mod commands;
mod config;

use anyhow::{Result, anyhow};
use clap::Parser;
use cli::Cli;
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let telemetry = if cli.json_logs {
        upsell_telemetry::init_json_telemetry("upsell")
    } else {
        upsell_telemetry::init_telemetry("upsell")
    };
    telemetry.map_err(|e| anyhow!("Failed to initialize telemetry: {}", e))?;

    let config = AppConfig::load(&cli.config)?.with_env_overrides();
    commands::run(cli.command, &config).await
}
