//! actwatch: wait for platform activities to finish while streaming their logs.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use actwatch_api::ApiConfig;

mod batch;
mod cli;
mod cmd_wait;
mod console;
mod error;
mod log_stream;
mod progress;
#[cfg(test)]
mod testing;
mod waiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("ACTWATCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let api_url = args
        .api_url
        .context("no API URL: pass --api-url or set ACTWATCH_API_URL")?;
    let mut config =
        ApiConfig::new(api_url).with_request_timeout(Duration::from_secs(args.request_timeout));
    if let Some(token) = args.token {
        config = config.with_token(token);
    }

    match args.command {
        cli::Command::Wait(opts) => {
            let ok = tokio::select! {
                result = cmd_wait::cmd_wait(config, &opts) => result?,
                _ = tokio::signal::ctrl_c() => {
                    eprintln!();
                    std::process::exit(3);
                }
            };
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
