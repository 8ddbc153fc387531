//! CLI definition using clap derive.

use std::time::Duration;

use clap::{Parser, Subcommand};

use actwatch_core::types::{DEFAULT_DATE_FORMAT, TimestampMode};

use crate::waiter::WaitOptions;

#[derive(Parser)]
#[command(name = "actwatch", about = "Wait for platform activities and stream their logs")]
pub struct Cli {
    /// Platform API base URL
    #[arg(long, env = "ACTWATCH_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the platform API
    #[arg(long, env = "ACTWATCH_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    pub request_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Wait for one or more activities to finish
    Wait(WaitOpts),
}

#[derive(clap::Args, Debug)]
pub struct WaitOpts {
    /// Activity IDs to wait for
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Project the activities belong to
    #[arg(long, short = 'p', env = "ACTWATCH_PROJECT")]
    pub project: String,

    /// Seconds between status refreshes while a log is streaming
    #[arg(long, default_value = "3")]
    pub poll_interval: u64,

    /// Prefix log lines with their timestamp
    #[arg(long, short = 't')]
    pub timestamps: bool,

    /// strftime pattern used with --timestamps
    #[arg(long, env = "ACTWATCH_DATE_FORMAT", default_value = DEFAULT_DATE_FORMAT)]
    pub date_fmt: String,

    /// Skip the "Waiting for the activity" header
    #[arg(long)]
    pub no_context: bool,

    /// Color output: auto (default), always, never
    #[arg(long, default_value = "auto")]
    pub color: String,
}

impl WaitOpts {
    pub fn wait_options(&self) -> WaitOptions {
        let timestamps = if self.timestamps {
            TimestampMode::Format(self.date_fmt.clone())
        } else {
            TimestampMode::Off
        };
        WaitOptions {
            poll_interval: Duration::from_secs(self.poll_interval.max(1)),
            timestamps,
            show_context: !self.no_context,
        }
    }
}
