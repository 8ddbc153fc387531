//! `actwatch wait`: block until the given activities finish.

use std::io::Write;

use anyhow::Context;
use tracing::info;

use actwatch_api::{ActivityApi, ApiConfig, HttpActivityApi};

use crate::batch::wait_multiple;
use crate::cli::WaitOpts;
use crate::console::Console;
use crate::waiter::wait_and_log;

/// Entry point for `actwatch wait`. Returns whether every activity succeeded.
pub async fn cmd_wait(config: ApiConfig, opts: &WaitOpts) -> anyhow::Result<bool> {
    let api = HttpActivityApi::new(config).context("building HTTP client")?;
    let mut console = Console::stderr(&opts.color);
    run_wait(&api, opts, &mut console).await
}

/// Fetch each activity by id, then wait on it alone or as a batch.
pub async fn run_wait<A: ActivityApi, W: Write>(
    api: &A,
    opts: &WaitOpts,
    console: &mut Console<W>,
) -> anyhow::Result<bool> {
    let mut activities = Vec::with_capacity(opts.ids.len());
    for id in &opts.ids {
        let activity = api
            .refresh(&opts.project, id)
            .await
            .with_context(|| format!("fetching activity {id} in project {}", opts.project))?;
        activities.push(activity);
    }
    info!(count = activities.len(), project = %opts.project, "waiting for activities");

    let options = opts.wait_options();
    let ok = match activities.len() {
        1 => {
            let activity = activities.remove(0);
            wait_and_log(api, activity, &options, console).await?
        }
        _ => wait_multiple(api, activities, &options, console).await?,
    };
    Ok(ok)
}
