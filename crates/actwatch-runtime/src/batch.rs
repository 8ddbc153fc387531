//! Batch waiter: tracks many activities with one listing call per tick.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use tracing::debug;

use actwatch_api::ActivityApi;
use actwatch_core::format::{
    STYLE_ERROR, STYLE_SUCCESS, format_log_item, formatted_description, state_summary, styled,
};
use actwatch_core::types::{Activity, ActivityResult};

use crate::console::Console;
use crate::error::WaitError;
use crate::progress::ProgressLine;
use crate::waiter::{WaitOptions, wait_and_log};

pub const TICK: Duration = Duration::from_secs(1);
const LOG_INDENT: &str = "    ";

/// Wait for every activity to finish, then report each outcome in input order.
///
/// A single activity is handed to [`wait_and_log`] so its log streams inline.
/// Returns true only if every activity succeeded.
pub async fn wait_multiple<A: ActivityApi, W: Write>(
    api: &A,
    activities: Vec<Activity>,
    options: &WaitOptions,
    console: &mut Console<W>,
) -> Result<bool, WaitError> {
    let mut tracked = activities;
    match tracked.len() {
        0 => return Ok(true),
        1 => {
            let Some(only) = tracked.pop() else {
                return Ok(true);
            };
            return wait_and_log(api, only, options, console).await;
        }
        _ => {}
    }

    let total = tracked.len();
    console.println(&format!("Waiting for {total} activities..."))?;

    let project = tracked[0].project.clone();
    let Some(most_recent) = tracked.iter().map(|a| a.created_at).max() else {
        return Ok(true);
    };

    let earliest = tracked
        .iter()
        .map(Activity::started_or_created)
        .min()
        .unwrap_or(most_recent);
    let mut progress = ProgressLine::since(earliest);
    let mut done = 0;
    while done < total {
        let summary = state_summary(&tracked);
        progress.advance(console, &[("states", summary.as_str())])?;
        tokio::time::sleep(TICK).await;

        let listed = api.list_activities(&project, most_recent).await?;
        let by_id: HashMap<&str, &Activity> = listed.iter().map(|a| (a.id.as_str(), a)).collect();
        for activity in tracked.iter_mut() {
            if let Some(fresh) = by_id.get(activity.id.as_str()) {
                *activity = (*fresh).clone();
            } else if !activity.is_terminal() {
                *activity = api.refresh(&activity.project, &activity.id).await?;
            }
        }

        done = tracked.iter().filter(|a| a.is_terminal()).count();
        debug!(done, total, listed = listed.len(), "batch tick");
    }
    let summary = state_summary(&tracked);
    progress.advance(console, &[("states", summary.as_str())])?;
    progress.finish(console)?;

    let color = console.color();
    let mut all_succeeded = true;
    for activity in &tracked {
        if activity.result == ActivityResult::Success {
            console.println(&styled(
                &format!("Activity {} succeeded", activity.id),
                STYLE_SUCCESS,
                color,
            ))?;
            continue;
        }

        all_succeeded = false;
        console.println(&styled(
            &format!("Activity {} failed", activity.id),
            STYLE_ERROR,
            color,
        ))?;
        console.println(&format!(
            "  Description: {}",
            formatted_description(activity, color)
        ))?;
        console.println("  Log:")?;
        for item in api.read_full_log(activity).await? {
            let line = format_log_item(&item, &options.timestamps);
            for part in line.lines() {
                console.println(&format!("{LOG_INDENT}{part}"))?;
            }
        }
    }
    Ok(all_succeeded)
}
