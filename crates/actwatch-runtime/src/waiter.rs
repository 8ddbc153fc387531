//! Single-activity waiter: streams the log while polling status.

use std::io::Write;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use actwatch_api::ActivityApi;
use actwatch_core::format::{
    STYLE_ERROR, STYLE_INFO, STYLE_SUCCESS, format_log_item, format_result, format_state,
    formatted_description, styled,
};
use actwatch_core::types::{Activity, ActivityResult, ActivityState, TimestampMode};

use crate::console::Console;
use crate::error::WaitError;
use crate::log_stream::{LogStream, POLL_WAIT};
use crate::progress::ProgressLine;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Minimum time between status refreshes while the log is still open.
    pub poll_interval: Duration,
    pub timestamps: TimestampMode,
    /// Print the header naming the activity and its description.
    pub show_context: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timestamps: TimestampMode::Off,
            show_context: true,
        }
    }
}

/// State shown in the progress line.
///
/// Log output for a still-pending activity means it has actually started, so
/// the display may run ahead of the last snapshot. The override is cleared
/// at every refresh and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    actual: ActivityState,
    display_override: Option<ActivityState>,
}

impl DisplayState {
    pub fn new(actual: ActivityState) -> Self {
        Self {
            actual,
            display_override: None,
        }
    }

    pub fn refreshed(&mut self, actual: ActivityState) {
        self.actual = actual;
        self.display_override = None;
    }

    pub fn log_arrived(&mut self) {
        if self.actual == ActivityState::Pending {
            self.display_override = Some(ActivityState::InProgress);
        }
    }

    pub fn shown(&self) -> &ActivityState {
        self.display_override.as_ref().unwrap_or(&self.actual)
    }
}

/// Follow `activity` until it is terminal and its log has been fully read.
///
/// Returns whether the activity succeeded.
pub async fn wait_and_log<A: ActivityApi, W: Write>(
    api: &A,
    activity: Activity,
    options: &WaitOptions,
    console: &mut Console<W>,
) -> Result<bool, WaitError> {
    let color = console.color();
    if options.show_context {
        console.println(&format!(
            "Waiting for the activity {} ({}):",
            styled(&activity.id, STYLE_INFO, color),
            formatted_description(&activity, color)
        ))?;
    }

    let mut activity = activity;
    let mut display = DisplayState::new(activity.state.clone());
    let mut progress = ProgressLine::since(activity.started_or_created());

    let state_label = format_state(display.shown());
    let mut log = LogStream::open(
        api,
        &activity,
        &mut progress,
        console,
        &[("state", state_label.as_str())],
    )
    .await?;

    let mut residual = Vec::new();
    let mut last_refresh = Instant::now();
    while !log.is_eof() || !activity.is_terminal() {
        if log.is_eof() || last_refresh.elapsed() >= options.poll_interval {
            activity = api.refresh(&activity.project, &activity.id).await?;
            last_refresh = Instant::now();
            debug!(activity_id = %activity.id, state = %activity.state, "refreshed");
            display.refreshed(activity.state.clone());
        }

        let state_label = format_state(display.shown());
        progress.advance(console, &[("state", state_label.as_str())])?;

        if !log.poll_readable(POLL_WAIT).await {
            continue;
        }
        let items = log.read_available(&mut residual);
        if items.is_empty() {
            continue;
        }

        display.log_arrived();
        progress.clear(console)?;
        for item in &items {
            console.println(&format_log_item(item, &options.timestamps))?;
        }
        progress.redraw(console)?;
    }
    progress.finish(console)?;

    report_outcome(&activity, console)
}

/// Print the one-line outcome of a finished activity.
fn report_outcome<W: Write>(
    activity: &Activity,
    console: &mut Console<W>,
) -> Result<bool, WaitError> {
    let color = console.color();
    let (line, ok) = match (&activity.result, &activity.state) {
        (ActivityResult::Success, _) => (
            styled(&format!("Activity {} succeeded", activity.id), STYLE_SUCCESS, color),
            true,
        ),
        (ActivityResult::Failure, ActivityState::Cancelled) => (
            styled("The activity was cancelled", STYLE_ERROR, color),
            false,
        ),
        (ActivityResult::Failure, _) => (styled("The activity failed", STYLE_ERROR, color), false),
        (result, _) => (
            format!(
                "The activity finished with an unknown result: {}",
                format_result(result, color)
            ),
            false,
        ),
    };
    console.println(&line)?;
    Ok(ok)
}
