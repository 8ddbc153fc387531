//! Error types for the waiters.

use std::time::Duration;

use actwatch_api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("log stream for activity {activity_id} unavailable after {}s", .waited.as_secs())]
    StreamUnavailable {
        activity_id: String,
        waited: Duration,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
