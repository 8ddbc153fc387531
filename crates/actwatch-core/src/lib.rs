//! actwatch-core: activity data model and pure formatting.
//! Types, label/description formatters, and incremental log-line decoding.
//! No IO lives here; the api and runtime crates build on top of it.

pub mod format;
pub mod log;
pub mod types;

pub use types::{Activity, ActivityResult, ActivityState, LogItem, TimestampMode};
