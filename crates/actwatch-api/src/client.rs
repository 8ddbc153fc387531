//! ActivityApi trait: the capabilities the waiters need from the platform.
//! Implemented by [`crate::HttpActivityApi`] and by in-memory fakes in tests.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::Stream;

use actwatch_core::types::{Activity, LogItem};

use crate::error::ApiError;

/// Incrementally readable log resource. Chunks may split lines anywhere.
pub type LogByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

pub trait ActivityApi: Send + Sync {
    /// Fetch the latest snapshot of activity `id` in `project`.
    fn refresh(
        &self,
        project: &str,
        id: &str,
    ) -> impl Future<Output = Result<Activity, ApiError>> + Send;

    /// Activities of `project` created at or after `since`.
    fn list_activities(
        &self,
        project: &str,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Activity>, ApiError>> + Send;

    /// Open the live log stream of `activity`. Resolves once the resource
    /// answered; the body is then consumed chunk by chunk.
    fn open_log(
        &self,
        activity: &Activity,
    ) -> impl Future<Output = Result<LogByteStream, ApiError>> + Send;

    /// Fetch the complete log of an already finished activity.
    fn read_full_log(
        &self,
        activity: &Activity,
    ) -> impl Future<Output = Result<Vec<LogItem>, ApiError>> + Send;
}

impl<T: ActivityApi + ?Sized> ActivityApi for &T {
    fn refresh(
        &self,
        project: &str,
        id: &str,
    ) -> impl Future<Output = Result<Activity, ApiError>> + Send {
        (**self).refresh(project, id)
    }

    fn list_activities(
        &self,
        project: &str,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Activity>, ApiError>> + Send {
        (**self).list_activities(project, since)
    }

    fn open_log(
        &self,
        activity: &Activity,
    ) -> impl Future<Output = Result<LogByteStream, ApiError>> + Send {
        (**self).open_log(activity)
    }

    fn read_full_log(
        &self,
        activity: &Activity,
    ) -> impl Future<Output = Result<Vec<LogItem>, ApiError>> + Send {
        (**self).read_full_log(activity)
    }
}
