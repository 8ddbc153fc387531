//! Scripted in-memory platform for waiter tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use futures_util::{StreamExt, stream};

use actwatch_api::{ActivityApi, ApiError, LogByteStream};
use actwatch_core::types::{Activity, ActivityResult, ActivityState, LogItem};

pub const PROJECT: &str = "proj1";

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0)
        .single()
        .expect("valid datetime")
}

/// Pending activity in [`PROJECT`].
pub fn activity(id: &str) -> Activity {
    Activity::new(id, PROJECT, created_at()).with_description(format!("<user>Ana</user> ran {id}"))
}

pub fn finished(id: &str, result: ActivityResult) -> Activity {
    activity(id)
        .with_state(ActivityState::Complete)
        .with_result(result)
}

pub fn log_line(message: &str) -> String {
    format!("{}\n", serde_json::json!({ "message": message }))
}

#[derive(Debug, Clone, Copy)]
pub enum OpenBehavior {
    Stream,
    Fail,
    Hang,
    /// Fail this many times, then stream.
    FailThenStream(u32),
}

pub struct FakeApi {
    snapshots: Mutex<HashMap<String, VecDeque<Activity>>>,
    listings: Mutex<VecDeque<Vec<Activity>>>,
    chunks: Mutex<HashMap<String, Vec<String>>>,
    full_logs: Mutex<HashMap<String, Vec<LogItem>>>,
    open_behavior: Mutex<OpenBehavior>,
    /// Keep the log stream open this long after the last chunk.
    linger: Mutex<Duration>,
    refresh_calls: Mutex<Vec<String>>,
    list_calls: Mutex<Vec<(String, DateTime<Utc>)>>,
    open_calls: Mutex<u32>,
    full_log_calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(HashMap::new()),
            listings: Mutex::new(VecDeque::new()),
            chunks: Mutex::new(HashMap::new()),
            full_logs: Mutex::new(HashMap::new()),
            open_behavior: Mutex::new(OpenBehavior::Stream),
            linger: Mutex::new(Duration::ZERO),
            refresh_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
            open_calls: Mutex::new(0),
            full_log_calls: Mutex::new(Vec::new()),
        }
    }

    /// Successive refresh results for `id`; the last one repeats.
    pub fn push_snapshots(&self, id: &str, snapshots: Vec<Activity>) {
        self.snapshots
            .lock()
            .unwrap()
            .entry(id.to_owned())
            .or_default()
            .extend(snapshots);
    }

    /// One bulk-listing response; consumed in order, then empty listings.
    pub fn push_listing(&self, listing: Vec<Activity>) {
        self.listings.lock().unwrap().push_back(listing);
    }

    pub fn set_log_chunks(&self, id: &str, chunks: &[&str]) {
        self.chunks.lock().unwrap().insert(
            id.to_owned(),
            chunks.iter().map(|c| (*c).to_owned()).collect(),
        );
    }

    pub fn set_full_log(&self, id: &str, messages: &[&str]) {
        let items = messages
            .iter()
            .map(|m| LogItem {
                timestamp: None,
                message: (*m).to_owned(),
            })
            .collect();
        self.full_logs.lock().unwrap().insert(id.to_owned(), items);
    }

    pub fn set_open_behavior(&self, behavior: OpenBehavior) {
        *self.open_behavior.lock().unwrap() = behavior;
    }

    pub fn set_linger(&self, linger: Duration) {
        *self.linger.lock().unwrap() = linger;
    }

    pub fn refresh_calls(&self) -> Vec<String> {
        self.refresh_calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<(String, DateTime<Utc>)> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn open_calls(&self) -> u32 {
        *self.open_calls.lock().unwrap()
    }

    pub fn full_log_calls(&self) -> Vec<String> {
        self.full_log_calls.lock().unwrap().clone()
    }

    fn log_stream(&self, id: &str) -> LogByteStream {
        let chunks: Vec<Result<Bytes, ApiError>> = self
            .chunks
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|c| Ok(Bytes::from(c)))
            .collect();
        let linger = *self.linger.lock().unwrap();
        if linger.is_zero() {
            return Box::pin(stream::iter(chunks));
        }
        let tail = stream::once(async move {
            tokio::time::sleep(linger).await;
            Ok::<_, ApiError>(Bytes::new())
        });
        Box::pin(stream::iter(chunks).chain(tail))
    }
}

impl ActivityApi for FakeApi {
    async fn refresh(&self, _project: &str, id: &str) -> Result<Activity, ApiError> {
        self.refresh_calls.lock().unwrap().push(id.to_owned());
        let mut snapshots = self.snapshots.lock().unwrap();
        let queue = snapshots.entry(id.to_owned()).or_default();
        let snapshot = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        snapshot.ok_or_else(|| ApiError::Status {
            status: 404,
            url: format!("fake://{id}"),
            body: "not found".into(),
        })
    }

    async fn list_activities(
        &self,
        project: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Activity>, ApiError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((project.to_owned(), since));
        Ok(self.listings.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn open_log(&self, activity: &Activity) -> Result<LogByteStream, ApiError> {
        let attempt = {
            let mut calls = self.open_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        let behavior = *self.open_behavior.lock().unwrap();
        match behavior {
            OpenBehavior::Stream => Ok(self.log_stream(&activity.id)),
            OpenBehavior::FailThenStream(n) if attempt > n => Ok(self.log_stream(&activity.id)),
            OpenBehavior::Fail | OpenBehavior::FailThenStream(_) => Err(ApiError::Status {
                status: 503,
                url: format!("fake://{}/log", activity.id),
                body: "unavailable".into(),
            }),
            OpenBehavior::Hang => std::future::pending::<Result<LogByteStream, ApiError>>().await,
        }
    }

    async fn read_full_log(&self, activity: &Activity) -> Result<Vec<LogItem>, ApiError> {
        self.full_log_calls.lock().unwrap().push(activity.id.clone());
        Ok(self
            .full_logs
            .lock()
            .unwrap()
            .get(&activity.id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn refresh_twice<A: ActivityApi>(api: A) -> (ActivityState, ActivityState) {
        let first = api.refresh(PROJECT, "a1").await.expect("refresh").state;
        let second = api.refresh(PROJECT, "a1").await.expect("refresh").state;
        (first, second)
    }

    #[tokio::test]
    async fn refresh_walks_snapshots_and_repeats_last() {
        let api = FakeApi::new();
        api.push_snapshots("a1", vec![activity("a1"), finished("a1", ActivityResult::Success)]);
        assert_eq!(
            refresh_twice(&api).await,
            (ActivityState::Pending, ActivityState::Complete)
        );
        assert_eq!(
            refresh_twice(&api).await,
            (ActivityState::Complete, ActivityState::Complete)
        );
        assert_eq!(api.refresh_calls().len(), 4);
    }

    #[tokio::test]
    async fn unknown_activity_is_an_error() {
        let api = FakeApi::new();
        assert!(api.refresh(PROJECT, "missing").await.is_err());
    }
}
