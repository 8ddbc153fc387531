//! reqwest-backed [`ActivityApi`] talking to the platform's REST API.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::StreamExt;
use tracing::debug;

use actwatch_core::log::parse_log_lines;
use actwatch_core::types::{Activity, LogItem};

use crate::client::{ActivityApi, LogByteStream};
use crate::error::ApiError;

const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.example.com`.
    pub base_url: String,
    pub token: Option<String>,
    /// Bound for status queries, listings and full log fetches.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Longest silence tolerated between body chunks, including the log stream.
    pub read_timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(300),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub(crate) fn activities_url(&self, project: &str) -> String {
        format!("{}/projects/{project}/activities", self.root())
    }

    pub(crate) fn activity_url(&self, project: &str, id: &str) -> String {
        format!("{}/{id}", self.activities_url(project))
    }

    pub(crate) fn log_url(&self, activity: &Activity) -> String {
        match activity.log_href() {
            Some(href) => href.to_owned(),
            None => format!("{}/log", self.activity_url(&activity.project, &activity.id)),
        }
    }
}

pub struct HttpActivityApi {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpActivityApi {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = sanitize_error_body(&response.text().await.unwrap_or_default());
        Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_owned(),
            body,
        })
    }
}

impl ActivityApi for HttpActivityApi {
    async fn refresh(&self, project: &str, id: &str) -> Result<Activity, ApiError> {
        let url = self.config.activity_url(project, id);
        debug!(project, activity_id = id, "refreshing activity");
        let request = self.get(&url).timeout(self.config.request_timeout);
        let body = self.send_checked(request, &url).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn list_activities(
        &self,
        project: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Activity>, ApiError> {
        let url = self.config.activities_url(project);
        let starts_at = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        debug!(project, %starts_at, "listing activities");
        let request = self
            .get(&url)
            .query(&[("starts_at", starts_at.as_str())])
            .timeout(self.config.request_timeout);
        let body = self.send_checked(request, &url).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn open_log(&self, activity: &Activity) -> Result<LogByteStream, ApiError> {
        let url = self.config.log_url(activity);
        debug!(activity_id = %activity.id, %url, "opening log stream");
        let response = self.send_checked(self.get(&url), &url).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ApiError::from));
        Ok(Box::pin(stream))
    }

    async fn read_full_log(&self, activity: &Activity) -> Result<Vec<LogItem>, ApiError> {
        let url = self.config.log_url(activity);
        let request = self.get(&url).timeout(self.config.request_timeout);
        let body = self.send_checked(request, &url).await?.bytes().await?;
        Ok(parse_log_lines(&body))
    }
}

/// Collapse whitespace and cap length so error bodies stay one readable line.
fn sanitize_error_body(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_BODY {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(MAX_ERROR_BODY).collect();
        format!("{truncated}\u{2026}")
    }
}
