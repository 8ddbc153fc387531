use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default chrono pattern for log timestamps.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

// ─── State & Result ───────────────────────────────────────────────

/// Lifecycle state of a remote activity.
///
/// Transitions are monotonic: `Pending -> InProgress -> {Complete, Cancelled}`,
/// with `InProgress` optionally skipped. Codes the platform adds later decode
/// to `Unrecognized` and keep their raw value for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityState {
    Pending,
    InProgress,
    Complete,
    Cancelled,
    Unrecognized(String),
}

impl ActivityState {
    pub fn from_code(code: &str) -> Self {
        match code {
            "pending" => Self::Pending,
            "in_progress" => Self::InProgress,
            "complete" => Self::Complete,
            "cancelled" => Self::Cancelled,
            other => Self::Unrecognized(other.to_owned()),
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Human-readable label. Unrecognized codes pass through unchanged.
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }
}

impl From<String> for ActivityState {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<ActivityState> for String {
    fn from(state: ActivityState) -> Self {
        state.as_code().to_owned()
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of an activity. Only meaningful once the state is terminal.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ActivityResult {
    Success,
    Failure,
    /// No result reported yet (`null` or absent on the wire).
    #[default]
    Unknown,
    Unrecognized(String),
}

impl ActivityResult {
    pub fn from_code(code: &str) -> Self {
        match code {
            "success" => Self::Success,
            "failure" => Self::Failure,
            other => Self::Unrecognized(other.to_owned()),
        }
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::Success => Some("success"),
            Self::Failure => Some("failure"),
            Self::Unknown => None,
            Self::Unrecognized(raw) => Some(raw),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unknown => "unknown",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<Option<String>> for ActivityResult {
    fn from(code: Option<String>) -> Self {
        match code {
            Some(code) => Self::from_code(&code),
            None => Self::Unknown,
        }
    }
}

impl From<ActivityResult> for Option<String> {
    fn from(result: ActivityResult) -> Self {
        result.as_code().map(str::to_owned)
    }
}

impl fmt::Display for ActivityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Activity ─────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLinks {
    #[serde(default)]
    pub log: Option<Link>,
}

/// Snapshot of a remote asynchronous operation.
///
/// Snapshots are immutable from the waiter's point of view: a refresh or a
/// bulk listing yields a new snapshot that replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub project: String,
    pub state: ActivityState,
    #[serde(default)]
    pub result: ActivityResult,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// Description with simple inline markup, e.g. `<user>Ana</user> pushed`.
    #[serde(default)]
    pub description: String,
    /// Plain-text rendition of `description`, when the platform provides one.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: ActivityLinks,
}

impl Activity {
    /// Minimal pending activity, mostly useful for callers building fixtures.
    pub fn new(id: impl Into<String>, project: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            project: project.into(),
            state: ActivityState::Pending,
            result: ActivityResult::Unknown,
            created_at,
            started_at: None,
            description: String::new(),
            text: None,
            links: ActivityLinks::default(),
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: ActivityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: ActivityResult) -> Self {
        self.result = result;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn started_or_created(&self) -> DateTime<Utc> {
        self.started_at.unwrap_or(self.created_at)
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn log_href(&self) -> Option<&str> {
        self.links.log.as_ref().map(|l| l.href.as_str())
    }
}

// ─── Log ──────────────────────────────────────────────────────────

/// One decoded record from an activity's log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogItem {
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
}

/// Whether log lines are prefixed with their timestamp.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum TimestampMode {
    #[default]
    Off,
    /// chrono strftime pattern used for the prefix.
    Format(String),
}
