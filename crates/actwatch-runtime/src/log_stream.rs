//! Live log stream of a single activity.
//!
//! Opening retries until a stream is established or the open window runs out.
//! Once open, a background task forwards body chunks into a bounded channel;
//! the waiter polls that channel with a short timeout so it can keep
//! refreshing status and redrawing progress while no log data arrives.

use std::io::Write;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, warn};

use actwatch_api::{ActivityApi, LogByteStream};
use actwatch_core::log::{parse_log_lines, take_complete};
use actwatch_core::types::{Activity, LogItem};

use crate::console::Console;
use crate::error::WaitError;
use crate::progress::ProgressLine;

/// Total time allowed for establishing a stream.
pub const OPEN_WINDOW: Duration = Duration::from_secs(120);
/// Per-attempt bound on opening the remote resource.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);
pub const RETRY_DELAY: Duration = Duration::from_millis(500);
/// Default readiness wait per loop iteration.
pub const POLL_WAIT: Duration = Duration::from_millis(200);
/// A stream silent for this long is treated as ended.
pub const READ_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

const CHANNEL_CAPACITY: usize = 64;

pub struct LogStream {
    rx: mpsc::Receiver<Bytes>,
    /// Bytes received by `poll_readable` but not yet handed out.
    pending: Vec<u8>,
    eof: bool,
    reader: JoinHandle<()>,
}

impl LogStream {
    /// Open the log of `activity`, retrying until [`OPEN_WINDOW`] has elapsed.
    ///
    /// The progress line is advanced on every attempt with `fields`.
    pub async fn open<A: ActivityApi, W: Write>(
        api: &A,
        activity: &Activity,
        progress: &mut ProgressLine,
        console: &mut Console<W>,
        fields: &[(&str, &str)],
    ) -> Result<Self, WaitError> {
        let start = Instant::now();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            progress.advance(console, fields)?;
            let budget = ATTEMPT_TIMEOUT.min(OPEN_WINDOW.saturating_sub(start.elapsed()));
            match timeout(budget, api.open_log(activity)).await {
                Ok(Ok(stream)) => {
                    debug!(activity_id = %activity.id, attempt, "log stream opened");
                    return Ok(Self::spawn(stream));
                }
                Ok(Err(e)) => {
                    debug!(activity_id = %activity.id, attempt, error = %e, "log stream open failed");
                }
                Err(_) => {
                    debug!(activity_id = %activity.id, attempt, "log stream open timed out");
                }
            }

            let waited = start.elapsed();
            if waited >= OPEN_WINDOW {
                return Err(WaitError::StreamUnavailable {
                    activity_id: activity.id.clone(),
                    waited,
                });
            }
            sleep(RETRY_DELAY).await;
        }
    }

    /// Start forwarding `stream` into the channel read by the waiter.
    pub fn spawn(mut stream: LogByteStream) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let reader = tokio::spawn(async move {
            loop {
                let chunk = match timeout(READ_IDLE_TIMEOUT, stream.next()).await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(_) => {
                        warn!(
                            idle_secs = READ_IDLE_TIMEOUT.as_secs(),
                            "log stream stalled; treating as end of log"
                        );
                        break;
                    }
                };
                match chunk {
                    Ok(bytes) => {
                        if tx.send(bytes).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "log stream read failed; treating as end of log");
                        break;
                    }
                }
            }
        });
        Self {
            rx,
            pending: Vec::new(),
            eof: false,
            reader,
        }
    }

    /// True once the remote resource has delivered all of its data.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Wait up to `max_wait` for data. Returns false on timeout.
    ///
    /// Reaching end of stream counts as readable once, so the caller gets a
    /// chance to flush the residual buffer. After that the call just sleeps
    /// for `max_wait` and returns false.
    pub async fn poll_readable(&mut self, max_wait: Duration) -> bool {
        if self.eof {
            sleep(max_wait).await;
            return false;
        }
        if !self.pending.is_empty() {
            return true;
        }
        match timeout(max_wait, self.rx.recv()).await {
            Ok(Some(bytes)) => {
                self.pending.extend_from_slice(&bytes);
                true
            }
            Ok(None) => {
                self.eof = true;
                true
            }
            Err(_) => false,
        }
    }

    /// Drain everything currently available into `residual` and decode the
    /// complete lines. An empty result is not an error.
    pub fn read_available(&mut self, residual: &mut Vec<u8>) -> Vec<LogItem> {
        let mut incoming = std::mem::take(&mut self.pending);
        loop {
            match self.rx.try_recv() {
                Ok(bytes) => incoming.extend_from_slice(&bytes),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.eof = true;
                    break;
                }
            }
        }

        let mut complete = take_complete(residual, &incoming);
        if self.eof && !residual.is_empty() {
            // The final record may come without a trailing newline.
            complete.append(residual);
            complete.push(b'\n');
        }
        parse_log_lines(&complete)
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
