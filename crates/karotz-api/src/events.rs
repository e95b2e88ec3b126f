//! Push event channel with bounded reconnect.
//!
//! The device can push JSON events over a WebSocket. [`EventChannel`] keeps
//! one such connection alive in a background task and hands every decoded
//! event to a single handler. When the socket drops it waits a fixed delay
//! and tries again, giving up for good after `max_attempts` consecutive
//! failed connects. Progress is observable through a `watch` of
//! [`ChannelState`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use karotz_api::events::{EventChannel, ReconnectPolicy};
//! use tokio_util::sync::CancellationToken;
//!
//! let url = url::Url::parse("ws://192.168.1.201/ws")?;
//! let channel = EventChannel::start(
//!     url,
//!     ReconnectPolicy::default(),
//!     Arc::new(|event| println!("{event:?}")),
//!     &CancellationToken::new(),
//! );
//! channel.shutdown();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::Error;

// ── DeviceEvent ──────────────────────────────────────────────────────

/// One event pushed by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEvent {
    /// Taken from the `type` field, or `event` when `type` is absent.
    pub event_type: Option<String>,
    pub received_at: DateTime<Utc>,
    /// The frame exactly as received.
    pub payload: Value,
}

impl DeviceEvent {
    /// Decode a text frame. Only JSON objects are events.
    pub fn from_frame(text: &str) -> Result<Self, Error> {
        let payload: Value = serde_json::from_str(text).map_err(|e| Error::Decode {
            message: e.to_string(),
            body: text.to_owned(),
        })?;

        let Some(object) = payload.as_object() else {
            return Err(Error::Decode {
                message: "event frame is not a JSON object".into(),
                body: text.to_owned(),
            });
        };

        let event_type = object
            .get("type")
            .or_else(|| object.get("event"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self {
            event_type,
            received_at: Utc::now(),
            payload,
        })
    }
}

/// Receives every decoded event, on the supervisor task.
pub type EventHandler = Arc<dyn Fn(DeviceEvent) + Send + Sync>;

// ── State and policy ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case", tag = "state")]
#[strum(serialize_all = "snake_case")]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Open,
    /// Waiting before reconnect number `attempt`.
    Reconnecting { attempt: u32 },
    /// Reconnect budget exhausted. Terminal.
    GaveUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Consecutive failed connects tolerated before giving up. Default: 3.
    pub max_attempts: u32,
    /// Fixed wait before each reconnect. Default: 5s.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

// ── EventChannel ─────────────────────────────────────────────────────

/// Handle to a running supervisor.
///
/// Dropping the handle or calling [`shutdown`](Self::shutdown) stops the
/// task, aborting a pending reconnect wait and closing the socket. Once
/// [`ChannelState::GaveUp`] is reached the task has exited and a new
/// channel has to be started.
pub struct EventChannel {
    state_rx: watch::Receiver<ChannelState>,
    attempts: Arc<AtomicU32>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl EventChannel {
    /// Spawn the supervisor. `parent` cancellation also stops the channel;
    /// stopping the channel leaves `parent` untouched.
    pub fn start(
        url: Url,
        policy: ReconnectPolicy,
        handler: EventHandler,
        parent: &CancellationToken,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);
        let attempts = Arc::new(AtomicU32::new(0));
        let cancel = parent.child_token();

        let supervisor = Supervisor {
            url,
            policy,
            handler,
            state_tx,
            attempts: Arc::clone(&attempts),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(supervisor.run());

        Self {
            state_rx,
            attempts,
            cancel,
            task: Some(task),
        }
    }

    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    pub fn current_state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// Connects tried so far, successful or not.
    pub fn connect_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Stop the supervisor and wait for it to exit.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Supervisor task ──────────────────────────────────────────────────

struct Supervisor {
    url: Url,
    policy: ReconnectPolicy,
    handler: EventHandler,
    state_tx: watch::Sender<ChannelState>,
    attempts: Arc<AtomicU32>,
    cancel: CancellationToken,
}

enum Session {
    /// Socket opened and later closed or failed.
    Dropped,
    /// Socket never opened.
    ConnectFailed(Error),
    Cancelled,
}

impl Supervisor {
    async fn run(self) {
        let mut failures: u32 = 0;

        loop {
            self.state_tx.send_replace(ChannelState::Connecting);

            match self.session().await {
                Session::Cancelled => break,
                Session::Dropped => failures = 0,
                Session::ConnectFailed(e) => {
                    failures += 1;
                    warn!(
                        url = %self.url,
                        error = %e,
                        attempt = failures,
                        "event channel connect failed"
                    );
                    if failures >= self.policy.max_attempts {
                        error!(
                            url = %self.url,
                            max_attempts = self.policy.max_attempts,
                            "event channel reconnect limit reached, giving up"
                        );
                        self.state_tx.send_replace(ChannelState::GaveUp);
                        return;
                    }
                }
            }

            let attempt = failures + 1;
            self.state_tx
                .send_replace(ChannelState::Reconnecting { attempt });
            info!(
                attempt,
                delay_ms = u64::try_from(self.policy.delay.as_millis()).unwrap_or(u64::MAX),
                "waiting before event channel reconnect"
            );

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.policy.delay) => {}
            }
        }

        self.state_tx.send_replace(ChannelState::Disconnected);
        debug!(url = %self.url, "event channel stopped");
    }

    /// One connect plus read-until-drop.
    async fn session(&self) -> Session {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        info!(url = %self.url, "connecting event channel");

        let connected = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Session::Cancelled,
            result = tokio_tungstenite::connect_async(self.url.as_str()) => result,
        };

        let mut ws = match connected {
            Ok((ws, _response)) => ws,
            Err(e) => return Session::ConnectFailed(Error::WebSocket(e.to_string())),
        };

        self.state_tx.send_replace(ChannelState::Open);
        info!(url = %self.url, "event channel open");

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    let _ = ws.close(None).await;
                    return Session::Cancelled;
                }
                frame = ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.dispatch(text.as_str()),
                    Some(Ok(Message::Ping(_))) => trace!("event channel ping"),
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "event channel closed by device");
                        return Session::Dropped;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "event channel error");
                        return Session::Dropped;
                    }
                    None => {
                        info!("event channel stream ended");
                        return Session::Dropped;
                    }
                },
            }
        }
    }

    fn dispatch(&self, text: &str) {
        match DeviceEvent::from_frame(text) {
            Ok(event) => (self.handler)(event),
            Err(e) => warn!(error = %e, "dropping malformed event frame"),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
