// ── Device abstraction ──
//
// Lifecycle for one OpenKarotz: connect, background polling, command
// routing, the optional push channel, and snapshot access for the host.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use karotz_api::{ChannelState, DeviceClient, DeviceEvent, EventChannel, EventHandler};
use serde_json::Value;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{self, Command, CommandEnvelope};
use crate::config::DeviceConfig;
use crate::error::CoreError;
use crate::model::{DeviceDescriptor, PollUpdate, Snapshot};
use crate::poller::Poller;
use crate::store::SnapshotStore;
use crate::stream::SnapshotStream;

const COMMAND_CHANNEL_SIZE: usize = 16;
const UPDATE_CHANNEL_SIZE: usize = 64;
const EVENT_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Device ───────────────────────────────────────────────────────

/// The main entry point for hosts.
///
/// Cheaply cloneable. Background tasks only hold the pieces they need, so
/// dropping the last handle cancels them.
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

struct DeviceInner {
    config: DeviceConfig,
    client: Arc<DeviceClient>,
    store: Arc<SnapshotStore>,
    poller: Arc<Poller>,
    connection_state: watch::Sender<ConnectionState>,
    update_tx: broadcast::Sender<PollUpdate>,
    event_tx: broadcast::Sender<Arc<DeviceEvent>>,
    /// Parent of every session token; cancelled when the device is dropped.
    shutdown: CancellationToken,
    /// Token of the live session, `None` while disconnected.
    session: ArcSwapOption<CancellationToken>,
    commands: ArcSwapOption<mpsc::Sender<CommandEnvelope>>,
    /// Serialises poll cycles with connect and disconnect.
    cycle_lock: Arc<Mutex<()>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    events: Mutex<Option<EventChannel>>,
    event_state: ArcSwapOption<watch::Receiver<ChannelState>>,
}

impl Drop for DeviceInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl Device {
    /// Create a device from configuration. Does NOT connect.
    pub fn new(config: DeviceConfig) -> Result<Self, CoreError> {
        let client = Arc::new(DeviceClient::new(
            config.transport(),
            config.endpoints.clone(),
        )?);
        let store = Arc::new(SnapshotStore::new());
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_SIZE);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let poller = Arc::new(Poller::new(
            Arc::clone(&client),
            config.resources.clone(),
            Arc::clone(&store),
            update_tx.clone(),
        ));

        Ok(Self {
            inner: Arc::new(DeviceInner {
                config,
                client,
                store,
                poller,
                connection_state,
                update_tx,
                event_tx,
                shutdown: CancellationToken::new(),
                session: ArcSwapOption::empty(),
                commands: ArcSwapOption::empty(),
                cycle_lock: Arc::new(Mutex::new(())),
                tasks: Mutex::new(Vec::new()),
                events: Mutex::new(None),
                event_state: ArcSwapOption::empty(),
            }),
        })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    /// The underlying client, for probes and reads outside the poll cycle.
    pub fn client(&self) -> &DeviceClient {
        &self.inner.client
    }

    pub fn is_connected(&self) -> bool {
        self.inner.session.load().is_some()
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the device.
    ///
    /// Probes the device, runs a first poll cycle, then starts the poll
    /// loop, the command processor and (if enabled) the event channel. A
    /// failing first cycle is logged and reported through `updates()`; it
    /// does not fail the connect.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _cycle = self.inner.cycle_lock.lock().await;
        if self.is_connected() {
            return Ok(());
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        if let Err(e) = self.inner.client.connect().await {
            self.inner
                .connection_state
                .send_replace(ConnectionState::Failed);
            return Err(e.into());
        }

        if let Err(e) = self.inner.poller.run_cycle().await {
            warn!(error = %e, "initial poll cycle failed");
        }

        let session = self.inner.shutdown.child_token();

        if self.inner.config.events_enabled {
            match self.start_events(&session) {
                Ok(channel) => *self.inner.events.lock().await = Some(channel),
                Err(e) => {
                    self.inner.client.disconnect();
                    self.inner
                        .connection_state
                        .send_replace(ConnectionState::Failed);
                    return Err(e);
                }
            }
        }

        let mut handles = self.inner.tasks.lock().await;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        handles.push(tokio::spawn(command_processor_task(
            Arc::clone(&self.inner.client),
            command_rx,
            session.clone(),
        )));
        self.inner.commands.store(Some(Arc::new(command_tx)));

        let interval = self.inner.config.poll_interval;
        if !interval.is_zero() {
            handles.push(tokio::spawn(poll_task(
                Arc::clone(&self.inner.poller),
                Arc::clone(&self.inner.cycle_lock),
                interval,
                session.clone(),
            )));
        }
        drop(handles);

        self.inner.session.store(Some(Arc::new(session)));
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(host = %self.inner.config.host, "device connected");
        Ok(())
    }

    /// Disconnect from the device. Safe to call at any time, any number of
    /// times.
    ///
    /// An in-flight poll cycle is aborted rather than awaited.
    pub async fn disconnect(&self) {
        self.cancel_session();
        let _cycle = self.inner.cycle_lock.lock().await;
        // A connect that held the lock may have opened a session meanwhile.
        self.cancel_session();

        let mut handles = self.inner.tasks.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        if let Some(channel) = self.inner.events.lock().await.take() {
            channel.close().await;
        }
        self.inner.event_state.store(None);

        self.inner.client.disconnect();

        let previous = self
            .inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        if previous != ConnectionState::Disconnected {
            info!(host = %self.inner.config.host, "device disconnected");
        }
    }

    fn cancel_session(&self) {
        if let Some(session) = self.inner.session.swap(None) {
            session.cancel();
        }
        self.inner.commands.store(None);
    }

    /// Run one poll cycle now, outside the regular cadence.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let _cycle = self.inner.cycle_lock.lock().await;
        if !self.inner.client.is_connected() {
            return Err(CoreError::Disconnected);
        }
        self.inner.poller.run_cycle().await
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a write against the device.
    ///
    /// Writes go through one processor task so the device sees them one at a
    /// time. Wake and sleep are also accepted while disconnected and are
    /// then sent directly.
    pub async fn execute(&self, cmd: Command) -> Result<Value, CoreError> {
        cmd.validate()?;

        let Some(command_tx) = self.inner.commands.load_full() else {
            if cmd.is_probe() {
                return command::route(&self.inner.client, cmd).await;
            }
            return Err(CoreError::Disconnected);
        };

        let (tx, rx) = oneshot::channel();
        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// Connect, run `f`, disconnect.
    ///
    /// Disables the poll loop and the event channel; the first poll cycle
    /// still runs so `f` sees a snapshot.
    pub async fn oneshot<F, Fut, T>(config: DeviceConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Device) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.events_enabled = false;
        cfg.poll_interval = Duration::ZERO;

        let device = Device::new(cfg)?;
        device.connect().await?;
        let result = f(device.clone()).await;
        device.disconnect().await;
        result
    }

    // ── Event channel ────────────────────────────────────────────

    /// Start a fresh event channel, replacing the current one.
    ///
    /// This is the only way out of [`ChannelState::GaveUp`].
    pub async fn reconnect_events(&self) -> Result<(), CoreError> {
        let session = self
            .inner
            .session
            .load_full()
            .ok_or(CoreError::Disconnected)?;

        let mut slot = self.inner.events.lock().await;
        if let Some(old) = slot.take() {
            old.close().await;
        }
        *slot = Some(self.start_events(&session)?);
        Ok(())
    }

    fn start_events(&self, session: &CancellationToken) -> Result<EventChannel, CoreError> {
        let config = &self.inner.config;
        let url = config.transport().ws_url(&config.endpoints.events)?;

        let event_tx = self.inner.event_tx.clone();
        let handler: EventHandler = Arc::new(move |event| {
            let _ = event_tx.send(Arc::new(event));
        });

        debug!(%url, "starting event channel");
        let channel = EventChannel::start(url, config.reconnect, handler, session);
        self.inner
            .event_state
            .store(Some(Arc::new(channel.state())));
        Ok(channel)
    }

    /// State of the push channel; `Disconnected` when none is running.
    pub fn event_channel_state(&self) -> ChannelState {
        match &*self.inner.event_state.load() {
            Some(rx) => *rx.borrow(),
            None => ChannelState::Disconnected,
        }
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Every poll outcome, published or failed.
    pub fn updates(&self) -> broadcast::Receiver<PollUpdate> {
        self.inner.update_tx.subscribe()
    }

    /// Events pushed by the device.
    pub fn events(&self) -> broadcast::Receiver<Arc<DeviceEvent>> {
        self.inner.event_tx.subscribe()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.store.latest()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    /// Identity from the most recent successful info read.
    pub fn descriptor(&self) -> Option<DeviceDescriptor> {
        self.snapshot().and_then(|s| s.descriptor())
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll on a fixed cadence. A slow cycle pushes the next tick back
/// instead of stacking cycles.
async fn poll_task(
    poller: Arc<Poller>,
    cycle_lock: Arc<Mutex<()>>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // connect already ran the first cycle

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let _cycle = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    guard = cycle_lock.lock() => guard,
                };
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = poller.run_cycle() => {
                        if let Err(e) = result {
                            debug!(error = %e, "poll cycle produced no snapshot");
                        }
                    }
                }
            }
        }
    }

    debug!("poll loop exiting");
}

/// Apply commands one at a time.
async fn command_processor_task(
    client: Arc<DeviceClient>,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                debug!(command = ?envelope.command, "executing command");
                let result = command::route(&client, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}
