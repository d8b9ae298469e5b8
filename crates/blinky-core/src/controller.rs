// ── Controller abstraction ──
//
// Full lifecycle management for a fleet connection. Handles client
// construction, background refresh, command routing, and reactive data
// streaming through the FleetStore.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use blinky_api::transport::{TlsMode, TransportConfig};
use blinky_api::types::LogRecord;
use blinky_api::{BlobClient, SyncClient, extract_version};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{FleetConfig, TlsVerification};
use crate::convert::split_checkin;
use crate::dispatcher::{self, Intent};
use crate::error::CoreError;
use crate::model::{Checkin, Firmware, Globals, LogEntry, Strip, StripConfig, StripId};
use crate::reconciler;
use crate::store::FleetStore;
use crate::stream::EntityStream;

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Manages the full
/// connection lifecycle: client construction, initial and periodic
/// refresh, command routing, and reactive entity streaming.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: FleetConfig,
    store: Arc<FleetStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    sync_client: Mutex<Option<Arc<SyncClient>>>,
    blob_client: Mutex<Option<Arc<BlobClient>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to build clients and start
    /// background tasks.
    pub fn new(config: FleetConfig) -> Self {
        let store = Arc::new(FleetStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                connection_state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                sync_client: Mutex::new(None),
                blob_client: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the fleet configuration.
    pub fn config(&self) -> &FleetConfig {
        &self.inner.config
    }

    /// Access the underlying FleetStore.
    pub fn store(&self) -> &Arc<FleetStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the stores.
    ///
    /// Builds the HTTP clients, performs an initial data refresh, and
    /// spawns background tasks (periodic refresh, command processor).
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        let config = &self.inner.config;
        let transport = build_transport(config);

        let sync_client = SyncClient::new(
            config.database_url.clone(),
            config.auth_token.clone(),
            &transport,
        )?;
        *self.inner.sync_client.lock().await = Some(Arc::new(sync_client));

        if let Some(blob_url) = &config.blob_url {
            let blob_client = BlobClient::new(blob_url.clone(), &transport)?;
            *self.inner.blob_client.lock().await = Some(Arc::new(blob_client));
        }

        // Initial data load
        if let Err(e) = self.full_refresh().await {
            let _ = self.inner.connection_state.send(ConnectionState::Failed);
            return Err(e);
        }

        // Spawn background tasks
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        let interval_secs = config.refresh_interval_secs;
        if interval_secs > 0 {
            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        }

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!(url = %config.database_url, "connected to sync store");
        Ok(())
    }

    /// Disconnect: cancel background tasks and drop the clients.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.sync_client.lock().await = None;
        *self.inner.blob_client.lock().await = None;
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Fetch everything from the sync store and rebuild the FleetStore.
    ///
    /// Strips are the union of the desired-config listing and the
    /// checkin listing: a strip missing from either side still appears.
    /// Rows that fail conversion are skipped with a warning rather than
    /// failing the whole refresh.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        let client = self.sync_client().await?;

        let (strips_res, checkins_res, firmware_res, log_res, globals_res) = tokio::join!(
            client.list_strips(),
            client.list_checkins(),
            client.list_firmware(),
            client.list_log(),
            client.get_globals(),
        );

        let desired: Vec<(StripId, StripConfig)> = strips_res?
            .into_iter()
            .filter_map(|(id, record)| match StripConfig::try_from(record) {
                Ok(config) => Some((StripId::new(id), config)),
                Err(err) => {
                    warn!(strip = %id, %err, "skipping unparsable desired config");
                    None
                }
            })
            .collect();

        let checkins: Vec<(StripId, Checkin, Option<StripConfig>)> = checkins_res?
            .into_iter()
            .map(|(id, record)| {
                let (checkin, reported) = split_checkin(record);
                (StripId::new(id), checkin, reported)
            })
            .collect();

        let firmware: Vec<Firmware> = firmware_res?
            .into_iter()
            .filter_map(|(version, record)| match Firmware::try_from(record) {
                Ok(fw) => Some(fw),
                Err(err) => {
                    warn!(%version, %err, "skipping unparsable firmware record");
                    None
                }
            })
            .collect();

        let log: Vec<(String, LogEntry)> = log_res?
            .into_iter()
            .map(|(key, record)| (key, LogEntry::from(record)))
            .collect();

        let globals: Globals = globals_res?.into();

        let store = &self.inner.store;
        store.replace_strips(desired, checkins);
        store.replace_firmware(firmware);
        store.replace_log(log);
        store.set_globals(globals);
        store.mark_refreshed();

        debug!(
            strips = store.strip_count(),
            "full refresh complete"
        );
        Ok(())
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the fleet.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::Disconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    /// Execute a voice intent and produce the spoken response.
    pub async fn handle_intent(&self, intent: Intent) -> Result<String, CoreError> {
        let client = self.sync_client().await?;
        dispatcher::dispatch(
            &client,
            &self.inner.store,
            &self.inner.config.actor,
            intent,
        )
        .await
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Optimized for CLI: disables the periodic refresh since we only
    /// need a single request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: FleetConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Snapshot accessors (delegate to FleetStore) ──────────────

    pub fn strips_snapshot(&self) -> Arc<Vec<Arc<Strip>>> {
        self.inner.store.strips_snapshot()
    }

    pub fn strip(&self, id: &StripId) -> Option<Arc<Strip>> {
        self.inner.store.strip(id)
    }

    pub fn firmware_snapshot(&self) -> Arc<Vec<Arc<Firmware>>> {
        self.inner.store.firmware_snapshot()
    }

    pub fn log_snapshot(&self) -> Arc<Vec<Arc<LogEntry>>> {
        self.inner.store.log_snapshot()
    }

    pub fn globals(&self) -> Globals {
        self.inner.store.globals()
    }

    // ── Stream accessors (delegate to FleetStore) ────────────────

    pub fn strips(&self) -> EntityStream<Strip> {
        self.inner.store.subscribe_strips()
    }

    pub fn firmware(&self) -> EntityStream<Firmware> {
        self.inner.store.subscribe_firmware()
    }

    pub fn log(&self) -> EntityStream<LogEntry> {
        self.inner.store.subscribe_log()
    }

    // ── Private helpers ──────────────────────────────────────────

    async fn sync_client(&self) -> Result<Arc<SyncClient>, CoreError> {
        self.inner
            .sync_client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)
    }

    async fn blob_client(&self) -> Result<Arc<BlobClient>, CoreError> {
        self.inner
            .blob_client
            .lock()
            .await
            .clone()
            .ok_or_else(|| CoreError::Config {
                message: "no blob store URL configured; firmware upload needs one".into(),
            })
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh data from the sync store.
async fn refresh_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.full_refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel, routing each to the
/// appropriate store call.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.sync_client().await?;
    let store = &controller.inner.store;
    let actor = controller.inner.config.actor.as_str();

    match cmd {
        Command::SetField { selector, field } => {
            let report =
                reconciler::set_field_fanout(&client, store, actor, &selector, &field).await?;
            Ok(CommandResult::Fanout(report))
        }

        Command::SetFieldById { id, field } => {
            reconciler::set_field(&client, store, actor, &id, &field).await?;
            Ok(CommandResult::Ok)
        }

        Command::SetAllEnabled(enabled) => {
            let report = reconciler::set_all_enabled(&client, store, actor, enabled).await?;
            Ok(CommandResult::Fanout(report))
        }

        Command::DeleteStrip { id } => {
            // Checkin first: a checkin surviving a deleted config would
            // resurrect the strip as a ghost row on the next refresh.
            client.remove_checkin(id.as_str()).await?;
            client.remove_strip(id.as_str()).await?;
            store.remove_strip(&id);
            reconciler::append_log(&client, store, actor, format!("deleted strip {id}")).await;
            Ok(CommandResult::Ok)
        }

        Command::UploadFirmware { filename, bytes } => {
            let Some(version) = extract_version(&bytes) else {
                return Err(CoreError::MalformedFirmware { filename });
            };

            let blob = controller.blob_client().await?;
            let url = blob.upload(&filename, bytes).await?;

            let firmware = Firmware {
                version: version.clone(),
                date_uploaded: Utc::now(),
                filename,
                url,
            };
            client
                .set_firmware(&version, &firmware.clone().into())
                .await?;
            store.upsert_firmware(firmware.clone());
            reconciler::append_log(&client, store, actor, format!("added firmware {version}"))
                .await;
            Ok(CommandResult::Firmware(firmware))
        }

        Command::DeleteFirmware { version } => {
            client.remove_firmware(&version).await?;
            store.remove_firmware(&version);
            reconciler::append_log(&client, store, actor, format!("deleted firmware {version}"))
                .await;
            Ok(CommandResult::Ok)
        }

        Command::AppendLog { text } => {
            // Explicit log appends propagate failures, unlike the
            // best-effort entries written alongside other commands.
            let record = LogRecord {
                date: Utc::now().to_rfc3339(),
                name: actor.to_owned(),
                text,
            };
            let key = client.append_log(&record).await?;
            store.upsert_log_entry(key, record.into());
            Ok(CommandResult::Ok)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build a [`TransportConfig`] from the fleet configuration.
fn build_transport(config: &FleetConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
