// ── Cover controller ──
//
// Full lifecycle management for one cloud gate device: token
// acquisition, device resolution, throttled diagnosis polling, motion
// watching, and command dispatch.
//
// Session fields have a single writer -- the controller's own
// operations. The locks below are never held across an await point;
// network calls run lock-free and the result is applied in a short
// critical section afterwards.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use varco_api::{
    AccessToken, Action, CloudClient, Credentials, FailureClass, RetryPolicy, TransportConfig,
};

use crate::availability::AvailabilityTracker;
use crate::classify::{GateState, classify};
use crate::config::CoverConfig;
use crate::error::CoreError;

/// Minimum spacing between diagnosis polls. Calls inside the window are
/// skipped, which also coalesces concurrent refreshes.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Watcher cadence while the gate is in motion. Deliberately shorter
/// than the refresh throttle: the watcher only asks, the throttle
/// bounds the actual API load.
const WATCHER_TICK: Duration = Duration::from_secs(1);

// ── Phase ────────────────────────────────────────────────────────────

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    AcquiringToken,
    ResolvingDevice,
    SteadyState,
    /// Token acquisition or device resolution failed. Commands fail
    /// fast and polling is suspended until `initialize()` is called
    /// again (or the controller is recreated).
    InitializationFailed,
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<Inner>`. Owns the device session: access
/// token, resolved device id, last observed gate state, and the
/// availability tracker.
#[derive(Clone)]
pub struct CoverController {
    inner: Arc<Inner>,
}

struct Inner {
    config: CoverConfig,
    client: CloudClient,
    session: RwLock<Session>,
    /// Start of the last non-throttled refresh.
    refresh_gate: Mutex<Option<Instant>>,
    watcher: Mutex<Option<WatcherHandle>>,
    cancel: CancellationToken,
}

struct WatcherHandle {
    cancel: CancellationToken,
}

struct Session {
    phase: Phase,
    token: Option<AccessToken>,
    /// Whether the token was acquired by us (and must be revoked at
    /// teardown) rather than supplied in the configuration.
    obtained_token: bool,
    device_id: Option<String>,
    state: GateState,
    availability: AvailabilityTracker,
}

impl CoverController {
    /// Create a controller against the production cloud. Does NOT
    /// connect -- call [`initialize()`](Self::initialize) to
    /// authenticate and resolve the device.
    pub fn new(config: CoverConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::new(config.timeout);
        let retry = RetryPolicy::new(config.retry_count);
        let client = CloudClient::new(&transport, retry)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a controller with a pre-built [`CloudClient`].
    ///
    /// Use this when the client needs non-default base URLs (tests
    /// against a mock server).
    pub fn with_client(config: CoverConfig, client: CloudClient) -> Self {
        info!(
            name = %config.name,
            device = %config.device,
            timeout_secs = config.timeout.as_secs(),
            retries = config.retry_count,
            skip_initial_refresh = config.skip_initial_refresh,
            "creating cover controller"
        );

        Self {
            inner: Arc::new(Inner {
                config,
                client,
                session: RwLock::new(Session {
                    phase: Phase::Uninitialized,
                    token: None,
                    obtained_token: false,
                    device_id: None,
                    state: GateState::Unknown,
                    availability: AvailabilityTracker::new(),
                }),
                refresh_gate: Mutex::new(None),
                watcher: Mutex::new(None),
                cancel: CancellationToken::new(),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the three-phase startup: acquire a token (unless one was
    /// configured), resolve the device name to its automation UUID,
    /// then perform one immediate refresh.
    ///
    /// Hosts that must not block can spawn this future. On failure the
    /// controller enters [`Phase::InitializationFailed`]: commands fail
    /// fast and `refresh()` becomes a no-op until `initialize()` is
    /// explicitly called again.
    pub async fn initialize(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        debug!(name = %config.name, "starting initialization");
        self.set_phase(Phase::AcquiringToken);

        let token = match &config.credentials {
            Credentials::Token(secret) => AccessToken::from(secret.clone()),
            Credentials::Password { username, password } => {
                match self.inner.client.acquire_token(username, password).await {
                    Ok(token) => {
                        self.session_mut().obtained_token = true;
                        token
                    }
                    Err(err) => {
                        error!(
                            name = %config.name,
                            error = %err,
                            "failed to obtain access token; check username and password. \
                             Device will be unavailable until reinitialized"
                        );
                        self.set_phase(Phase::InitializationFailed);
                        return Err(err.into());
                    }
                }
            }
        };
        self.session_mut().token = Some(token.clone());

        self.set_phase(Phase::ResolvingDevice);
        match self.inner.client.resolve_device_id(&token, &config.device).await {
            Ok(Some(device_id)) => {
                self.session_mut().device_id = Some(device_id);
            }
            Ok(None) => {
                error!(
                    name = %config.name,
                    device = %config.device,
                    "failed to resolve device id; check the device name. \
                     Device will be unavailable until reinitialized"
                );
                self.set_phase(Phase::InitializationFailed);
                return Err(CoreError::DeviceNotFound {
                    name: config.device.clone(),
                });
            }
            Err(err) => {
                error!(
                    name = %config.name,
                    error = %err,
                    "device resolution failed; device will be unavailable until reinitialized"
                );
                self.set_phase(Phase::InitializationFailed);
                return Err(err.into());
            }
        }

        self.set_phase(Phase::SteadyState);
        info!(name = %config.name, "initialized");

        if !config.skip_initial_refresh {
            self.refresh().await;
        }
        Ok(())
    }

    /// Release resources: stop the watcher and, if the access token was
    /// self-obtained, revoke it best-effort. Errors are logged, never
    /// surfaced -- teardown must not fail the host.
    pub async fn dispose(&self) {
        debug!(name = %self.inner.config.name, "disposing controller");
        self.inner.cancel.cancel();
        self.disarm_watcher();

        let token = {
            let mut session = self.session_mut();
            if session.obtained_token {
                session.token.take()
            } else {
                None
            }
        };

        let Some(token) = token else { return };
        let Credentials::Password { username, password } = &self.inner.config.credentials else {
            return;
        };

        match self.inner.client.revoke_token(&token, username, password).await {
            Ok(()) => debug!("released access token"),
            Err(err) => warn!(error = %err, "unable to remove token during cleanup"),
        }
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Fetch telemetry and update the gate state.
    ///
    /// Throttled to once per [`MIN_REFRESH_INTERVAL`]; a second call
    /// inside the window is skipped, not queued. Failures are absorbed
    /// into the availability tracker and never surface to the caller;
    /// the last known gate state is preserved across them.
    pub async fn refresh(&self) {
        {
            let session = self.session();
            if session.phase != Phase::SteadyState {
                debug!(phase = ?session.phase, "skipping refresh -- not in steady state");
                return;
            }
        }

        {
            let mut gate = self
                .inner
                .refresh_gate
                .lock()
                .expect("refresh gate poisoned");
            let now = Instant::now();
            if let Some(last) = *gate {
                if now.duration_since(last) < MIN_REFRESH_INTERVAL {
                    debug!("refresh throttled");
                    return;
                }
            }
            *gate = Some(now);
        }

        let Some((token, device_id)) = self.credentials_snapshot() else {
            debug!("cannot refresh -- missing access token or device id");
            return;
        };

        let new_state = match self.inner.client.diagnosis(&token, &device_id).await {
            Ok(Some(snapshot)) => {
                let state = classify(&snapshot);
                debug!(?snapshot, %state, "diagnosis classified");
                state
            }
            Ok(None) => {
                warn!("could not determine gate state (keeping last state)");
                GateState::Unknown
            }
            Err(err) => {
                match err.failure_class() {
                    FailureClass::ClientError | FailureClass::Auth => {
                        error!(error = %err, "diagnosis rejected by the cloud");
                    }
                    _ => warn!(error = %err, "diagnosis failed (keeping last state)"),
                }
                GateState::Unknown
            }
        };

        let still_moving = {
            let mut session = self.session_mut();
            if new_state == GateState::Unknown {
                session.availability.record_failure();
            } else {
                session.state = new_state;
                session.availability.record_success();
            }
            session.state == GateState::Moving
        };

        if !still_moving {
            self.disarm_watcher();
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open the gate. Returns `true` once the cloud acknowledges the
    /// command as done, or immediately when the gate is already open.
    pub async fn open(&self) -> bool {
        self.command(Action::Open, GateState::Open).await
    }

    /// Close the gate.
    pub async fn close(&self) -> bool {
        self.command(Action::Close, GateState::Closed).await
    }

    /// Stop the gate where it is.
    pub async fn stop(&self) -> bool {
        self.command(Action::Stop, GateState::Stopped).await
    }

    async fn command(&self, action: Action, target: GateState) -> bool {
        {
            let session = self.session();
            if session.state == target {
                debug!(%action, %target, "gate already in target state, skipping dispatch");
                return true;
            }
        }

        let Some((token, device_id)) = self.credentials_snapshot() else {
            error!(%action, "cannot execute command: no access token available");
            return false;
        };

        match self.inner.client.execute(&token, &device_id, action).await {
            Ok(ack) => {
                // The gate is (supposedly) in motion now -- poll until
                // it settles.
                self.arm_watcher();
                if ack.is_done() {
                    true
                } else {
                    warn!(%action, status = ?ack.status, "command not acknowledged as done");
                    false
                }
            }
            Err(err) => {
                error!(%action, error = %err, "command dispatch failed");
                self.session_mut().availability.record_failure();
                false
            }
        }
    }

    // ── Watcher ──────────────────────────────────────────────────────

    fn arm_watcher(&self) {
        // A disposed controller must not spawn new watchers.
        if self.inner.cancel.is_cancelled() {
            return;
        }
        let mut guard = self.inner.watcher.lock().expect("watcher lock poisoned");
        if guard.is_some() {
            return;
        }
        debug!(name = %self.inner.config.name, "starting motion watcher");

        let cancel = self.inner.cancel.child_token();
        let task_cancel = cancel.clone();
        let controller = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(WATCHER_TICK);
            interval.tick().await; // consume the immediate first tick
            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    _ = interval.tick() => controller.refresh().await,
                }
            }
        });

        *guard = Some(WatcherHandle { cancel });
    }

    fn disarm_watcher(&self) {
        let mut guard = self.inner.watcher.lock().expect("watcher lock poisoned");
        if let Some(watcher) = guard.take() {
            debug!(name = %self.inner.config.name, "stopping motion watcher");
            watcher.cancel.cancel();
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Display name of the cover.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Last observed gate state. Preserved across connectivity loss.
    pub fn state(&self) -> GateState {
        self.session().state
    }

    /// Whether the device is currently considered reachable.
    pub fn is_available(&self) -> bool {
        self.session().availability.is_available()
    }

    /// Current consecutive-failure streak (diagnostic).
    pub fn consecutive_failures(&self) -> u32 {
        self.session().availability.consecutive_failures()
    }

    /// Whether startup failed terminally (diagnostic).
    pub fn initialization_failed(&self) -> bool {
        self.session().phase == Phase::InitializationFailed
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.session().phase
    }

    /// Resolved automation UUID, once initialization succeeded.
    pub fn device_id(&self) -> Option<String> {
        self.session().device_id.clone()
    }

    /// Whether the motion watcher is currently running (diagnostic).
    pub fn watcher_armed(&self) -> bool {
        self.inner
            .watcher
            .lock()
            .expect("watcher lock poisoned")
            .is_some()
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn session(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.session.read().expect("session lock poisoned")
    }

    fn session_mut(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.session.write().expect("session lock poisoned")
    }

    fn set_phase(&self, phase: Phase) {
        self.session_mut().phase = phase;
    }

    fn credentials_snapshot(&self) -> Option<(AccessToken, String)> {
        let session = self.session();
        match (&session.token, &session.device_id) {
            (Some(token), Some(device_id)) => Some((token.clone(), device_id.clone())),
            _ => None,
        }
    }
}
