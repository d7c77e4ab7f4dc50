// ── Refresh coordinator ──
//
// Owns the current device collection and keeps it fresh on a fixed
// interval. One writer (the refresh cycle), any number of readers:
// the collection is published through an atomic pointer swap, so
// readers always see either the previous or the new snapshot, never a
// mix of the two.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pentair_api::{AuthTokens, PentairClient, TransportConfig};

use crate::config::{AccountConfig, AuthCredentials};
use crate::diff::SnapshotDiff;
use crate::error::CoreError;
use crate::model::{Device, DeviceId, DeviceType};

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Manages the account
/// lifecycle: authentication, the first data load, the background
/// refresh task, and read access to the current device collection.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: AccountConfig,
    api: PentairClient,
    devices: ArcSwap<Vec<Arc<Device>>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    updated: watch::Sender<u64>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a new Coordinator from configuration. Does NOT touch the
    /// network -- call [`connect()`](Self::connect) to authenticate and
    /// start the background refresh task.
    pub fn new(config: AccountConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let api = PentairClient::new(config.base_url.clone(), &transport)?;

        if let AuthCredentials::Tokens {
            access_token,
            id_token,
            refresh_token,
        } = &config.auth
        {
            api.restore_tokens(AuthTokens::restored(
                access_token.clone(),
                id_token.clone(),
                refresh_token.clone(),
            ));
        }

        let (last_refresh, _) = watch::channel(None);
        let (updated, _) = watch::channel(0u64);

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                api,
                devices: ArcSwap::from_pointee(Vec::new()),
                last_refresh,
                updated,
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        })
    }

    /// Access the account configuration.
    pub fn config(&self) -> &AccountConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Authenticate, perform the first refresh, and spawn the background
    /// refresh task.
    ///
    /// Rejected credentials surface as the fatal
    /// [`AuthenticationFailed`](CoreError::AuthenticationFailed); any
    /// other failure is the transient [`SetupFailed`](CoreError::SetupFailed),
    /// eligible for host-driven retry.
    pub async fn connect(&self) -> Result<(), CoreError> {
        match &self.inner.config.auth {
            AuthCredentials::Password { username, password } => {
                self.inner
                    .api
                    .login(username, password)
                    .await
                    .map_err(classify_setup_error)?;
                debug!("password authentication successful");
            }
            AuthCredentials::Tokens { .. } => {
                self.inner
                    .api
                    .authenticate()
                    .await
                    .map_err(classify_setup_error)?;
                debug!("restored session validated");
            }
        }

        // First data load. Restored sessions are only validated here:
        // on a 401 try one token refresh, then a rejected retry means
        // the saved credentials are revoked (fatal). Anything else is
        // transient and the host may retry setup later.
        if let Err(e) = self.publish_refresh().await {
            if e.is_auth() {
                self.inner
                    .api
                    .refresh_session()
                    .await
                    .map_err(classify_setup_error)?;
                self.publish_refresh()
                    .await
                    .map_err(classify_setup_error)?;
            } else {
                return Err(CoreError::SetupFailed {
                    message: e.to_string(),
                });
            }
        }

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let coordinator = self.clone();
            let cancel = self.inner.cancel.clone();
            let handle = tokio::spawn(refresh_task(coordinator, interval_secs, cancel));
            *self.inner.task.lock().await = Some(handle);
        }

        info!(
            devices = self.device_count(),
            "connected to the Pentair cloud"
        );
        Ok(())
    }

    /// Cancel and join the background refresh task.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            let _ = handle.await;
        }
        debug!("coordinator shut down");
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch all devices and republish the collection.
    ///
    /// Fetches the device list, then one detail record per device,
    /// sequentially. On success the new collection replaces the old in
    /// a single atomic swap (a fresh allocation every cycle, even when
    /// content is unchanged) and the structural diff is logged. On any
    /// client error the cycle fails as a whole: nothing is published,
    /// the previous collection stays visible, and the single generic
    /// [`UpdateFailed`](CoreError::UpdateFailed) is returned.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.publish_refresh().await.map_err(|e| {
            error!(error = %e, "device refresh failed");
            CoreError::UpdateFailed {
                message: e.to_string(),
            }
        })
    }

    /// Fetch and publish, keeping the client error for callers that
    /// classify more finely than [`refresh`](Self::refresh) does.
    async fn publish_refresh(&self) -> Result<(), pentair_api::Error> {
        let fetched = self.fetch_devices().await?;

        let next: Arc<Vec<Arc<Device>>> =
            Arc::new(fetched.into_iter().map(Arc::new).collect());

        let previous = self.inner.devices.load_full();
        let diff = SnapshotDiff::between(&previous, &next);
        debug!(devices = next.len(), %diff, "devices updated");

        self.inner.devices.store(next);
        // send_replace: the value must update even with no subscribers.
        self.inner.last_refresh.send_replace(Some(Utc::now()));
        self.notify_changed();

        Ok(())
    }

    async fn fetch_devices(&self) -> Result<Vec<Device>, pentair_api::Error> {
        let stubs = self.inner.api.get_devices().await?;

        // One detail request per device, sequential -- the cloud's
        // per-account rate limits leave no headroom for fan-out.
        let mut devices = Vec::with_capacity(stubs.len());
        for stub in stubs {
            let details = self.inner.api.get_device(&stub.device_id).await?;
            devices.push(Device::from(details));
        }
        Ok(devices)
    }

    // ── Read access ──────────────────────────────────────────────────

    /// The current device collection (cheap `Arc` clone).
    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.inner.devices.load_full()
    }

    /// Look up one device by id in the current collection.
    pub fn get_device(&self, device_id: &DeviceId) -> Option<Arc<Device>> {
        self.inner
            .devices
            .load()
            .iter()
            .find(|d| &d.id == device_id)
            .cloned()
    }

    /// Devices matching an optional type filter, in fetch order.
    pub fn get_devices(&self, device_type: Option<&DeviceType>) -> Vec<Arc<Device>> {
        self.inner
            .devices
            .load()
            .iter()
            .filter(|d| device_type.is_none_or(|t| &d.device_type == t))
            .cloned()
            .collect()
    }

    pub fn device_count(&self) -> usize {
        self.inner.devices.load().len()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Change the active pump program on a pump controller.
    ///
    /// Resolves the human-readable program name to its number
    /// (`"Stopped"` -> 0, unknown names default to 0) and delegates to
    /// the cloud. The local snapshot is NOT updated -- the next
    /// scheduled refresh reflects the change.
    pub async fn change_active_pump_program(
        &self,
        device: &Device,
        program_name: &str,
    ) -> Result<(), CoreError> {
        let program = device.resolve_program_number(program_name);
        debug!(
            device_id = %device.id,
            program_name,
            program,
            "changing active pump program"
        );
        self.inner
            .api
            .set_active_program(device.id.as_str(), program)
            .await?;
        Ok(())
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to collection updates. The value is a monotonically
    /// increasing counter, bumped on every republish or re-render request.
    pub fn subscribe_updates(&self) -> watch::Receiver<u64> {
        self.inner.updated.subscribe()
    }

    /// When the last successful refresh completed, or `None` if never.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refresh.borrow()
    }

    /// How long ago the last successful refresh occurred.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }

    /// Ask subscribed hosts to re-render from current data. Used by
    /// entities after a write so the UI reflects the request promptly.
    pub(crate) fn notify_changed(&self) {
        self.inner.updated.send_modify(|v| *v += 1);
    }
}

// ── Background task ──────────────────────────────────────────────────

/// Periodically refresh the device collection until cancelled.
///
/// Failures are logged and swallowed here; the previous collection
/// stays published and the next tick tries again.
async fn refresh_task(coordinator: Coordinator, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Classify a setup-time API error: auth failures are fatal, everything
/// else is transient.
fn classify_setup_error(err: pentair_api::Error) -> CoreError {
    if err.is_auth() {
        CoreError::from(err)
    } else {
        CoreError::SetupFailed {
            message: err.to_string(),
        }
    }
}
