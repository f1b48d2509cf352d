//! Config sync engine
//!
//! The SyncEngine is responsible for:
//! - Picking exactly one config source from [`SyncSettings`]
//! - Fetching the initial configuration before anything is served
//! - Handing the update stream to the consumer on a background task
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  select_backend  ┌──────────────────┐
//! │ SyncSettings │─────────────────▶│ dyn ConfigSync   │
//! └──────────────┘                  └──────────────────┘
//!                                      │           │
//!                              fetch_once()     stream()
//!                                      │           │
//!                                      ▼           ▼
//!                              ┌────────────┐ ┌──────────────────┐
//!                              │ on_initial │ │ on_stream (task) │
//!                              └────────────┘ └──────────────────┘
//! ```
//!
//! ## Startup Flow
//!
//! 1. Settings select a source; conflicting settings fail here
//! 2. `fetch_once()` runs on the caller's task; failure aborts startup
//! 3. `on_initial` receives the initial config, exactly once
//! 4. `on_stream` is spawned with the update stream and runs for the
//!    process lifetime

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::config::{Config, SourceSelection, SyncSettings};
use crate::error::{Error, Result};
use crate::source::{ConfigMapSync, DirectorySync, StaticSync};
use crate::traits::{ConfigMapClient, ConfigStream, ConfigSync};

/// Build the config source selected by `settings`
///
/// # Parameters
///
/// - `settings`: Bootstrap settings
/// - `client`: Control-plane client, required only when a ConfigMap is selected
///
/// # Returns
///
/// - `Ok(Box<dyn ConfigSync>)`: The selected source
/// - `Err(Error::Config)`: Both a ConfigMap and a directory were selected,
///   no client was given for a ConfigMap, or the static values are invalid
pub fn select_backend(
    settings: &SyncSettings,
    client: Option<Arc<dyn ConfigMapClient>>,
) -> Result<Box<dyn ConfigSync>> {
    match settings.source()? {
        SourceSelection::ConfigMap { namespace, name } => {
            info!("Using configuration read from ConfigMap: {}:{}", namespace, name);
            let client = client.ok_or_else(|| {
                Error::config("ConfigMap source selected but no control-plane client was supplied")
            })?;
            Ok(Box::new(ConfigMapSync::new(client, namespace, name)))
        }
        SourceSelection::Directory { path, period } => {
            info!(
                "Using configuration read from directory: {} with period {:?}",
                path.display(),
                period
            );
            Ok(Box::new(DirectorySync::new(path, period)))
        }
        SourceSelection::Static => {
            info!("ConfigMap and ConfigDir not configured, using values from settings");
            let config = settings.static_config();
            config
                .validate()
                .map_err(|e| Error::config(format!("Invalid static configuration: {}", e)))?;
            Ok(Box::new(StaticSync::new(config)))
        }
    }
}

/// Core sync engine
///
/// Owns the single config source of the process. Build it once at startup
/// and pass it to whatever needs it.
pub struct SyncEngine {
    /// The selected config source
    sync: Box<dyn ConfigSync>,

    /// Upper bound for the initial fetch
    initial_sync_timeout: Option<Duration>,
}

impl SyncEngine {
    /// Create an engine around an existing source
    pub fn new(sync: Box<dyn ConfigSync>, initial_sync_timeout: Option<Duration>) -> Self {
        Self {
            sync,
            initial_sync_timeout,
        }
    }

    /// Create an engine from settings (see [`select_backend`])
    pub fn from_settings(
        settings: &SyncSettings,
        client: Option<Arc<dyn ConfigMapClient>>,
    ) -> Result<Self> {
        let sync = select_backend(settings, client)?;
        Ok(Self::new(sync, settings.initial_sync_timeout()))
    }

    /// Name of the selected source
    pub fn source_name(&self) -> &'static str {
        self.sync.source_name()
    }

    /// Fetch the current config, bounded by the initial sync timeout
    pub async fn fetch_initial(&self) -> Result<Config> {
        match self.initial_sync_timeout {
            Some(limit) => tokio::time::timeout(limit, self.sync.fetch_once())
                .await
                .map_err(|_| {
                    Error::timeout(format!(
                        "initial {} config fetch after {:?}",
                        self.sync.source_name(),
                        limit
                    ))
                })?,
            None => self.sync.fetch_once().await,
        }
    }

    /// Start syncing
    ///
    /// Fetches the initial config and passes it to `on_initial` before
    /// returning, then spawns `on_stream` with the update stream.
    ///
    /// # Parameters
    ///
    /// - `on_initial`: Called once with the initial config
    /// - `on_stream`: Consumes the update stream; expected to loop for the
    ///   process lifetime (see [`apply_updates`])
    ///
    /// # Returns
    ///
    /// - `Ok(JoinHandle)`: Handle of the delivery task
    /// - `Err(Error)`: The initial fetch failed; `on_initial` was not called
    ///   and nothing was spawned
    pub async fn start<I, S, F>(&self, on_initial: I, on_stream: S) -> Result<JoinHandle<()>>
    where
        I: FnOnce(Config),
        S: FnOnce(ConfigStream) -> F,
        F: Future<Output = ()> + Send + 'static,
    {
        let initial = self.fetch_initial().await?;
        info!(
            "Initial configuration loaded from {} source: {} federation(s), {} stub domain(s), {} upstream nameserver(s)",
            self.sync.source_name(),
            initial.federations.len(),
            initial.stub_domains.len(),
            initial.upstream_nameservers.len()
        );
        on_initial(initial);

        let updates = self.sync.stream();
        Ok(tokio::spawn(on_stream(updates)))
    }
}

/// Apply each update in order, one at a time, until the stream ends
///
/// `apply` finishes before the next item is pulled, so a slow consumer holds
/// the source back instead of queueing snapshots.
pub async fn apply_updates<F>(mut updates: ConfigStream, mut apply: F)
where
    F: FnMut(Config),
{
    while let Some(config) = updates.next().await {
        apply(config);
    }
    debug!("Config update stream ended");
}
