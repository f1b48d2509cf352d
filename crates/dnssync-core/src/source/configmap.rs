// # ConfigMap Config Source
//
// Reads configuration from a ConfigMap and follows its changes through the
// control plane's watch.
//
// ## Update Rules
//
// - Every applied change is parsed, validated and forwarded, even when the
//   data did not change
// - A deleted ConfigMap forwards the default (empty) configuration
// - Parse/validation failures and watch errors drop that event only
// - If the watch stream ends it is re-established after a short delay

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use super::UPDATE_CHANNEL_CAPACITY;
use super::data::load_config;
use crate::Error;
use crate::config::Config;
use crate::traits::{ConfigMapClient, ConfigMapEvent, ConfigStream, ConfigSync};

/// Delay before re-establishing a watch that ended
const WATCH_RESTART_DELAY: Duration = Duration::from_secs(1);

/// ConfigMap-backed config source
pub struct ConfigMapSync {
    /// Control-plane client
    client: Arc<dyn ConfigMapClient>,

    /// ConfigMap namespace
    namespace: String,

    /// ConfigMap name
    name: String,
}

impl ConfigMapSync {
    /// Create a ConfigMap source
    pub fn new(
        client: Arc<dyn ConfigMapClient>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    fn resource(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }
}

#[async_trait]
impl ConfigSync for ConfigMapSync {
    async fn fetch_once(&self) -> Result<Config, Error> {
        let snapshot = self
            .client
            .get(&self.namespace, &self.name)
            .await?
            .ok_or_else(|| Error::not_found(format!("ConfigMap {}", self.resource())))?;

        debug!(
            "Fetched ConfigMap {} (version {:?})",
            self.resource(),
            snapshot.resource_version
        );
        load_config(&snapshot.data)
    }

    fn stream(&self) -> ConfigStream {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);

        let client = Arc::clone(&self.client);
        let namespace = self.namespace.clone();
        let name = self.name.clone();
        let resource = self.resource();

        tokio::spawn(async move {
            loop {
                info!("Watching ConfigMap {}", resource);
                let mut events = client.watch(&namespace, &name);

                loop {
                    let event = tokio::select! {
                        event = events.next() => event,
                        _ = tx.closed() => {
                            debug!("Config stream dropped, stopping ConfigMap watch");
                            return;
                        }
                    };

                    let Some(event) = event else {
                        break;
                    };

                    let update = match event {
                        Ok(ConfigMapEvent::Applied(snapshot)) => match load_config(&snapshot.data) {
                            Ok(config) => {
                                info!(
                                    "ConfigMap {} updated (version {:?})",
                                    resource, snapshot.resource_version
                                );
                                config
                            }
                            Err(e) => {
                                warn!(
                                    "Ignoring ConfigMap {} update (version {:?}): {}",
                                    resource, snapshot.resource_version, e
                                );
                                continue;
                            }
                        },
                        Ok(ConfigMapEvent::Deleted) => {
                            info!("ConfigMap {} deleted, reverting to defaults", resource);
                            Config::default()
                        }
                        Err(e) => {
                            warn!("ConfigMap {} watch error: {}", resource, e);
                            continue;
                        }
                    };

                    if tx.send(update).await.is_err() {
                        debug!("Config stream dropped, stopping ConfigMap watch");
                        return;
                    }
                }

                warn!(
                    "ConfigMap {} watch ended, restarting in {:?}",
                    resource, WATCH_RESTART_DELAY
                );
                tokio::select! {
                    _ = tokio::time::sleep(WATCH_RESTART_DELAY) => {}
                    _ = tx.closed() => return,
                }
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }

    fn source_name(&self) -> &'static str {
        "configmap"
    }
}
