// # Kubernetes ConfigMap Client
//
// This crate provides a [`ConfigMapClient`] backed by the Kubernetes API,
// for use with `dnssync_core::ConfigMapSync`.
//
// ## Architecture
//
// - `get()`: a single `GET` of the named ConfigMap
// - `watch()`: `kube::runtime::watcher` filtered to that ConfigMap by name;
//   the watcher re-lists on its own after disconnects and reports the
//   failure as an error item, so the stream does not end
//
// The `kube::Client` is built by the caller; this crate only uses it.

use dnssync_core::traits::{ConfigMapClient, ConfigMapEvent, ConfigMapEventStream, ConfigMapSnapshot};
use dnssync_core::{Error, Result};

use k8s_openapi::api::core::v1::ConfigMap;
use kube::runtime::watcher::{self, Event};
use kube::{Api, Client};
use tokio_stream::StreamExt;
use tracing::debug;

/// ConfigMap access through the Kubernetes API
#[derive(Clone)]
pub struct KubeConfigMapClient {
    client: Client,
}

impl KubeConfigMapClient {
    /// Create a ConfigMap client from an existing Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Convert a ConfigMap into the snapshot used by the sync layer
pub fn snapshot_from(config_map: ConfigMap) -> ConfigMapSnapshot {
    ConfigMapSnapshot {
        resource_version: config_map.metadata.resource_version,
        data: config_map.data.unwrap_or_default(),
    }
}

/// Map a watcher event onto a ConfigMap event
///
/// A re-list reports the current state: the single matching ConfigMap, or
/// none if it is gone.
fn event_from(event: Event<ConfigMap>) -> ConfigMapEvent {
    match event {
        Event::Applied(config_map) => ConfigMapEvent::Applied(snapshot_from(config_map)),
        Event::Deleted(_) => ConfigMapEvent::Deleted,
        Event::Restarted(config_maps) => match config_maps.into_iter().last() {
            Some(config_map) => ConfigMapEvent::Applied(snapshot_from(config_map)),
            None => ConfigMapEvent::Deleted,
        },
    }
}

#[async_trait::async_trait]
impl ConfigMapClient for KubeConfigMapClient {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<ConfigMapSnapshot>> {
        let config_map = self.api(namespace).get_opt(name).await.map_err(|e| {
            Error::backend("configmap", format!("get {}:{} failed: {}", namespace, name, e))
        })?;

        debug!(
            "Fetched ConfigMap {}:{} (found: {})",
            namespace,
            name,
            config_map.is_some()
        );
        Ok(config_map.map(snapshot_from))
    }

    fn watch(&self, namespace: &str, name: &str) -> ConfigMapEventStream {
        let config = watcher::Config::default().fields(&format!("metadata.name={}", name));
        let resource = format!("{}:{}", namespace, name);

        let events = watcher::watcher(self.api(namespace), config).map(move |event| {
            event.map(event_from).map_err(|e| {
                Error::backend("configmap", format!("watch {} failed: {}", resource, e))
            })
        });

        Box::pin(events)
    }
}
