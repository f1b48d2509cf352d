//! Control-plane access for the ConfigMap source
//!
//! The sync layer never builds a Kubernetes client itself. Callers hand in
//! an implementation of [`ConfigMapClient`] (see the `dnssync-kube` crate),
//! which keeps this crate free of any client stack.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::pin::Pin;
use tokio_stream::Stream;

/// Data of a ConfigMap at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMapSnapshot {
    /// Resource version reported by the control plane (if any)
    pub resource_version: Option<String>,

    /// ConfigMap `data` entries
    pub data: BTreeMap<String, String>,
}

impl ConfigMapSnapshot {
    /// Create a snapshot from data entries
    pub fn new<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            resource_version: None,
            data: data.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Set the resource version
    pub fn with_resource_version(mut self, version: impl Into<String>) -> Self {
        self.resource_version = Some(version.into());
        self
    }
}

/// A change observed on the watched ConfigMap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigMapEvent {
    /// The ConfigMap was created or modified
    Applied(ConfigMapSnapshot),

    /// The ConfigMap was deleted
    Deleted,
}

/// Stream of watch events; errors are transient (disconnects, decode failures)
pub type ConfigMapEventStream =
    Pin<Box<dyn Stream<Item = Result<ConfigMapEvent, crate::Error>> + Send + 'static>>;

/// Read and watch access to ConfigMaps
#[async_trait]
pub trait ConfigMapClient: Send + Sync {
    /// Get a ConfigMap, `Ok(None)` if it does not exist
    async fn get(&self, namespace: &str, name: &str)
        -> Result<Option<ConfigMapSnapshot>, crate::Error>;

    /// Watch a single ConfigMap for changes
    ///
    /// The stream should keep running across transient errors. If it ends,
    /// the caller re-establishes the watch.
    fn watch(&self, namespace: &str, name: &str) -> ConfigMapEventStream;
}
