//! Test doubles and common utilities for sync contract tests
//!
//! This module provides a controllable ConfigMap client and small helpers
//! shared by the contract tests.

#![allow(dead_code)]

use dnssync_core::error::Result;
use dnssync_core::traits::{
    ConfigMapClient, ConfigMapEvent, ConfigMapEventStream, ConfigMapSnapshot, ConfigStream,
};
use dnssync_core::{Config, Error};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

/// A ConfigMap client whose current value and watch events are driven by the test
pub struct ControlledConfigMapClient {
    /// Value returned by get()
    current: std::sync::Mutex<Option<ConfigMapSnapshot>>,
    /// Receivers handed out by watch(), one per call
    watch_rxs: std::sync::Mutex<Vec<mpsc::UnboundedReceiver<Result<ConfigMapEvent>>>>,
    /// Call counter for get()
    get_call_count: AtomicUsize,
    /// Call counter for watch()
    watch_call_count: Arc<AtomicUsize>,
}

impl ControlledConfigMapClient {
    /// Create a client returning `current` from get()
    ///
    /// Returns the client and the sender feeding the first watch() stream.
    pub fn new(
        current: Option<ConfigMapSnapshot>,
    ) -> (Arc<Self>, mpsc::UnboundedSender<Result<ConfigMapEvent>>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let client = Arc::new(Self {
            current: std::sync::Mutex::new(current),
            watch_rxs: std::sync::Mutex::new(vec![rx]),
            get_call_count: AtomicUsize::new(0),
            watch_call_count: Arc::new(AtomicUsize::new(0)),
        });

        (client, tx)
    }

    /// Queue another watch stream, used once the previous one ends
    pub fn push_watch(&self) -> mpsc::UnboundedSender<Result<ConfigMapEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watch_rxs.lock().unwrap().push(rx);
        tx
    }

    /// Get the number of times get() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times watch() was called
    pub fn watch_call_count(&self) -> usize {
        self.watch_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ConfigMapClient for ControlledConfigMapClient {
    async fn get(&self, _namespace: &str, _name: &str) -> Result<Option<ConfigMapSnapshot>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.current.lock().unwrap().clone())
    }

    fn watch(&self, _namespace: &str, _name: &str) -> ConfigMapEventStream {
        self.watch_call_count.fetch_add(1, Ordering::SeqCst);

        let mut rxs = self.watch_rxs.lock().unwrap();
        if rxs.is_empty() {
            // Nothing queued: a watch that stays silent
            return Box::pin(tokio_stream::pending::<Result<ConfigMapEvent>>());
        }
        let rx = rxs.remove(0);

        Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(rx))
    }
}

/// A ConfigMap client whose get() always fails
pub struct FailingConfigMapClient;

#[async_trait::async_trait]
impl ConfigMapClient for FailingConfigMapClient {
    async fn get(&self, _namespace: &str, _name: &str) -> Result<Option<ConfigMapSnapshot>> {
        Err(Error::backend("configmap", "connection refused"))
    }

    fn watch(&self, _namespace: &str, _name: &str) -> ConfigMapEventStream {
        Box::pin(tokio_stream::pending::<Result<ConfigMapEvent>>())
    }
}

/// Snapshot holding the given upstream nameservers
pub fn upstream_snapshot(nameservers: &[&str]) -> ConfigMapSnapshot {
    ConfigMapSnapshot::new([(
        "upstreamNameservers",
        serde_json::to_string(nameservers).unwrap(),
    )])
}

/// Config holding the given upstream nameservers
pub fn upstream_config(nameservers: &[&str]) -> Config {
    Config::new().with_upstream_nameservers(nameservers.iter().copied())
}

/// Wait for the next update, failing the test after `limit`
pub async fn next_within(updates: &mut ConfigStream, limit: Duration) -> Config {
    tokio::time::timeout(limit, updates.next())
        .await
        .expect("update arrives in time")
        .expect("stream does not end")
}

/// Assert that no update arrives within `window`
pub async fn assert_silent(updates: &mut ConfigStream, window: Duration) {
    if let Ok(item) = tokio::time::timeout(window, updates.next()).await {
        panic!("expected no update, got {:?}", item);
    }
}

/// Replace a file atomically so a concurrent directory read never sees a partial write
pub async fn write_atomic(dir: &Path, name: &str, contents: &str) {
    let tmp = dir.join(format!(".{}.tmp", name));
    tokio::fs::write(&tmp, contents).await.unwrap();
    tokio::fs::rename(&tmp, dir.join(name)).await.unwrap();
}
