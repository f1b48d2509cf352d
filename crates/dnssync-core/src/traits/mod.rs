//! Core traits for the sync layer
//!
//! - [`ConfigSync`]: A config source with a one-shot fetch and an update stream
//! - [`ConfigMapClient`]: Control-plane access used by the ConfigMap source

pub mod config_sync;
pub mod configmap_client;

pub use config_sync::{ConfigSync, ConfigStream};
pub use configmap_client::{ConfigMapClient, ConfigMapEvent, ConfigMapEventStream, ConfigMapSnapshot};
