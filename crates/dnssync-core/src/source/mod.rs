// # Config Source Implementations
//
// This module provides implementations of the ConfigSync trait for the
// supported configuration sources.

pub mod configmap;
pub mod data;
pub mod directory;
pub mod static_config;

pub use configmap::ConfigMapSync;
pub use directory::DirectorySync;
pub use static_config::StaticSync;

/// Capacity of the channel between a source task and its stream
///
/// Kept at one so a slow consumer holds the producer back instead of
/// letting snapshots pile up.
pub(crate) const UPDATE_CHANNEL_CAPACITY: usize = 1;
