// # dnssync-core
//
// Configuration sync layer for the cluster DNS resolver.
//
// ## Architecture Overview
//
// This library obtains the resolver configuration (stub domains, upstream
// nameservers, federations) from one interchangeable source, validates it,
// and hands an initial value plus a stream of updates to a consumer:
// - **Config**: The validated configuration value object
// - **ConfigSync**: Trait every source implements (`fetch_once` + `stream`)
// - **ConfigMapClient**: Opaque control-plane handle used by the ConfigMap source
// - **SyncEngine**: Picks exactly one source from `SyncSettings` and drives delivery
//
// ## Sources
//
// - `ConfigMapSync`: watches a named ConfigMap
// - `DirectorySync`: re-reads a directory every period
// - `StaticSync`: a fixed value built from settings, never updated
//
// ## Design Principles
//
// 1. **Library-First**: The daemon is a thin shell over this crate
// 2. **All-or-nothing validation**: A config is either fully valid or rejected
// 3. **Explicit handles**: The active source is passed down, never global
// 4. **Back-pressure**: Sources block on a bounded channel while the consumer works

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod source;
pub mod validation;

// Re-export core types for convenience
pub use traits::{ConfigSync, ConfigStream, ConfigMapClient};
pub use engine::{SyncEngine, apply_updates, select_backend};
pub use config::{Config, SyncSettings, SourceSelection};
pub use error::{Error, Result};
pub use source::{ConfigMapSync, DirectorySync, StaticSync};
pub use validation::{ValidationError, ValidationPass};
