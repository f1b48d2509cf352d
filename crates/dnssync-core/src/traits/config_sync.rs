// # Config Sync Trait
//
// Defines the interface every config source implements.
//
// ## Implementations
//
// - ConfigMap-backed: `source::ConfigMapSync`
// - Directory-backed: `source::DirectorySync`
// - Static: `source::StaticSync`
//
// ## Usage
//
// ```rust,ignore
// use dnssync_core::ConfigSync;
// use tokio_stream::StreamExt;
//
// #[tokio::main]
// async fn main() -> dnssync_core::Result<()> {
//     let sync = /* ConfigSync implementation */;
//
//     // Get the current config
//     let initial = sync.fetch_once().await?;
//
//     // Receive later snapshots
//     let mut updates = sync.stream();
//     while let Some(config) = updates.next().await {
//         println!("config updated: {:?}", config);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::config::Config;

/// Stream of validated configuration snapshots
pub type ConfigStream = Pin<Box<dyn Stream<Item = Config> + Send + 'static>>;

/// Trait for config source implementations
///
/// This trait defines two capabilities:
/// 1. **fetch_once()**: Read and validate the current configuration
/// 2. **stream()**: Stream of later configuration snapshots
///
/// Every item a source yields has passed [`Config::validate`].
///
/// ## Stream Rules
///
/// - Snapshots that fail to load or validate are logged and dropped; the
///   stream keeps going
/// - The stream runs for the process lifetime and does not end under
///   normal operation
/// - Producers must not buffer without bound: if the consumer is slow the
///   producer waits
/// - At most one fetch/validate cycle is in flight at a time
/// - Dropping the stream stops any task backing it
#[async_trait]
pub trait ConfigSync: Send + Sync {
    /// Read and validate the current configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Config)`: The current, valid configuration
    /// - `Err(Error)`: Source unreachable, missing, unparsable or invalid
    async fn fetch_once(&self) -> Result<Config, crate::Error>;

    /// Stream of configuration updates after the initial fetch
    ///
    /// Must be called from within a Tokio runtime.
    fn stream(&self) -> ConfigStream;

    /// Short name for logging
    fn source_name(&self) -> &'static str;
}
