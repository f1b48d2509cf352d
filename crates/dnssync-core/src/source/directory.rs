// # Directory Config Source
//
// Reads configuration from a directory and re-reads it on a fixed period.
//
// ## Layout
//
// Every regular, non-hidden file is one key of the external representation
// (see [`crate::source::data`]): the file name is the key, the contents the
// value. Symlinks are followed, so a ConfigMap mounted as a volume (whose
// keys are symlinks into a hidden `..data` directory) reads the same as the
// ConfigMap itself.
//
// ## Polling
//
// - One read-and-validate cycle per period, never overlapping
// - A failed cycle is logged and produces no output for that tick
// - Missed ticks (slow consumer) are delayed, not replayed in a burst

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use super::UPDATE_CHANNEL_CAPACITY;
use super::data::load_config;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::traits::{ConfigStream, ConfigSync};

/// Directory-backed config source
#[derive(Debug, Clone)]
pub struct DirectorySync {
    /// Directory to read
    dir: PathBuf,

    /// Time between reads
    period: Duration,
}

impl DirectorySync {
    /// Create a directory source
    ///
    /// # Parameters
    ///
    /// - `dir`: Directory holding the config files
    /// - `period`: Time between reads (must be non-zero)
    pub fn new(dir: impl Into<PathBuf>, period: Duration) -> Self {
        Self {
            dir: dir.into(),
            period,
        }
    }
}

/// Read the directory into key/value data
async fn read_dir_data(dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut data = BTreeMap::new();

    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(key) = file_name.to_str() else {
            debug!("Skipping non UTF-8 file name {:?} in {}", file_name, dir.display());
            continue;
        };

        if key.starts_with('.') {
            continue;
        }

        // metadata() follows symlinks
        let path = entry.path();
        if !fs::metadata(&path).await?.is_file() {
            continue;
        }

        let value = fs::read_to_string(&path).await?;
        data.insert(key.to_string(), value);
    }

    Ok(data)
}

async fn load_dir(dir: &Path) -> Result<Config> {
    let data = read_dir_data(dir).await?;
    load_config(&data)
}

#[async_trait]
impl ConfigSync for DirectorySync {
    async fn fetch_once(&self) -> std::result::Result<Config, Error> {
        load_dir(&self.dir).await
    }

    fn stream(&self) -> ConfigStream {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);

        let dir = self.dir.clone();
        let period = self.period;

        tokio::spawn(async move {
            info!(
                "Starting config directory poll (dir={}, period={:?})",
                dir.display(),
                period
            );

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately; fetch_once already
            // covered that read
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = tx.closed() => {
                        debug!("Config stream dropped, stopping directory poll");
                        break;
                    }
                }

                match load_dir(&dir).await {
                    Ok(config) => {
                        debug!("Loaded config from {}", dir.display());
                        if tx.send(config).await.is_err() {
                            debug!("Config stream dropped, stopping directory poll");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Skipping config update from {}: {}", dir.display(), e);
                    }
                }
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }

    fn source_name(&self) -> &'static str {
        "directory"
    }
}
