//! Static config source
//!
//! Serves a single configuration assembled from settings. There is nothing
//! to watch, so the update stream never yields.

use async_trait::async_trait;

use crate::Error;
use crate::config::Config;
use crate::traits::{ConfigStream, ConfigSync};

/// Config source wrapping a fixed configuration
#[derive(Debug, Clone)]
pub struct StaticSync {
    config: Config,
}

impl StaticSync {
    /// Create a static source
    ///
    /// The config is served as given; callers validate it beforehand
    /// (see [`crate::select_backend`]).
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigSync for StaticSync {
    async fn fetch_once(&self) -> Result<Config, Error> {
        Ok(self.config.clone())
    }

    fn stream(&self) -> ConfigStream {
        // Never yields, never completes
        Box::pin(tokio_stream::pending::<Config>())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_once_returns_config() {
        let config = Config::new().with_upstream_nameservers(["8.8.8.8"]);
        let sync = StaticSync::new(config.clone());

        assert_eq!(sync.fetch_once().await.unwrap(), config);
        assert_eq!(sync.fetch_once().await.unwrap(), config);
    }
}
