//! Configuration types for the sync layer
//!
//! - [`Config`]: the resolver configuration delivered to consumers
//! - [`SyncSettings`]: bootstrap parameters that pick the config source

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Resolver configuration delivered by every config source
///
/// The serialized field names are the wire contract shared with existing
/// ConfigMaps and config directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Federation name -> domain suffix the cluster belongs to
    #[serde(default)]
    pub federations: BTreeMap<String, String>,

    /// Domain suffix -> nameservers that queries under it are forwarded to
    ///
    /// Nameservers are `ip` or `ip:port` (port defaults to 53).
    #[serde(rename = "stubDomains", default)]
    pub stub_domains: BTreeMap<String, Vec<String>>,

    /// Upstream nameservers, overriding the ones inherited from the node
    #[serde(rename = "upstreamNameservers", default)]
    pub upstream_nameservers: Vec<String>,
}

impl Config {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a federation
    pub fn with_federation(mut self, name: impl Into<String>, domain: impl Into<String>) -> Self {
        self.federations.insert(name.into(), domain.into());
        self
    }

    /// Add a stub domain and its nameservers
    pub fn with_stub_domain<I, S>(mut self, domain: impl Into<String>, nameservers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stub_domains
            .insert(domain.into(), nameservers.into_iter().map(Into::into).collect());
        self
    }

    /// Set the upstream nameservers
    pub fn with_upstream_nameservers<I, S>(mut self, nameservers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upstream_nameservers = nameservers.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the configuration
    ///
    /// Runs the federation, stub domain and upstream nameserver passes in
    /// that order and stops at the first failure.
    pub fn validate(&self) -> Result<(), crate::validation::ValidationError> {
        crate::validation::validate(self)
    }
}

/// Bootstrap settings for the sync layer
///
/// At most one of `config_map` and `config_dir` may be set. With neither,
/// the static source is built from `federations` and `name_servers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Cluster domain served by the resolver
    #[serde(default = "default_cluster_domain")]
    pub cluster_domain: String,

    /// Namespace of the ConfigMap
    #[serde(default = "default_config_map_namespace")]
    pub config_map_namespace: String,

    /// ConfigMap name (empty = not used)
    #[serde(default)]
    pub config_map: String,

    /// Directory to read config fragments from (empty = not used)
    #[serde(default)]
    pub config_dir: String,

    /// How often the directory is re-read
    ///
    /// Serialized as (possibly fractional) seconds.
    #[serde(
        rename = "config_period_secs",
        with = "period_secs",
        default = "default_config_period"
    )]
    pub config_period: Duration,

    /// Upper bound for the initial fetch (in seconds)
    ///
    /// Set to 0 to wait indefinitely.
    #[serde(default = "default_initial_sync_timeout_secs")]
    pub initial_sync_timeout_secs: u64,

    /// Federations used by the static source
    #[serde(default)]
    pub federations: BTreeMap<String, String>,

    /// Comma-separated upstream nameservers used by the static source
    #[serde(default)]
    pub name_servers: String,
}

/// The config source picked from [`SyncSettings`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// Watch a ConfigMap
    ConfigMap {
        /// ConfigMap namespace
        namespace: String,
        /// ConfigMap name
        name: String,
    },

    /// Poll a directory
    Directory {
        /// Directory path
        path: PathBuf,
        /// Poll period
        period: Duration,
    },

    /// Use the values from settings, never updated
    Static,
}

impl SyncSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self {
            cluster_domain: default_cluster_domain(),
            config_map_namespace: default_config_map_namespace(),
            config_map: String::new(),
            config_dir: String::new(),
            config_period: default_config_period(),
            initial_sync_timeout_secs: default_initial_sync_timeout_secs(),
            federations: BTreeMap::new(),
            name_servers: String::new(),
        }
    }

    /// Read configuration from a ConfigMap
    pub fn with_config_map(mut self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.config_map_namespace = namespace.into();
        self.config_map = name.into();
        self
    }

    /// Read configuration from a directory every `period`
    pub fn with_config_dir(mut self, dir: impl Into<String>, period: Duration) -> Self {
        self.config_dir = dir.into();
        self.config_period = period;
        self
    }

    /// Set the static upstream nameservers (comma-separated)
    pub fn with_name_servers(mut self, name_servers: impl Into<String>) -> Self {
        self.name_servers = name_servers.into();
        self
    }

    /// Add a static federation
    pub fn with_federation(mut self, name: impl Into<String>, domain: impl Into<String>) -> Self {
        self.federations.insert(name.into(), domain.into());
        self
    }

    /// Directory poll period
    pub fn config_period(&self) -> Duration {
        self.config_period
    }

    /// Initial fetch timeout, `None` when disabled
    pub fn initial_sync_timeout(&self) -> Option<Duration> {
        match self.initial_sync_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Resolve which config source these settings select
    ///
    /// Selecting both a ConfigMap and a directory is an error: no source
    /// can be built from such settings.
    pub fn source(&self) -> Result<SourceSelection, crate::Error> {
        match (self.config_map.is_empty(), self.config_dir.is_empty()) {
            (false, false) => Err(crate::Error::config(
                "Cannot use both ConfigMap and ConfigDir",
            )),
            (false, true) => {
                if self.config_map_namespace.is_empty() {
                    return Err(crate::Error::config("ConfigMap namespace cannot be empty"));
                }
                Ok(SourceSelection::ConfigMap {
                    namespace: self.config_map_namespace.clone(),
                    name: self.config_map.clone(),
                })
            }
            (true, false) => {
                if self.config_period.is_zero() {
                    return Err(crate::Error::config("ConfigDir period must be > 0"));
                }
                Ok(SourceSelection::Directory {
                    path: PathBuf::from(&self.config_dir),
                    period: self.config_period(),
                })
            }
            (true, true) => Ok(SourceSelection::Static),
        }
    }

    /// Build the configuration served by the static source
    pub fn static_config(&self) -> Config {
        Config {
            federations: self.federations.clone(),
            stub_domains: BTreeMap::new(),
            upstream_nameservers: self
                .name_servers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::new()
    }
}

fn default_cluster_domain() -> String {
    "cluster.local.".to_string()
}

fn default_config_map_namespace() -> String {
    "kube-system".to_string()
}

fn default_config_period() -> Duration {
    Duration::from_secs(10)
}

fn default_initial_sync_timeout_secs() -> u64 {
    60
}

mod period_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(period: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(period.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
