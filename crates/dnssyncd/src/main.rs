// # dnssyncd - DNS Config Sync Daemon
//
// The dnssyncd daemon is a thin integration layer over dnssync-core:
// 1. Reading settings from environment variables
// 2. Initializing logging and the runtime
// 3. Selecting the config source (ConfigMap, directory or static)
// 4. Logging the initial configuration and every update until shutdown
//
// All sync logic lives in dnssync-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Source selection (ConfigMap and directory are mutually exclusive)
// - `DNSSYNC_CONFIGMAP`: ConfigMap name
// - `DNSSYNC_CONFIGMAP_NAMESPACE`: ConfigMap namespace (default: kube-system)
// - `DNSSYNC_CONFIG_DIR`: Directory to read config files from
// - `DNSSYNC_CONFIG_PERIOD_SECS`: Directory poll period (default: 10)
//
// ### Static values (used when neither source is set)
// - `DNSSYNC_NAMESERVERS`: Comma-separated upstream nameservers
// - `DNSSYNC_FEDERATIONS`: Federations as `name=domain,...`
//
// ### General
// - `DNSSYNC_CLUSTER_DOMAIN`: Cluster domain (default: cluster.local.)
// - `DNSSYNC_INITIAL_SYNC_TIMEOUT_SECS`: Initial fetch timeout, 0 = none (default: 60)
// - `DNSSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DNSSYNC_CONFIG_DIR=/etc/kube-dns
// export DNSSYNC_CONFIG_PERIOD_SECS=10
//
// dnssyncd
// ```

use anyhow::{Context, Result};
use dnssync_core::validation::parse_federations_flag;
use dnssync_core::{Config as DnsConfig, ConfigMapClient, SyncEngine, SyncSettings, apply_updates};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum SyncdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SyncdExitCode> for ExitCode {
    fn from(code: SyncdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    cluster_domain: Option<String>,
    config_map: Option<String>,
    config_map_namespace: Option<String>,
    config_dir: Option<String>,
    config_period_secs: Option<u64>,
    initial_sync_timeout_secs: Option<u64>,
    name_servers: String,
    federations: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            cluster_domain: non_empty_var("DNSSYNC_CLUSTER_DOMAIN"),
            config_map: non_empty_var("DNSSYNC_CONFIGMAP"),
            config_map_namespace: non_empty_var("DNSSYNC_CONFIGMAP_NAMESPACE"),
            config_dir: non_empty_var("DNSSYNC_CONFIG_DIR"),
            config_period_secs: parse_var("DNSSYNC_CONFIG_PERIOD_SECS")?,
            initial_sync_timeout_secs: parse_var("DNSSYNC_INITIAL_SYNC_TIMEOUT_SECS")?,
            name_servers: env::var("DNSSYNC_NAMESERVERS").unwrap_or_default(),
            federations: env::var("DNSSYNC_FEDERATIONS").unwrap_or_default(),
            log_level: env::var("DNSSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.config_map.is_some() && self.config_dir.is_some() {
            anyhow::bail!(
                "DNSSYNC_CONFIGMAP and DNSSYNC_CONFIG_DIR cannot both be set. \
                Pick one configuration source."
            );
        }

        if let Some(period) = self.config_period_secs
            && period == 0
        {
            anyhow::bail!("DNSSYNC_CONFIG_PERIOD_SECS must be greater than 0");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNSSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the sync settings
    fn settings(&self) -> Result<SyncSettings> {
        let mut settings = SyncSettings::new().with_name_servers(self.name_servers.clone());

        settings.federations = parse_federations_flag(&self.federations)
            .context("DNSSYNC_FEDERATIONS is not valid")?;

        if let Some(ref domain) = self.cluster_domain {
            settings.cluster_domain = domain.clone();
        }
        if let Some(ref namespace) = self.config_map_namespace {
            settings.config_map_namespace = namespace.clone();
        }
        if let Some(ref name) = self.config_map {
            settings.config_map = name.clone();
        }
        if let Some(ref dir) = self.config_dir {
            settings.config_dir = dir.clone();
        }
        if let Some(period) = self.config_period_secs {
            settings.config_period = Duration::from_secs(period);
        }
        if let Some(timeout) = self.initial_sync_timeout_secs {
            settings.initial_sync_timeout_secs = timeout;
        }

        Ok(settings)
    }

    fn max_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var(name: &str) -> Result<Option<u64>> {
    non_empty_var(name)
        .map(|v| {
            v.trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds. Got: {}", name, v))
        })
        .transpose()
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncdExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SyncdExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.max_log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncdExitCode::ConfigError.into();
    }

    info!("Starting dnssyncd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncdExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let engine = match start_sync(&config).await {
            Ok(engine) => engine,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return SyncdExitCode::ConfigError;
            }
        };

        match wait_for_shutdown().await {
            Ok(signal) => {
                info!("Received shutdown signal: {}", signal);
                info!("Shutting down daemon ({} source)", engine.source_name());
                SyncdExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Shutdown error: {:#}", e);
                SyncdExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Select the config source, apply the initial config and start following updates
async fn start_sync(config: &Config) -> Result<SyncEngine> {
    let settings = config.settings()?;
    info!("Cluster domain: {}", settings.cluster_domain);

    let client = configmap_client(&settings).await?;
    let engine = SyncEngine::from_settings(&settings, client)?;

    engine
        .start(
            |initial| log_config("Initial configuration", &initial),
            |updates| apply_updates(updates, |update| log_config("Configuration updated", &update)),
        )
        .await
        .context("Initial configuration sync failed")?;

    info!("Following {} configuration updates", engine.source_name());
    Ok(engine)
}

fn log_config(what: &str, config: &DnsConfig) {
    info!(
        "{}: {} federation(s), {} stub domain(s), upstream nameservers [{}]",
        what,
        config.federations.len(),
        config.stub_domains.len(),
        config.upstream_nameservers.join(", ")
    );
    for (domain, nameservers) in &config.stub_domains {
        debug!("Stub domain {} -> [{}]", domain, nameservers.join(", "));
    }
    for (name, domain) in &config.federations {
        debug!("Federation {} -> {}", name, domain);
    }
}

/// Build the control-plane client when a ConfigMap is selected
#[cfg(feature = "kube")]
async fn configmap_client(settings: &SyncSettings) -> Result<Option<Arc<dyn ConfigMapClient>>> {
    use dnssync_core::SourceSelection;

    if !matches!(settings.source()?, SourceSelection::ConfigMap { .. }) {
        return Ok(None);
    }

    let client = kube::Client::try_default()
        .await
        .context("Failed to create a Kubernetes client")?;
    Ok(Some(Arc::new(dnssync_kube::KubeConfigMapClient::new(client))))
}

/// Without Kubernetes support a ConfigMap selection fails in source selection
#[cfg(not(feature = "kube"))]
async fn configmap_client(_settings: &SyncSettings) -> Result<Option<Arc<dyn ConfigMapClient>>> {
    Ok(None)
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
