//! Minimal embedding example for dnssync-core
//!
//! The application supplies its own config source and owns the engine
//! lifecycle. Updates pushed by the application are validated before they
//! are handed to the engine, the same way the built-in sources do it.

use dnssync_core::{Config, ConfigStream, ConfigSync, Result, SyncEngine, apply_updates};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

/// Config source fed directly by the application
struct EmbeddedSync {
    current: Config,
    updates: Mutex<Option<mpsc::UnboundedReceiver<Config>>>,
}

impl EmbeddedSync {
    fn new(current: Config) -> (Self, mpsc::UnboundedSender<Config>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                current,
                updates: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait::async_trait]
impl ConfigSync for EmbeddedSync {
    async fn fetch_once(&self) -> Result<Config> {
        self.current.validate()?;
        Ok(self.current.clone())
    }

    fn stream(&self) -> ConfigStream {
        let receiver = self.updates.lock().ok().and_then(|mut rx| rx.take());
        match receiver {
            Some(rx) => Box::pin(UnboundedReceiverStream::new(rx)),
            None => Box::pin(tokio_stream::pending::<Config>()),
        }
    }

    fn source_name(&self) -> &'static str {
        "embedded"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    println!("=== Embedded dnssync-core Example ===\n");

    let initial = Config::new()
        .with_stub_domain("acme.local", ["1.2.3.4"])
        .with_upstream_nameservers(["8.8.8.8"]);
    let (source, updates) = EmbeddedSync::new(initial);

    println!("1. Creating engine...");
    let engine = SyncEngine::new(Box::new(source), Some(Duration::from_secs(5)));

    println!("2. Fetching the initial config and starting delivery...");
    let delivery = engine
        .start(
            |config| info!("Initial config: {:?}", config),
            |stream| apply_updates(stream, |config| info!("Update: {:?}", config)),
        )
        .await?;

    println!("3. Pushing updates from the application...\n");
    let candidates = [
        Config::new().with_upstream_nameservers(["1.1.1.1", "1.0.0.1"]),
        // Rejected: too many upstream nameservers
        Config::new().with_upstream_nameservers(["1.1.1.1", "1.0.0.1", "8.8.8.8", "8.8.4.4"]),
        Config::new().with_federation("myfed", "example.com"),
    ];
    for candidate in candidates {
        match candidate.validate() {
            Ok(()) => {
                let _ = updates.send(candidate);
            }
            Err(e) => warn!("Dropping invalid update: {}", e),
        }
    }

    // Closing the channel ends the update stream
    drop(updates);
    if tokio::time::timeout(Duration::from_secs(1), delivery).await.is_err() {
        warn!("Delivery task did not finish in time");
    }

    println!("\n4. Engine stopped cleanly.");
    println!("\n=== Embedding Successful ===");
    println!("Key Points:");
    println!("- The application owns the source and the engine");
    println!("- Invalid snapshots never reach the consumer");
    println!("- No global state");

    Ok(())
}
