//! Contract Test: Directory Source
//!
//! The directory source re-reads its directory on every tick.
//!
//! Constraints verified:
//! - fetch_once() reads and validates the directory
//! - A whole-object file is read whatever its name
//! - Every successful tick delivers a snapshot, changed or not
//! - A failed tick (unreadable or invalid) delivers nothing and the
//!   following ticks still fire

mod common;

use common::*;
use dnssync_core::{Config, ConfigSync, DirectorySync, Error, SyncEngine, SyncSettings};
use std::time::Duration;
use tempfile::tempdir;

const PERIOD: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn end_to_end_initial_config_from_directory() {
    let dir = tempdir().unwrap();
    write_atomic(
        dir.path(),
        "dns.json",
        r#"{"upstreamNameservers":["8.8.8.8","8.8.4.4"]}"#,
    )
    .await;

    let settings = SyncSettings::new().with_config_dir(
        dir.path().to_str().unwrap(),
        Duration::from_secs(10),
    );
    let engine = SyncEngine::from_settings(&settings, None).unwrap();
    assert_eq!(engine.source_name(), "directory");

    let mut received = Vec::new();
    let handle = engine
        .start(|config| received.push(config), |_updates| async {})
        .await
        .expect("initial fetch succeeds");
    handle.await.unwrap();

    assert_eq!(received.len(), 1, "on_initial is called exactly once");
    assert_eq!(received[0].upstream_nameservers, vec!["8.8.8.8", "8.8.4.4"]);
    assert!(received[0].federations.is_empty());
    assert!(received[0].stub_domains.is_empty());
}

#[tokio::test]
async fn whole_object_file_read_under_any_name() {
    let dir = tempdir().unwrap();
    write_atomic(
        dir.path(),
        "config",
        r#"{"upstreamNameservers":["8.8.8.8","8.8.4.4"]}"#,
    )
    .await;

    let config = DirectorySync::new(dir.path(), PERIOD).fetch_once().await.unwrap();
    assert_eq!(config.upstream_nameservers, vec!["8.8.8.8", "8.8.4.4"]);
}

#[tokio::test]
async fn per_key_files_are_read() {
    let dir = tempdir().unwrap();
    write_atomic(dir.path(), "federations", "myfed=example.com").await;
    write_atomic(dir.path(), "stubDomains", r#"{"acme.local":["1.2.3.4:5353"]}"#).await;
    write_atomic(dir.path(), "upstreamNameservers", r#"["10.0.0.1"]"#).await;

    let config = DirectorySync::new(dir.path(), PERIOD).fetch_once().await.unwrap();

    let expected = Config::new()
        .with_federation("myfed", "example.com")
        .with_stub_domain("acme.local", ["1.2.3.4:5353"])
        .with_upstream_nameservers(["10.0.0.1"]);
    assert_eq!(config, expected);
}

#[tokio::test]
async fn invalid_directory_fails_fetch_once() {
    let dir = tempdir().unwrap();
    write_atomic(dir.path(), "stubDomains", r#"{"UPPER.local":["1.2.3.4"]}"#).await;

    let result = DirectorySync::new(dir.path(), PERIOD).fetch_once().await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn every_tick_delivers_a_snapshot() {
    let dir = tempdir().unwrap();
    write_atomic(dir.path(), "upstreamNameservers", r#"["8.8.8.8"]"#).await;

    let sync = DirectorySync::new(dir.path(), PERIOD);
    let mut updates = sync.stream();

    // Unchanged contents are delivered again on each tick
    for _ in 0..3 {
        assert_eq!(next_within(&mut updates, WAIT).await, upstream_config(&["8.8.8.8"]));
    }

    write_atomic(dir.path(), "upstreamNameservers", r#"["1.1.1.1"]"#).await;
    let mut latest = next_within(&mut updates, WAIT).await;
    while latest != upstream_config(&["1.1.1.1"]) {
        latest = next_within(&mut updates, WAIT).await;
    }
}

#[tokio::test]
async fn invalid_tick_is_skipped_and_polling_continues() {
    let dir = tempdir().unwrap();
    write_atomic(dir.path(), "upstreamNameservers", r#"["8.8.8.8"]"#).await;

    let sync = DirectorySync::new(dir.path(), PERIOD);
    let mut updates = sync.stream();
    next_within(&mut updates, WAIT).await;

    // Too many upstreams: every tick fails validation
    write_atomic(
        dir.path(),
        "upstreamNameservers",
        r#"["1.1.1.1","1.0.0.1","8.8.8.8","8.8.4.4"]"#,
    )
    .await;
    // Drain anything read before the write landed
    while tokio::time::timeout(PERIOD * 3, tokio_stream::StreamExt::next(&mut updates))
        .await
        .is_ok()
    {}
    assert_silent(&mut updates, PERIOD * 6).await;

    // Later ticks still fire once the directory is fixed
    write_atomic(dir.path(), "upstreamNameservers", r#"["9.9.9.9"]"#).await;
    assert_eq!(next_within(&mut updates, WAIT).await, upstream_config(&["9.9.9.9"]));
}

#[tokio::test]
async fn unreadable_directory_is_skipped_and_polling_continues() {
    let root = tempdir().unwrap();
    let dir = root.path().join("config");
    tokio::fs::create_dir(&dir).await.unwrap();
    write_atomic(&dir, "upstreamNameservers", r#"["8.8.8.8"]"#).await;

    let sync = DirectorySync::new(&dir, PERIOD);
    let mut updates = sync.stream();
    next_within(&mut updates, WAIT).await;

    tokio::fs::remove_dir_all(&dir).await.unwrap();
    while tokio::time::timeout(PERIOD * 3, tokio_stream::StreamExt::next(&mut updates))
        .await
        .is_ok()
    {}
    assert_silent(&mut updates, PERIOD * 6).await;

    // Swap the directory back in whole, an empty one would be a valid config
    let staging = root.path().join(".staging");
    tokio::fs::create_dir(&staging).await.unwrap();
    write_atomic(&staging, "upstreamNameservers", r#"["1.1.1.1"]"#).await;
    tokio::fs::rename(&staging, &dir).await.unwrap();
    assert_eq!(next_within(&mut updates, WAIT).await, upstream_config(&["1.1.1.1"]));
}
