//! Contract Test: Static Source
//!
//! The static source serves one value and then stays silent.
//!
//! Constraints verified:
//! - fetch_once() returns the configured value without error
//! - stream() never yields and never completes
//! - A consumer looping over the stream just waits

mod common;

use common::*;
use dnssync_core::{ConfigSync, StaticSync, apply_updates};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn fetch_once_returns_static_value() {
    let config = upstream_config(&["8.8.8.8"]);
    let sync = StaticSync::new(config.clone());

    assert_eq!(sync.fetch_once().await.unwrap(), config);
}

#[test]
fn stream_stays_pending_across_polls() {
    let sync = StaticSync::new(upstream_config(&["8.8.8.8"]));
    let mut stream = tokio_test::task::spawn(sync.stream());

    for _ in 0..1000 {
        tokio_test::assert_pending!(stream.poll_next());
    }
    assert!(!stream.is_woken(), "static stream never wakes its consumer");
}

#[tokio::test]
async fn consumer_loop_never_invoked() {
    let sync = StaticSync::new(upstream_config(&["8.8.8.8"]));
    let applied = Arc::new(AtomicUsize::new(0));

    let counter = applied.clone();
    let consumer = tokio::spawn(apply_updates(sync.stream(), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!consumer.is_finished(), "stream does not complete");
    assert_eq!(applied.load(Ordering::SeqCst), 0);
    consumer.abort();
}
