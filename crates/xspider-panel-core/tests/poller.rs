//! Poll scheduling on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use xspider_panel_core::mock::MockEngine;
use xspider_panel_core::poller::{DEFAULT_POLL_INTERVAL, PollScheduler};
use xspider_panel_core::push::{self, BackendEvent, EngineEvent};
use xspider_panel_core::{EngineClient, EngineError, Task, TaskStatus};

fn assert_near(elapsed: Duration, expected: Duration) {
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(50),
        "elapsed {elapsed:?}, expected {expected:?}"
    );
}

fn scheduler(engine: &Arc<MockEngine>) -> (PollScheduler, push::EventReceiver) {
    let (tx, rx) = push::channel();
    let client = EngineClient::new(engine.clone());
    (PollScheduler::new(client, tx, DEFAULT_POLL_INTERVAL), rx)
}

#[tokio::test(start_paused = true)]
async fn polls_every_interval_while_running() {
    let engine = Arc::new(
        MockEngine::new().with_tasks(vec![Task::new("a", TaskStatus::Running, 1)]),
    );
    let (mut poller, mut rx) = scheduler(&engine);
    let started = tokio::time::Instant::now();

    poller.set_running(true);
    assert!(poller.is_running());

    let event = rx.recv().await.unwrap();
    assert_near(started.elapsed(), DEFAULT_POLL_INTERVAL);
    assert_eq!(
        event,
        BackendEvent::Engine(EngineEvent::QueuePolled {
            tasks: vec![Task::new("a", TaskStatus::Running, 1)]
        })
    );

    rx.recv().await.unwrap();
    assert_near(started.elapsed(), DEFAULT_POLL_INTERVAL * 2);
    assert_eq!(engine.count_of("get_queue_status"), 2);
}

#[tokio::test(start_paused = true)]
async fn no_poll_after_stop() {
    let engine = Arc::new(MockEngine::new());
    let (mut poller, mut rx) = scheduler(&engine);

    poller.set_running(true);
    rx.recv().await.unwrap();
    poller.set_running(false);
    assert!(!poller.is_running());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(engine.count_of("get_queue_status"), 1);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn repeated_start_keeps_single_task() {
    let engine = Arc::new(MockEngine::new());
    let (mut poller, mut rx) = scheduler(&engine);

    poller.set_running(true);
    poller.set_running(true);
    rx.recv().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(engine.count_of("get_queue_status"), 1);
}

#[tokio::test(start_paused = true)]
async fn poll_failures_are_not_surfaced() {
    let engine = Arc::new(MockEngine::new());
    engine.fail_next("get_queue_status", EngineError::Status(503));
    let (mut poller, mut rx) = scheduler(&engine);

    poller.set_running(true);
    let started = tokio::time::Instant::now();
    // The first tick fails silently; the second one delivers.
    rx.recv().await.unwrap();
    assert_near(started.elapsed(), DEFAULT_POLL_INTERVAL * 2);
    assert_eq!(engine.count_of("get_queue_status"), 2);
}
