//! Queue polling that runs only while the engine reports "running".

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::EngineClient;
use crate::push::{EngineEvent, EventSender, forward};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Owns at most one poll task.
pub struct PollScheduler {
    client: EngineClient,
    tx: EventSender,
    interval: Duration,
    active: Option<(CancellationToken, JoinHandle<()>)>,
}

impl PollScheduler {
    pub fn new(client: EngineClient, tx: EventSender, interval: Duration) -> Self {
        Self {
            client,
            tx,
            interval,
            active: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Start or stop polling. Setting the current state again does nothing.
    pub fn set_running(&mut self, running: bool) {
        match (running, self.active.is_some()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => {}
        }
    }

    fn start(&mut self) {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            self.client.clone(),
            self.tx.clone(),
            self.interval,
            cancel.clone(),
        ));
        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "polling started");
        self.active = Some((cancel, handle));
    }

    fn stop(&mut self) {
        if let Some((cancel, _handle)) = self.active.take() {
            cancel.cancel();
            tracing::debug!("polling stopped");
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    client: EngineClient,
    tx: EventSender,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            r = client.get_queue_status() => r,
        };
        match result {
            Ok(tasks) => forward(&tx, EngineEvent::QueuePolled { tasks }),
            Err(e) => tracing::debug!(error = %e, "queue poll failed"),
        }
    }
}
