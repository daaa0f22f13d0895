use crate::source::FeedSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info};
use webhook_core::{PollError, WebhookFeed};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 15_000;
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub type PollOutcome = Result<WebhookFeed, PollError>;

/// Repeating fetch cycle. Fetches once immediately, then every `interval`
/// until stopped or dropped. Fetches never overlap: a tick that fires while a
/// fetch is still running is skipped. Intervals below
/// [`MIN_POLL_INTERVAL`] are raised to it.
pub struct Poller {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn start<S: FeedSource>(
        source: Arc<S>,
        interval: Duration,
        sink: mpsc::Sender<PollOutcome>,
    ) -> Self {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (shutdown, mut stopped) = watch::channel(false);
        info!(
            event = "poller_start",
            source = %source.label(),
            interval_ms = interval.as_millis() as u64
        );
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {}
                }
                let outcome = tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    outcome = source.fetch() => outcome,
                };
                if *stopped.borrow() {
                    break;
                }
                if sink.send(outcome).await.is_err() {
                    debug!(event = "poller_sink_closed");
                    break;
                }
            }
        });
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Cancels scheduled fetches and drops any in-flight result. Idempotent.
    pub fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!(event = "poller_stop");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
