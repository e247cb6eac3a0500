//! Cancellable periodic refresh, bound to the screen's visible
//! lifetime.
//!
//! One owned handle drives the screen's scheduled re-fetches: the
//! event loop drains ticks and reloads the job; cancelling (or
//! dropping) the handle stops the background task promptly and no tick
//! is delivered afterwards.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct RefreshTask {
    ticks: mpsc::Receiver<()>,
    cancel: CancellationToken,
}

impl RefreshTask {
    /// Spawn the tick source. The first tick arrives one full `period`
    /// after the spawn, not immediately; the caller already holds a
    /// fresh snapshot when the screen opens.
    pub fn spawn(period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let (tx, ticks) = mpsc::channel(1);
        let token = cancel.clone();

        tokio::spawn(async move {
            tracing::debug!(period_secs = period.as_secs(), "refresh task started");
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await; // immediate first tick, swallowed
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(()).await.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("refresh task stopped");
        });

        Self { ticks, cancel }
    }

    /// Wait for the next tick. Returns `None` once the task has been
    /// cancelled, even if a tick was already queued.
    pub async fn tick(&mut self) -> Option<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            tick = self.ticks.recv() => tick,
        }
    }

    /// Non-blocking probe used from the event loop between key polls.
    pub fn try_tick(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.ticks.try_recv().is_ok()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
