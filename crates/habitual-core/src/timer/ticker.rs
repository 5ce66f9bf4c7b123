//! Cancellable one-second tick source.
//!
//! [`Ticker`] spawns a background tokio task that emits a tick every period
//! until it is cancelled. The task never touches timer state; it only sends
//! on a channel whose receiver the `Ticker` owns, so dropping the `Ticker`
//! both stops the task and discards any tick already in flight.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Ticker {
    rx: mpsc::Receiver<Instant>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the tick task. The first tick fires one `period` from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(?period, "ticker started");

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("ticker cancelled");
                        break;
                    }
                    at = interval.tick() => {
                        // A full channel means the owner is behind; the
                        // engine catches up from the wall clock anyway.
                        if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(at) {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, cancel, handle }
    }

    /// Wait for the next tick.
    ///
    /// Returns `None` once the ticker has been cancelled and drained.
    pub async fn tick(&mut self) -> Option<Instant> {
        self.rx.recv().await
    }

    /// Cancel the task; no tick is delivered after this returns.
    pub fn stop(mut self) {
        self.cancel.cancel();
        self.rx.close();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
