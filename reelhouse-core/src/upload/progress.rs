//! Synthetic upload progress.
//!
//! The HTTP transport does not report byte-level progress, so uploads show a
//! percentage that climbs on a fixed interval and stops short of completion
//! until the host answers.

use std::pin::Pin;

use futures::{Stream, StreamExt, stream};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_stream::wrappers::IntervalStream;
use tokio_util::sync::CancellationToken;

use super::UploadPolicy;

/// Receives progress percentages in `0..=100`.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// `step, 2*step, ...` up to and including `cap`.
///
/// The sequence is finite and consumed as it is read; a zero step yields
/// nothing.
pub fn progress_steps(step: u8, cap: u8) -> impl Iterator<Item = u8> + Send {
    let count = if step == 0 { 0 } else { cap / step };
    (1..=count).map(move |i| i * step)
}

/// Emits [`progress_steps`] on the policy interval until stopped, exhausted,
/// or dropped.
///
/// The ticker holds a child of the caller's cancellation token, so cancelling
/// the surrounding operation silences it too. It is polled in the same task
/// as the upload, so there is no background timer to leak.
pub struct ProgressTicker {
    ticks: Pin<Box<dyn Stream<Item = u8> + Send>>,
    stop: CancellationToken,
    exhausted: bool,
}

impl std::fmt::Debug for ProgressTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTicker")
            .field("stopped", &self.stop.is_cancelled())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

impl ProgressTicker {
    /// A zero `progress_interval` gives an inert ticker: nothing is emitted
    /// before [`finish`](Self::finish) reports 100.
    pub fn start(policy: &UploadPolicy, parent: &CancellationToken) -> Self {
        let period = policy.progress_interval;
        if period.is_zero() {
            return Self {
                ticks: Box::pin(stream::empty()),
                stop: parent.child_token(),
                exhausted: true,
            };
        }

        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let ticks = IntervalStream::new(interval)
            .zip(stream::iter(progress_steps(
                policy.progress_step,
                policy.progress_cap,
            )))
            .map(|(_, percent)| percent);

        Self {
            ticks: Box::pin(ticks),
            stop: parent.child_token(),
            exhausted: false,
        }
    }

    /// Next synthetic value, or `None` once the ticker is stopped or has
    /// reached its cap.
    pub async fn next(&mut self) -> Option<u8> {
        if self.exhausted || self.stop.is_cancelled() {
            return None;
        }
        let next = tokio::select! {
            biased;
            _ = self.stop.cancelled() => None,
            percent = self.ticks.next() => percent,
        };
        if next.is_none() {
            self.exhausted = true;
        }
        next
    }

    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Stops the ticker and reports completion exactly once.
    pub fn finish(self, sink: &dyn ProgressSink) {
        self.stop();
        sink.report(100);
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
