//! Periodic progress saves while an item is playing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reelhouse_model::ContentId;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use super::WatchProgressTracker;

/// Outcome of checkpoint writes so far. Failed saves never interrupt
/// playback; they only show up here and in the logs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointStatus {
    pub saves: u64,
    pub failures: u64,
    /// Error from the most recent write, cleared by the next success.
    pub last_error: Option<String>,
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl CheckpointStatus {
    pub fn last_save_failed(&self) -> bool {
        self.last_error.is_some()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Playhead {
    position_seconds: f64,
    duration_seconds: f64,
    playing: bool,
    reported: bool,
}

struct Shared {
    tracker: Arc<WatchProgressTracker>,
    user_id: Uuid,
    content_id: ContentId,
    playhead: Mutex<Playhead>,
    status: Mutex<CheckpointStatus>,
}

impl Shared {
    async fn save(&self, playhead: Playhead) {
        let result = self
            .tracker
            .record_progress(
                self.user_id,
                self.content_id,
                playhead.position_seconds,
                playhead.duration_seconds,
            )
            .await;

        let mut status = self.status.lock();
        match result {
            Ok(saved) => {
                status.saves += 1;
                status.last_error = None;
                status.last_saved_at = Some(saved.last_watched_at);
            }
            Err(err) => {
                warn!(
                    user_id = %self.user_id,
                    content_id = %self.content_id,
                    error = %err,
                    "watch progress checkpoint failed"
                );
                status.failures += 1;
                status.last_error = Some(err.to_string());
            }
        }
    }

    async fn tick(&self) {
        let playhead = *self.playhead.lock();
        if playhead.playing && playhead.duration_seconds > 0.0 {
            self.save(playhead).await;
        } else {
            debug!(content_id = %self.content_id, "checkpoint skipped, not playing");
        }
    }
}

/// Saves the playhead on a fixed interval while playing, and once more on
/// [`close`](Self::close).
///
/// Dropping the checkpointer stops the timer without a final save.
pub struct PlaybackCheckpointer {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PlaybackCheckpointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCheckpointer")
            .field("user_id", &self.shared.user_id)
            .field("content_id", &self.shared.content_id)
            .field("status", &*self.shared.status.lock())
            .finish()
    }
}

impl PlaybackCheckpointer {
    /// Must be called inside a tokio runtime. Playback starts paused until
    /// [`set_playing`](Self::set_playing) says otherwise.
    pub fn start(
        tracker: Arc<WatchProgressTracker>,
        user_id: Uuid,
        content_id: ContentId,
        interval: Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            tracker,
            user_id,
            content_id,
            playhead: Mutex::new(Playhead::default()),
            status: Mutex::new(CheckpointStatus::default()),
        });
        let cancel = CancellationToken::new();

        let task = tokio::spawn({
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            async move {
                let mut ticks = interval_at(Instant::now() + interval, interval);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = ticks.tick() => shared.tick().await,
                    }
                }
            }
        });

        Self {
            shared,
            cancel,
            task: Some(task),
        }
    }

    /// Latest position from the player.
    pub fn report(&self, position_seconds: f64, duration_seconds: f64) {
        let mut playhead = self.shared.playhead.lock();
        playhead.position_seconds = position_seconds;
        playhead.duration_seconds = duration_seconds;
        playhead.reported = true;
    }

    pub fn set_playing(&self, playing: bool) {
        self.shared.playhead.lock().playing = playing;
    }

    pub fn status(&self) -> CheckpointStatus {
        self.shared.status.lock().clone()
    }

    /// Stops the timer and writes the last reported position once.
    pub async fn close(mut self) -> CheckpointStatus {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(error = %err, "checkpoint timer ended abnormally");
        }

        let playhead = *self.shared.playhead.lock();
        if playhead.reported {
            self.shared.save(playhead).await;
        }
        self.status()
    }
}

impl Drop for PlaybackCheckpointer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
