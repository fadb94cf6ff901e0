//! Playback progress records and their derived classification.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ids::ContentId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Percentage at or above which an item counts as watched.
pub const COMPLETION_THRESHOLD_PERCENT: f64 = 95.0;

/// Percentage below which an item is not worth offering for resume.
pub const RESUME_MIN_PERCENT: f64 = 5.0;

/// Latest playback position for one (user, content) pair.
///
/// The store keeps exactly one of these per pair and always reflects the last
/// write, so a rewatch can lower the percentage again.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchProgress {
    pub user_id: Uuid,
    pub content_id: ContentId,
    pub progress_time_seconds: f64,
    pub progress_percentage: f64,
    pub last_watched_at: DateTime<Utc>,
}

impl WatchProgress {
    pub fn state(&self) -> WatchState {
        WatchState::from_percentage(self.progress_percentage)
    }
}

/// Read-time classification of a progress row. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum WatchState {
    NoProgress,
    InProgress { percentage: f64 },
    Completed,
}

impl WatchState {
    pub fn from_percentage(percentage: f64) -> Self {
        if !percentage.is_finite() || percentage <= 0.0 {
            WatchState::NoProgress
        } else if percentage >= COMPLETION_THRESHOLD_PERCENT {
            WatchState::Completed
        } else {
            WatchState::InProgress { percentage }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, WatchState::Completed)
    }
}

/// Half-open percentage range `[min, max)` used to filter progress listings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentWindow {
    pub min: f64,
    pub max_exclusive: f64,
}

impl PercentWindow {
    /// Every row, including completed ones.
    pub const ALL: PercentWindow = PercentWindow {
        min: f64::NEG_INFINITY,
        max_exclusive: f64::INFINITY,
    };

    /// Started but not finished: `[5, 95)`.
    pub const CONTINUE_WATCHING: PercentWindow = PercentWindow {
        min: RESUME_MIN_PERCENT,
        max_exclusive: COMPLETION_THRESHOLD_PERCENT,
    };

    pub fn contains(&self, percentage: f64) -> bool {
        percentage >= self.min && percentage < self.max_exclusive
    }

    pub fn is_unbounded(&self) -> bool {
        self.min == f64::NEG_INFINITY && self.max_exclusive == f64::INFINITY
    }
}

/// `time / duration * 100`, clamped to `[0, 100]`.
///
/// Returns 0 when the duration is zero, negative or unknown.
pub fn progress_percentage(time_seconds: f64, duration_seconds: f64) -> f64 {
    if !duration_seconds.is_finite()
        || duration_seconds <= 0.0
        || !time_seconds.is_finite()
    {
        return 0.0;
    }
    (time_seconds / duration_seconds * 100.0).clamp(0.0, 100.0)
}

/// `m:ss`, or `h:mm:ss` once past the hour.
pub fn format_progress_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

pub fn format_progress_percentage(percentage: f64) -> i64 {
    percentage.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_means_zero_percent() {
        assert_eq!(progress_percentage(30.0, 0.0), 0.0);
        assert_eq!(progress_percentage(1e9, 0.0), 0.0);
        assert_eq!(progress_percentage(30.0, f64::NAN), 0.0);
        assert_eq!(progress_percentage(30.0, -5.0), 0.0);
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(progress_percentage(60.0, 120.0), 50.0);
        assert_eq!(progress_percentage(500.0, 120.0), 100.0);
        assert_eq!(progress_percentage(-1.0, 120.0), 0.0);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(WatchState::from_percentage(0.0), WatchState::NoProgress);
        assert_eq!(
            WatchState::from_percentage(50.0),
            WatchState::InProgress { percentage: 50.0 }
        );
        assert_eq!(WatchState::from_percentage(95.0), WatchState::Completed);
    }

    #[test]
    fn continue_window_is_half_open() {
        let window = PercentWindow::CONTINUE_WATCHING;
        assert!(!window.contains(4.99));
        assert!(window.contains(5.0));
        assert!(window.contains(94.99));
        assert!(!window.contains(95.0));
        assert!(PercentWindow::ALL.contains(100.0));
        assert!(PercentWindow::ALL.is_unbounded());
    }

    #[test]
    fn progress_time_formatting() {
        assert_eq!(format_progress_time(0.0), "0:00");
        assert_eq!(format_progress_time(65.7), "1:05");
        assert_eq!(format_progress_time(3725.0), "1:02:05");
        assert_eq!(format_progress_percentage(49.5), 50);
    }
}
