//! Playback progress: per-pair upserts, derived watch state, and automatic
//! checkpointing during playback.

pub mod checkpoint;
pub mod tracker;

pub use checkpoint::{CheckpointStatus, PlaybackCheckpointer};
pub use tracker::{WatchProgressTracker, WatchedItem};
