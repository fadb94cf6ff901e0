//! Core data model definitions shared across reelhouse crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod asset;
pub mod content;
pub mod error;
pub mod ids;
pub mod my_list;
pub mod watch;

// Intentionally curated re-exports for downstream consumers.
pub use asset::{
    AssetKind, ImageVariant, LocalFile, UploadedImage, UploadedVideo,
    extension_for_mime, format_file_size, mime_for_extension,
};
pub use content::{
    ContentRecord, ContentSummary, DEFAULT_CATEGORY, ModerationStatus,
    NewContent,
};
pub use error::{ModelError, Result as ModelResult};
pub use ids::ContentId;
pub use my_list::MyListEntry;
pub use watch::{
    COMPLETION_THRESHOLD_PERCENT, PercentWindow, RESUME_MIN_PERCENT,
    WatchProgress, WatchState, format_progress_percentage,
    format_progress_time, progress_percentage,
};
