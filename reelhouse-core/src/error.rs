use reelhouse_model::{AssetKind, format_file_size};
use thiserror::Error;

/// Failures reported by the relational store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error("unique constraint violated ({constraint:?})")]
    UniqueViolation { constraint: Option<String> },

    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UniqueViolation {
                    constraint: db.constraint().map(str::to_string),
                }
            }
            other => StoreError::Database(other),
        }
    }
}

/// Failures reported by a media host during upload or deletion.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The host answered with a non-2xx status or an unsuccessful envelope.
    /// `body` keeps the raw response for diagnostics.
    #[error("media host rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected media host response: {0}")]
    Malformed(String),

    #[error("could not read local file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("no active session")]
    Unauthenticated,

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error(
        "payload too large: {size_bytes} bytes exceeds the {limit_bytes} byte limit"
    )]
    PayloadTooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("{kind} upload failed: {source}")]
    UploadFailed {
        kind: AssetKind,
        #[source]
        source: UploadError,
    },

    #[error("persistence failed: {0}")]
    PersistenceFailed(#[from] StoreError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("content is already in the list")]
    AlreadyInList,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// A remote asset that was uploaded but is not referenced by any record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedAsset {
    pub kind: AssetKind,
    pub asset_id: String,
}

/// Outcome of a failed content registration.
///
/// The variants separate "nothing was submitted" from "your files reached the
/// media hosts but the record was not saved", which leaves orphaned assets
/// behind that the caller may want to clean up or retry with.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Rejected before any network call.
    #[error(transparent)]
    Rejected(CoreError),

    #[error("upload did not complete: {source}")]
    UploadFailed {
        orphaned: Vec<OrphanedAsset>,
        #[source]
        source: CoreError,
    },

    #[error("assets were uploaded but the record was not saved: {source}")]
    NotSaved {
        orphaned: Vec<OrphanedAsset>,
        #[source]
        source: CoreError,
    },
}

impl RegistrationError {
    pub fn cause(&self) -> &CoreError {
        match self {
            RegistrationError::Rejected(err) => err,
            RegistrationError::UploadFailed { source, .. }
            | RegistrationError::NotSaved { source, .. } => source,
        }
    }

    pub fn orphaned(&self) -> &[OrphanedAsset] {
        match self {
            RegistrationError::Rejected(_) => &[],
            RegistrationError::UploadFailed { orphaned, .. }
            | RegistrationError::NotSaved { orphaned, .. } => orphaned,
        }
    }

    /// Single message suitable for an alert dialog.
    pub fn user_message(&self) -> String {
        match self {
            RegistrationError::Rejected(err) => match err {
                CoreError::Unauthenticated => {
                    "Please sign in before submitting your work.".to_string()
                }
                CoreError::ValidationFailed(reason) => reason.clone(),
                CoreError::PayloadTooLarge { limit_bytes, .. } => format!(
                    "The video file is too large. Please choose a file of {} or less.",
                    format_file_size(*limit_bytes)
                ),
                other => format!("Your submission could not be started: {other}"),
            },
            RegistrationError::UploadFailed { source, .. } => match source {
                CoreError::Cancelled => "The upload was cancelled.".to_string(),
                CoreError::UploadFailed {
                    kind: AssetKind::Image,
                    ..
                } => "Your poster image could not be uploaded. Please try again."
                    .to_string(),
                _ => "Your video could not be uploaded. Please try again."
                    .to_string(),
            },
            RegistrationError::NotSaved { .. } => {
                "Your work was uploaded but could not be saved. Please submit it again."
                    .to_string()
            }
        }
    }
}
