use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{error::ModelError, ids::ContentId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shelf name used for published content that carries no category.
pub const DEFAULT_CATEGORY: &str = "Recommended";

/// Moderation state of a content record.
///
/// Only `Published` records are visible through listing and search. New
/// submissions always start as `Pending`; the transition out of `Pending` is
/// an administrative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModerationStatus {
    #[default]
    Pending,
    Published,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Published => "published",
            ModerationStatus::Rejected => "rejected",
        }
    }

    /// Whether records in this state may appear in listing/search results.
    pub fn is_listable(&self) -> bool {
        matches!(self, ModerationStatus::Published)
    }
}

impl FromStr for ModerationStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "published" => Ok(ModerationStatus::Published),
            "rejected" => Ok(ModerationStatus::Rejected),
            other => Err(ModelError::UnknownModerationStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted piece of watchable content and its asset references.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentRecord {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    /// Id of the hosted video. Always present.
    pub video_asset_id: String,
    /// Id of the hosted poster image, if one was uploaded.
    pub image_asset_id: Option<String>,
    /// Free-text genre/shelf. Unrelated to moderation.
    pub category: Option<String>,
    pub moderation: ModerationStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn display_category(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

/// Insert payload for a content record; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewContent {
    pub title: String,
    pub description: String,
    pub video_asset_id: String,
    pub image_asset_id: Option<String>,
    pub category: Option<String>,
    pub moderation: ModerationStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Content columns joined into history, continue-watching and my-list rows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentSummary {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    pub image_asset_id: Option<String>,
    pub video_asset_id: String,
    pub category: Option<String>,
}

impl From<&ContentRecord> for ContentSummary {
    fn from(record: &ContentRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            image_asset_id: record.image_asset_id.clone(),
            video_asset_id: record.video_asset_id.clone(),
            category: record.category.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: Option<&str>) -> ContentRecord {
        let now = Utc::now();
        ContentRecord {
            id: ContentId::new(),
            title: "Night Bus".into(),
            description: "Short".into(),
            video_asset_id: "vid".into(),
            image_asset_id: None,
            category: category.map(str::to_string),
            moderation: ModerationStatus::Published,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_published_is_listable() {
        assert!(ModerationStatus::Published.is_listable());
        assert!(!ModerationStatus::Pending.is_listable());
        assert!(!ModerationStatus::Rejected.is_listable());
    }

    #[test]
    fn status_parses_its_own_text() {
        for status in [
            ModerationStatus::Pending,
            ModerationStatus::Published,
            ModerationStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ModerationStatus>(), Ok(status));
        }
        assert!("審査中".parse::<ModerationStatus>().is_err());
    }

    #[test]
    fn blank_category_falls_back_to_default_shelf() {
        assert_eq!(record(None).display_category(), DEFAULT_CATEGORY);
        assert_eq!(record(Some("  ")).display_category(), DEFAULT_CATEGORY);
        assert_eq!(record(Some("Horror")).display_category(), "Horror");
    }
}
