use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ids::ContentId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A title a user saved for later. Unique per (user, content).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MyListEntry {
    pub user_id: Uuid,
    pub content_id: ContentId,
    pub added_at: DateTime<Utc>,
}
