//! In-memory repositories and scripted media hosts shared by the integration
//! tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use reelhouse_core::application::{AppServices, AppUnitOfWork};
use reelhouse_core::config::WatchConfig;
use reelhouse_core::database::ports::content::{CatalogFilter, ContentRepository};
use reelhouse_core::database::ports::my_list::MyListRepository;
use reelhouse_core::database::ports::watch_progress::{
    WatchProgressRepository, WatchProgressWrite,
};
use reelhouse_core::media_host::{ImageHost, VideoHost, build_image_url};
use reelhouse_core::model::{
    ContentId, ContentRecord, ContentSummary, ImageVariant, LocalFile,
    ModerationStatus, MyListEntry, NewContent, PercentWindow, UploadedImage,
    UploadedVideo, WatchProgress,
};
use reelhouse_core::upload::{UploadPipeline, UploadPolicy};
use reelhouse_core::{StoreError, UploadError};
use uuid::Uuid;

pub const MB: u64 = 1024 * 1024;

pub fn fixed_time(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_735_689_600 + seconds, 0).unwrap()
}

#[derive(Default)]
struct Tables {
    content: HashMap<ContentId, ContentRecord>,
    progress: HashMap<(Uuid, ContentId), WatchProgress>,
    my_list: Vec<MyListEntry>,
    clock: i64,
}

/// One store backing all three ports, so joins behave like the real schema.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_content_inserts: AtomicBool,
    fail_progress_writes: AtomicBool,
    pub progress_writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_content_inserts(&self, fail: bool) {
        self.fail_content_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_progress_writes(&self, fail: bool) {
        self.fail_progress_writes.store(fail, Ordering::SeqCst);
    }

    pub fn content_rows(&self) -> Vec<ContentRecord> {
        self.tables.lock().content.values().cloned().collect()
    }

    pub fn progress_rows(&self) -> Vec<WatchProgress> {
        self.tables.lock().progress.values().cloned().collect()
    }

    /// Inserts a published record directly, bypassing registration.
    pub fn seed_published(&self, title: &str, category: Option<&str>) -> ContentRecord {
        self.seed(title, category, ModerationStatus::Published, Uuid::now_v7())
    }

    pub fn seed(
        &self,
        title: &str,
        category: Option<&str>,
        moderation: ModerationStatus,
        created_by: Uuid,
    ) -> ContentRecord {
        let mut tables = self.tables.lock();
        tables.clock += 1;
        let at = fixed_time(tables.clock);
        let record = ContentRecord {
            id: ContentId::new(),
            title: title.to_string(),
            description: format!("About {title}"),
            video_asset_id: format!("video-{}", tables.clock),
            image_asset_id: None,
            category: category.map(str::to_string),
            moderation,
            created_by,
            created_at: at,
            updated_at: at,
        };
        tables.content.insert(record.id, record.clone());
        record
    }

    /// Watched timestamps are synthetic and strictly increasing so ordering
    /// assertions do not depend on the wall clock.
    fn tick(tables: &mut Tables) -> DateTime<Utc> {
        tables.clock += 1;
        fixed_time(tables.clock)
    }
}

#[async_trait]
impl ContentRepository for InMemoryStore {
    async fn insert(&self, content: NewContent) -> Result<ContentRecord, StoreError> {
        if self.fail_content_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        let record = ContentRecord {
            id: ContentId::new(),
            title: content.title,
            description: content.description,
            video_asset_id: content.video_asset_id,
            image_asset_id: content.image_asset_id,
            category: content.category,
            moderation: content.moderation,
            created_by: content.created_by,
            created_at: content.created_at,
            updated_at: content.created_at,
        };
        self.tables.lock().content.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: ContentId) -> Result<Option<ContentRecord>, StoreError> {
        Ok(self.tables.lock().content.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ContentId]) -> Result<Vec<ContentSummary>, StoreError> {
        let tables = self.tables.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.content.get(id))
            .map(ContentSummary::from)
            .collect())
    }

    async fn list_listable(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<ContentRecord>, StoreError> {
        let tables = self.tables.lock();
        let needle = filter.title_contains.as_ref().map(|n| n.to_lowercase());
        let mut rows: Vec<ContentRecord> = tables
            .content
            .values()
            .filter(|r| r.moderation.is_listable())
            .filter(|r| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|c| r.category.as_ref() == Some(c))
            })
            .filter(|r| filter.created_by.is_none_or(|u| r.created_by == u))
            .filter(|r| {
                needle
                    .as_ref()
                    .is_none_or(|n| r.title.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn set_moderation(
        &self,
        id: ContentId,
        status: ModerationStatus,
    ) -> Result<ContentRecord, StoreError> {
        let mut tables = self.tables.lock();
        let record = tables.content.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.moderation = status;
        Ok(record.clone())
    }

    async fn delete(&self, id: ContentId) -> Result<bool, StoreError> {
        Ok(self.tables.lock().content.remove(&id).is_some())
    }
}

#[async_trait]
impl WatchProgressRepository for InMemoryStore {
    async fn upsert(&self, write: WatchProgressWrite) -> Result<WatchProgress, StoreError> {
        self.progress_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_progress_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("database is unavailable".to_string()));
        }
        let mut tables = self.tables.lock();
        let at = Self::tick(&mut tables);
        let row = WatchProgress {
            user_id: write.user_id,
            content_id: write.content_id,
            progress_time_seconds: write.progress_time_seconds,
            progress_percentage: write.progress_percentage,
            last_watched_at: at,
        };
        tables
            .progress
            .insert((write.user_id, write.content_id), row.clone());
        Ok(row)
    }

    async fn get(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<Option<WatchProgress>, StoreError> {
        Ok(self.tables.lock().progress.get(&(user_id, content_id)).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        window: PercentWindow,
        limit: Option<usize>,
    ) -> Result<Vec<WatchProgress>, StoreError> {
        let tables = self.tables.lock();
        let mut rows: Vec<WatchProgress> = tables
            .progress
            .values()
            .filter(|p| p.user_id == user_id && window.contains(p.progress_percentage))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.last_watched_at.cmp(&a.last_watched_at));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn delete(&self, user_id: Uuid, content_id: ContentId) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .lock()
            .progress
            .remove(&(user_id, content_id))
            .is_some())
    }
}

#[async_trait]
impl MyListRepository for InMemoryStore {
    async fn add(&self, user_id: Uuid, content_id: ContentId) -> Result<MyListEntry, StoreError> {
        let mut tables = self.tables.lock();
        if tables
            .my_list
            .iter()
            .any(|e| e.user_id == user_id && e.content_id == content_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: Some("my_list_user_content_key".to_string()),
            });
        }
        let added_at = Self::tick(&mut tables);
        let entry = MyListEntry {
            user_id,
            content_id,
            added_at,
        };
        tables.my_list.push(entry.clone());
        Ok(entry)
    }

    async fn remove(&self, user_id: Uuid, content_id: ContentId) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock();
        let before = tables.my_list.len();
        tables
            .my_list
            .retain(|e| !(e.user_id == user_id && e.content_id == content_id));
        Ok(tables.my_list.len() != before)
    }

    async fn contains(&self, user_id: Uuid, content_id: ContentId) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .lock()
            .my_list
            .iter()
            .any(|e| e.user_id == user_id && e.content_id == content_id))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<MyListEntry>, StoreError> {
        let mut rows: Vec<MyListEntry> = self
            .tables
            .lock()
            .my_list
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(rows)
    }

    async fn count(&self, user_id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .tables
            .lock()
            .my_list
            .iter()
            .filter(|e| e.user_id == user_id)
            .count() as u64)
    }
}

/// Video host that answers from a script and records every call.
#[derive(Default)]
pub struct ScriptedVideoHost {
    script: Mutex<VecDeque<Result<UploadedVideo, UploadError>>>,
    pub delay: Mutex<Duration>,
    pub uploads: AtomicUsize,
    pub deleted: Mutex<Vec<String>>,
}

impl ScriptedVideoHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn succeed(&self, asset_id: &str) {
        self.script.lock().push_back(Ok(UploadedVideo {
            asset_id: asset_id.to_string(),
            playback_url: Some(format!("https://stream.test/{asset_id}/manifest/video.m3u8")),
            thumbnail_url: None,
            duration_seconds: Some(120.0),
            original_name: None,
            size_bytes: 0,
            uploaded_at: fixed_time(0),
        }));
    }

    pub fn reject(&self, status: u16, body: &str) {
        self.script.lock().push_back(Err(UploadError::Rejected {
            status,
            body: body.to_string(),
        }));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoHost for ScriptedVideoHost {
    async fn upload_video(&self, file: &LocalFile) -> Result<UploadedVideo, UploadError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(mut video)) => {
                video.size_bytes = file.size_bytes;
                video.original_name = file.declared_name.clone();
                Ok(video)
            }
            Some(Err(err)) => Err(err),
            None => Err(UploadError::Malformed("no scripted response".to_string())),
        }
    }

    async fn delete_video(&self, asset_id: &str) -> Result<(), UploadError> {
        self.deleted.lock().push(asset_id.to_string());
        Ok(())
    }
}

/// Image host that answers from a script and records titles it was sent.
#[derive(Default)]
pub struct ScriptedImageHost {
    script: Mutex<VecDeque<Result<String, UploadError>>>,
    pub uploads: AtomicUsize,
    pub titles: Mutex<Vec<Option<String>>>,
    pub deleted: Mutex<Vec<String>>,
    pub fail_deletes: AtomicBool,
}

pub const DELIVERY_BASE: &str = "https://imagedelivery.test/hash";

impl ScriptedImageHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn succeed(&self, asset_id: &str) {
        self.script.lock().push_back(Ok(asset_id.to_string()));
    }

    pub fn reject(&self, status: u16, body: &str) {
        self.script.lock().push_back(Err(UploadError::Rejected {
            status,
            body: body.to_string(),
        }));
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageHost for ScriptedImageHost {
    async fn upload_image(
        &self,
        _file: &LocalFile,
        title: Option<&str>,
    ) -> Result<UploadedImage, UploadError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.titles.lock().push(title.map(str::to_string));
        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(asset_id)) => Ok(UploadedImage {
                delivery_url: build_image_url(DELIVERY_BASE, &asset_id, ImageVariant::Public),
                asset_id,
                uploaded_at: fixed_time(1),
            }),
            Some(Err(err)) => Err(err),
            None => Err(UploadError::Malformed("no scripted response".to_string())),
        }
    }

    async fn delete_image(&self, asset_id: &str) -> Result<(), UploadError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(UploadError::Rejected {
                status: 404,
                body: "not found".to_string(),
            });
        }
        self.deleted.lock().push(asset_id.to_string());
        Ok(())
    }

    fn image_url(&self, asset_id: &str, variant: ImageVariant) -> String {
        build_image_url(DELIVERY_BASE, asset_id, variant)
    }
}

/// Services over one in-memory store and scripted hosts.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub videos: Arc<ScriptedVideoHost>,
    pub images: Arc<ScriptedImageHost>,
    pub services: AppServices,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(UploadPolicy::default())
    }

    pub fn with_policy(policy: UploadPolicy) -> Self {
        let store = InMemoryStore::new();
        let videos = ScriptedVideoHost::new();
        let images = ScriptedImageHost::new();

        let unit_of_work = AppUnitOfWork {
            content: store.clone(),
            watch_progress: store.clone(),
            my_list: store.clone(),
        };
        let uploads = UploadPipeline::new(videos.clone(), images.clone(), policy);
        let services = AppServices::new(&unit_of_work, uploads, WatchConfig::default());

        Self {
            store,
            videos,
            images,
            services,
        }
    }
}

pub fn video_file(size_bytes: u64) -> LocalFile {
    LocalFile::new("file:///tmp/test-film.mp4", size_bytes)
        .with_mime_type("video/mp4")
        .with_name("test-film.mp4")
}

pub fn poster_file() -> LocalFile {
    LocalFile::new("file:///tmp/poster.jpg", 200 * 1024).with_mime_type("image/jpeg")
}
