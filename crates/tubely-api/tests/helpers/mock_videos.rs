//! In-memory video store for integration tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tubely_core::models::Video;
use tubely_core::AppError;
use tubely_db::VideoStore;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: Mutex<HashMap<Uuid, Video>>,
    updates: AtomicUsize,
    fail_updates: AtomicBool,
    fail_ping: AtomicBool,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh record owned by `user_id` and return its id
    pub fn add_video(&self, user_id: Uuid, title: &str) -> Uuid {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            description: format!("{} description", title),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        let id = video.id;
        self.videos.lock().unwrap().insert(id, video);
        id
    }

    pub fn set_video_url(&self, id: Uuid, video_url: &str) {
        if let Some(video) = self.videos.lock().unwrap().get_mut(&id) {
            video.video_url = Some(video_url.to_string());
        }
    }

    pub fn video(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub fn fail_ping(&self) {
        self.fail_ping.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.video(id))
    }

    async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection reset".to_string()));
        }
        let mut videos = self.videos.lock().unwrap();
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;
        stored.video_url = video.video_url.clone();
        stored.updated_at = video.updated_at;
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(AppError::Internal("database unreachable".to_string()));
        }
        Ok(())
    }
}
