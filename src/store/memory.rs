//! 内存目录存储
//!
//! 用于演示模式和测试，不落盘。

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{NewVideo, VideoRecord, VideoStatus};
use crate::store::CatalogueStore;

/// 内存实现的视频目录存储
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<i64, VideoRecord>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// 创建预置了演示数据的存储
    pub fn with_demo_data() -> Self {
        let base = Utc::now();
        let demo = [
            (
                "demo_video_1.mp4",
                "精彩生活片段",
                "这是一个关于日常生活的精彩视频，记录了美好时光。",
                VideoStatus::Unpublished,
            ),
            (
                "demo_video_2.mp4",
                "美食制作教程",
                "详细的美食制作过程，从准备材料到成品展示，步骤清晰易懂。#美食 #教程",
                VideoStatus::Published,
            ),
            (
                "demo_video_3.mp4",
                "旅行vlog",
                "记录了一次难忘的旅行经历，美丽的风景和有趣的故事。#旅行 #vlog",
                VideoStatus::Failed,
            ),
            (
                "demo_video_4.mp4",
                "技术分享",
                "分享一些实用的技术技巧和心得体会，希望对大家有帮助。",
                VideoStatus::Unpublished,
            ),
        ];
        let mut records = HashMap::new();
        for (idx, (filename, title, description, status)) in demo.iter().enumerate() {
            let id = idx as i64 + 1;
            let created_at = base - Duration::minutes((demo.len() - idx) as i64);
            records.insert(
                id,
                VideoRecord {
                    id,
                    filename: filename.to_string(),
                    source_path: format!("/Users/demo/Videos/{}", filename),
                    display_title: title.to_string(),
                    description: description.to_string(),
                    status: *status,
                    created_at,
                    updated_at: created_at,
                },
            );
        }
        Self {
            next_id: AtomicI64::new(demo.len() as i64 + 1),
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl CatalogueStore for MemoryStore {
    async fn get(&self, id: i64) -> Result<VideoRecord, StoreError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn list(&self, status: Option<VideoStatus>) -> Result<Vec<VideoRecord>, StoreError> {
        let records = self.records.read().await;
        let mut result: Vec<VideoRecord> = records
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn add(&self, new: NewVideo) -> Result<VideoRecord, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let record = VideoRecord {
            id,
            filename: new.filename,
            source_path: new.source_path,
            display_title: new.display_title,
            description: new.description,
            status: VideoStatus::Unpublished,
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_path(&self, source_path: &str) -> Result<Option<VideoRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.source_path == source_path)
            .cloned())
    }

    async fn update_status(&self, id: i64, status: VideoStatus) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        record.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn update_fields(
        &self,
        id: i64,
        display_title: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        if let Some(title) = display_title {
            record.display_title = title.to_string();
        }
        if let Some(desc) = description {
            record.description = desc.to_string();
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.remove(&id).ok_or(StoreError::NotFound { id })?;
        Ok(())
    }
}
