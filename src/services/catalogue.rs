//! 目录管理服务 - 业务能力层
//!
//! 视频文件的登记、扫描、AI 重命名。只处理目录条目本身，
//! 不参与发布流程。

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppResult, FileError};
use crate::models::{NewVideo, VideoRecord};
use crate::services::AiService;
use crate::store::CatalogueStore;

/// 目录管理服务
pub struct CatalogueService {
    store: Arc<dyn CatalogueStore>,
    ai: Option<AiService>,
    config: Config,
}

impl CatalogueService {
    /// `ai` 为 `None` 时使用固定文案生成描述
    pub fn new(store: Arc<dyn CatalogueStore>, ai: Option<AiService>, config: Config) -> Self {
        Self { store, ai, config }
    }

    /// 登记单个视频文件
    ///
    /// 已登记过的路径直接跳过，返回 `Ok(None)`。
    pub async fn add_file(&self, path: &Path) -> AppResult<Option<VideoRecord>> {
        if !path.exists() {
            return Err(FileError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let mut new = NewVideo::from_path(path);
        if self.store.find_by_path(&new.source_path).await?.is_some() {
            debug!("视频已存在，跳过: {}", new.source_path);
            return Ok(None);
        }

        new.description = self.generate_description(&new.filename).await;
        let record = self.store.add(new).await?;
        info!("✓ 已登记视频: {} (id: {})", record.filename, record.id);
        Ok(Some(record))
    }

    /// 扫描文件夹，登记所有未登记的视频文件
    ///
    /// 按文件名排序保证登记顺序稳定；不支持的扩展名被跳过。
    pub async fn scan_folder(&self, folder: &Path) -> AppResult<Vec<VideoRecord>> {
        if !folder.is_dir() {
            return Err(FileError::DirectoryNotFound {
                path: folder.display().to_string(),
            }
            .into());
        }

        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(folder).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && self.config.is_supported_format(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut added = Vec::new();
        for path in paths {
            if let Some(record) = self.add_file(&path).await? {
                added.push(record);
            }
        }
        if !added.is_empty() {
            info!("📁 扫描完成，新登记 {} 个视频", added.len());
        }
        Ok(added)
    }

    /// 为指定记录批量生成 AI 名称，返回成功更新的数量
    pub async fn rename_with_ai(&self, ids: &[i64]) -> AppResult<usize> {
        let Some(ai) = &self.ai else {
            warn!("⚠️ AI 功能未启用，跳过批量重命名");
            return Ok(0);
        };

        let mut renamed = 0;
        for &id in ids {
            let record = match self.store.get(id).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("跳过重命名 (id: {}): {}", id, e);
                    continue;
                }
            };
            let title = ai.generate_title(&record.filename).await;
            // 写回失败同样只跳过当前条目，不中止整个批量重命名
            if let Err(e) = self.store.update_fields(id, Some(&title), None).await {
                warn!("写入新名称失败，跳过 (id: {}): {}", id, e);
                continue;
            }
            renamed += 1;
        }
        info!("✓ 已为 {} 个视频生成 AI 名称", renamed);
        Ok(renamed)
    }

    async fn generate_description(&self, filename: &str) -> String {
        match &self.ai {
            Some(ai) if self.config.ai_enabled => ai.generate_description(filename).await,
            _ => format!("这是一个关于{}的视频，内容精彩有趣。", filename),
        }
    }
}
