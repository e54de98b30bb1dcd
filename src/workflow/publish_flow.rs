//! 单个视频的发布流程
//!
//! 流程顺序：
//! 1. 读取记录（不存在 → 失败，不中止批次）
//! 2. 检查媒体文件（缺失 → 置为发布失败，不调用后端）
//! 3. 置为发布中并通知观察者
//! 4. 构建发布请求
//! 5. 调用发布后端（慢调用）
//! 6. 按结果写回状态
//!
//! 无论后端结果如何，状态写回总会执行；单条记录的失败在这里
//! 就地恢复为 `ItemOutcome::Failed`，不向上传播。

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::VideoStatus;
use crate::services::RequestBuilder;
use crate::store::CatalogueStore;
use crate::uploader::PublishBackend;
use crate::workflow::progress::{ItemFailure, ProgressSink};

/// 单个条目的上下文（批次内序号）
#[derive(Debug, Clone, Copy)]
pub struct PublishCtx {
    /// 1-based 序号
    pub index: usize,
    pub total: usize,
}

/// 单个条目的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 已发布
    Published,
    /// 发布失败（原因仅进入进度事件，不落库）
    Failed(ItemFailure),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Published)
    }
}

/// 单个视频的发布流程
///
/// 职责：
/// - 执行上面的六个步骤
/// - 不做批次调度、不做限速、不管理取消
pub struct PublishFlow {
    store: Arc<dyn CatalogueStore>,
    backend: Arc<dyn PublishBackend>,
    builder: RequestBuilder,
}

impl PublishFlow {
    pub fn new(
        store: Arc<dyn CatalogueStore>,
        backend: Arc<dyn PublishBackend>,
        builder: RequestBuilder,
    ) -> Self {
        Self {
            store,
            backend,
            builder,
        }
    }

    pub async fn run(
        &self,
        id: i64,
        ctx: &PublishCtx,
        observer: &dyn ProgressSink,
    ) -> ItemOutcome {
        // 步骤 1: 读取记录
        let record = match self.store.get(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!("[视频 {}/{}] ⚠️ 读取记录失败: {}", ctx.index, ctx.total, e);
                return ItemOutcome::Failed(ItemFailure::RecordNotFound { id });
            }
        };

        // 步骤 2: 检查媒体文件，缺失时不调用后端
        if !media_readable(&record.source_path).await {
            warn!(
                "[视频 {}/{}] ❌ 视频文件不存在: {}",
                ctx.index, ctx.total, record.source_path
            );
            self.set_status(id, VideoStatus::Failed).await;
            return ItemOutcome::Failed(ItemFailure::MediaMissing {
                path: record.source_path.clone(),
            });
        }

        // 步骤 3: 进入发布中状态
        self.set_status(id, VideoStatus::Publishing).await;
        observer.item_started(ctx.index, ctx.total, &record);

        // 步骤 4: 构建发布请求
        let request = self.builder.build(&record);

        // 步骤 5: 调用发布后端（秒级到数十秒）
        let result = self.backend.publish(&request).await;

        // 步骤 6: 写回结果状态
        match result {
            Ok(()) => {
                self.set_status(id, VideoStatus::Published).await;
                info!(
                    "[视频 {}/{}] ✅ 发布成功: {}",
                    ctx.index, ctx.total, record.display_title
                );
                ItemOutcome::Published
            }
            Err(e) => {
                self.set_status(id, VideoStatus::Failed).await;
                warn!(
                    "[视频 {}/{}] ❌ 发布失败: {}",
                    ctx.index, ctx.total, e
                );
                ItemOutcome::Failed(ItemFailure::Publish(e))
            }
        }
    }

    /// 写状态；持久化失败只记日志，不改变条目结果
    async fn set_status(&self, id: i64, status: VideoStatus) {
        if let Err(e) = self.store.update_status(id, status).await {
            error!("写入状态 {} 失败 (id: {}): {}", status, id, e);
        }
    }
}

/// 媒体文件存在且是普通文件
async fn media_readable(path: &str) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file(),
        Err(_) => false,
    }
}
