//! 进度观察者接口
//!
//! 批量发布器在工作任务的执行上下文中同步调用观察者；
//! GUI 前端自行把回调转发到自己的事件循环，核心不依赖任何 UI 技术。

use std::fmt;
use tracing::{info, warn};

use crate::error::PublishError;
use crate::models::VideoRecord;

/// 单个条目的失败原因（仅在进度事件中呈现，不落库）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFailure {
    /// 记录已不存在于目录中
    RecordNotFound { id: i64 },
    /// 媒体文件缺失或不可读（未调用发布后端）
    MediaMissing { path: String },
    /// 发布后端报告的失败
    Publish(PublishError),
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemFailure::RecordNotFound { id } => write!(f, "记录不存在 (id: {})", id),
            ItemFailure::MediaMissing { path } => write!(f, "媒体文件缺失: {}", path),
            ItemFailure::Publish(e) => write!(f, "{}", e),
        }
    }
}

/// 单个条目完成后的进度事件
///
/// 事件按 `index` 严格递增送达（1 到 total），每个条目恰好一次，
/// 失败路径也不例外。
#[derive(Debug, Clone)]
pub struct ItemProgress {
    /// 当前条目序号（1-based）
    pub index: usize,
    /// 批次条目总数
    pub total: usize,
    /// 目前为止的成功数
    pub succeeded: usize,
    /// 目前为止的失败数
    pub failed: usize,
    /// 当前条目是否成功
    pub last_item_succeeded: bool,
    /// 当前条目对应的记录 id
    pub video_id: i64,
    /// 失败详情（成功时为 `None`）
    pub detail: Option<ItemFailure>,
}

/// 进度观察者
pub trait ProgressSink: Send + Sync {
    /// 条目进入"发布中"状态（前端据此渲染处理中标记）。
    /// 记录加载失败或媒体缺失的条目不会产生本事件。
    fn item_started(&self, index: usize, total: usize, record: &VideoRecord) {
        let _ = (index, total, record);
    }

    /// 条目处理完成（成功或失败）
    fn item_finished(&self, progress: &ItemProgress);
}

/// 丢弃所有进度事件的观察者
pub struct NullSink;

impl ProgressSink for NullSink {
    fn item_finished(&self, _progress: &ItemProgress) {}
}

/// 把进度事件渲染成日志的观察者（CLI 前端）
pub struct LogSink;

impl ProgressSink for LogSink {
    fn item_started(&self, index: usize, total: usize, record: &VideoRecord) {
        info!(
            "📤 正在发布第 {}/{} 个视频: {}",
            index, total, record.display_title
        );
    }

    fn item_finished(&self, progress: &ItemProgress) {
        if progress.last_item_succeeded {
            info!(
                "✅ 第 {}/{} 个视频发布成功 (成功: {}, 失败: {})",
                progress.index, progress.total, progress.succeeded, progress.failed
            );
        } else {
            let detail = progress
                .detail
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "未知原因".to_string());
            warn!(
                "❌ 第 {}/{} 个视频发布失败: {} (成功: {}, 失败: {})",
                progress.index, progress.total, detail, progress.succeeded, progress.failed
            );
        }
    }
}
