use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// 视频发布状态
///
/// 状态机（只能通过批量发布器或用户手动编辑变更）：
///
/// ```text
/// 未发布 ──┐
///          ├─→ 发布中 ──→ 已发布
/// 发布失败 ─┘      └────→ 发布失败
/// ```
///
/// `发布失败` 和 `已发布` 都可以在后续批次中重新进入 `发布中`，
/// 系统不保留当前状态以外的尝试历史。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoStatus {
    /// 未发布（初始状态）
    #[serde(rename = "未发布")]
    Unpublished,
    /// 发布中（瞬态，仅在批次执行期间出现）
    #[serde(rename = "发布中")]
    Publishing,
    /// 已发布
    #[serde(rename = "已发布")]
    Published,
    /// 发布失败（可重新发布）
    #[serde(rename = "发布失败")]
    Failed,
}

impl VideoStatus {
    /// 数据库/界面中使用的中文状态文本
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Unpublished => "未发布",
            VideoStatus::Publishing => "发布中",
            VideoStatus::Published => "已发布",
            VideoStatus::Failed => "发布失败",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "未发布" => Ok(VideoStatus::Unpublished),
            "发布中" => Ok(VideoStatus::Publishing),
            "已发布" => Ok(VideoStatus::Published),
            "发布失败" => Ok(VideoStatus::Failed),
            other => Err(StoreError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// 视频记录
///
/// 目录中每个被跟踪的视频文件对应一条记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// 唯一标识，创建时分配，不可变
    pub id: i64,
    /// 原始文件名（含扩展名）
    pub filename: String,
    /// 媒体文件的绝对路径
    pub source_path: String,
    /// 展示名称，默认为文件名去掉扩展名
    pub display_title: String,
    /// 视频描述，可包含 `#标签`
    pub description: String,
    /// 发布状态
    pub status: VideoStatus,
    pub created_at: DateTime<Utc>,
    /// 每次变更时刷新
    pub updated_at: DateTime<Utc>,
}

/// 新增视频的输入数据（id 和时间戳由存储层分配）
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub filename: String,
    pub source_path: String,
    pub display_title: String,
    pub description: String,
}

impl NewVideo {
    /// 从文件路径构造，展示名称默认取文件名去掉扩展名
    pub fn from_path(path: &std::path::Path) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let display_title = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.clone());
        Self {
            filename,
            source_path: path.to_string_lossy().into_owned(),
            display_title,
            description: String::new(),
        }
    }
}
