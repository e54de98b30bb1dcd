use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 发布请求
///
/// 由 `RequestBuilder` 从一条 `VideoRecord` 派生，每次发布尝试重新构建，
/// 构建后不再修改，也不落库。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    /// 发布标题（展示名称 + 空行 + 描述，便于平台搜索命中）
    pub title: String,
    /// 视频描述
    pub description: String,
    /// 话题标签，最多 5 个，按描述中出现顺序去重
    pub tags: Vec<String>,
    /// 媒体文件路径
    pub media_path: String,
    /// 定时发布时间，`None` 表示立即发布
    pub scheduled_time: Option<DateTime<Utc>>,
}

/// 一次批量发布的结果统计
///
/// 不变量：`succeeded + failed == total`。批次被取消时，
/// `total` 只计入实际尝试过的条目，未尝试的条目保持原状态。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}
