//! 发布后端层
//!
//! 真正执行平台上传的外部系统适配器。
//!
//! 批量发布器只依赖 `PublishBackend` trait：
//! - `DouyinUploader` - 通过浏览器自动化发布到抖音创作者中心
//! - `SimulatedUploader` - 模拟发布（发布器不可用时 / 演示 / 测试）
//!
//! 每次 `publish` 调用是单飞的：后端内部没有并发，一次只处理一个请求，
//! 调用可能持续数秒到数十秒。

pub mod browser;
pub mod douyin;
pub mod simulated;

pub use douyin::DouyinUploader;
pub use simulated::SimulatedUploader;

use async_trait::async_trait;

use crate::error::PublishError;
use crate::models::PublishRequest;

/// 发布后端接口
#[async_trait]
pub trait PublishBackend: Send + Sync {
    /// 预检：验证凭据/会话可用。必须在任何 `publish` 调用之前成功。
    async fn initialize(&self) -> Result<(), PublishError>;

    /// 发布单个视频。阻塞式慢调用，秒级到数十秒。
    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError>;
}
