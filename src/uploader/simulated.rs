//! 模拟发布器
//!
//! 真实发布器不可用时的替代实现：短暂延迟后返回成功。
//! 演示模式和测试使用。

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::info;

use crate::error::PublishError;
use crate::models::PublishRequest;
use crate::uploader::PublishBackend;

/// 模拟发布后端，总是成功
pub struct SimulatedUploader {
    delay: Duration,
}

impl SimulatedUploader {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedUploader {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl PublishBackend for SimulatedUploader {
    async fn initialize(&self) -> Result<(), PublishError> {
        info!("⚠️ 使用模拟发布器（不会真正上传）");
        Ok(())
    }

    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError> {
        sleep(self.delay).await;
        info!(
            "⚠️ 模拟发布视频: {} (标签: {:?})",
            request.title.lines().next().unwrap_or(""),
            request.tags
        );
        Ok(())
    }
}
