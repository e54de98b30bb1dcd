//! 目录存储层
//!
//! 视频记录的持久化，按 id 存取，支持按状态筛选。
//!
//! 批量发布器只依赖 `CatalogueStore` trait，不关心具体存储：
//! - `SqliteStore` - SQLite 持久化（生产）
//! - `MemoryStore` - 内存存储（演示模式 / 测试）
//!
//! 并发约定：单条记录的写入是原子的（单条 UPDATE / 单个 map 条目整体替换），
//! 批次执行期间允许并发读取，但同一时刻最多只有一个批次在写状态
//! （由 `BatchPublisher` 的单飞保护保证）。

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{NewVideo, VideoRecord, VideoStatus};

/// 视频目录存储接口
#[async_trait]
pub trait CatalogueStore: Send + Sync {
    /// 按 id 读取记录
    async fn get(&self, id: i64) -> Result<VideoRecord, StoreError>;

    /// 列出记录，可按状态筛选，按创建时间倒序
    async fn list(&self, status: Option<VideoStatus>) -> Result<Vec<VideoRecord>, StoreError>;

    /// 新增记录，返回分配了 id 和时间戳的完整记录
    async fn add(&self, new: NewVideo) -> Result<VideoRecord, StoreError>;

    /// 按文件路径查找（用于去重）
    async fn find_by_path(&self, source_path: &str) -> Result<Option<VideoRecord>, StoreError>;

    /// 更新发布状态，同时刷新 `updated_at`
    async fn update_status(&self, id: i64, status: VideoStatus) -> Result<(), StoreError>;

    /// 更新展示名称/描述（传 `None` 表示保持不变），同时刷新 `updated_at`
    async fn update_fields(
        &self,
        id: i64,
        display_title: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), StoreError>;

    /// 删除记录
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}
