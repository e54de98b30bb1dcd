//! # Video Batch Publish
//!
//! 本地视频目录管理与抖音批量发布
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 外部协作者（Store / Uploader）
//! - `store/` - 视频目录存储（SQLite / 内存），按 id 存取、按状态筛选
//! - `uploader/` - 发布后端（浏览器自动化抖音发布器 / 模拟发布器）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个视频
//! - `RequestBuilder` - 从记录构建发布请求（标签提取、标题拼接）
//! - `AiService` - AI 生成标题/描述能力
//! - `CatalogueService` - 目录登记/扫描能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个视频"的完整发布流程
//! - `PublishFlow` - 流程编排（读取 → 检查 → 发布中 → 后端 → 写回）
//! - `ProgressSink` - 进度观察者接口
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_publisher` - 批量发布器：顺序执行、单飞保护、
//!   限速、协作式取消、结果统计
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod uploader;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, BatchError, PublishError, PublishErrorKind, StoreError};
pub use models::{NewVideo, PublishRequest, RunSummary, VideoRecord, VideoStatus};
pub use orchestrator::{BatchPublisher, CancelHandle};
pub use services::{AiService, CatalogueService, RequestBuilder};
pub use store::{CatalogueStore, MemoryStore, SqliteStore};
pub use uploader::{DouyinUploader, PublishBackend, SimulatedUploader};
pub use workflow::{ItemFailure, ItemOutcome, ItemProgress, LogSink, NullSink, ProgressSink};
