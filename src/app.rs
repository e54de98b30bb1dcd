//! 应用入口编排
//!
//! 组装存储、AI 服务、发布后端和批量发布器，执行一次完整的
//! "扫描 → 列出未发布 → 批量发布" 流程。GUI 前端可以复用同样的
//! 组装方式，只需要换一个 `ProgressSink` 实现。

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::VideoStatus;
use crate::orchestrator::BatchPublisher;
use crate::services::{AiService, CatalogueService};
use crate::store::{CatalogueStore, MemoryStore, SqliteStore};
use crate::uploader::{DouyinUploader, PublishBackend, SimulatedUploader};
use crate::utils::logging;
use crate::workflow::LogSink;

/// 应用主结构
pub struct App {
    config: Config,
    store: Arc<dyn CatalogueStore>,
    catalogue: CatalogueService,
    publisher: Arc<BatchPublisher>,
}

impl App {
    /// 初始化应用：打开存储、预检发布后端
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(config.pacing_interval_secs);

        let store: Arc<dyn CatalogueStore> = if config.demo_mode {
            info!("📋 演示模式：使用内存存储和预置数据");
            Arc::new(MemoryStore::with_demo_data())
        } else {
            Arc::new(SqliteStore::connect(&config.db_path).await?)
        };

        let backend: Arc<dyn PublishBackend> = if config.simulate_publish || config.demo_mode {
            Arc::new(SimulatedUploader::default())
        } else {
            Arc::new(DouyinUploader::new(&config))
        };

        let ai = if config.ai_enabled {
            let service = AiService::new(&config);
            if service.check_service().await {
                info!("✅ Ollama 服务连接成功");
                Some(service)
            } else {
                warn!("⚠️ Ollama 服务不可用，AI 生成功能降级为固定文案");
                None
            }
        } else {
            None
        };

        let catalogue = CatalogueService::new(store.clone(), ai, config.clone());
        let publisher = Arc::new(BatchPublisher::new(store.clone(), backend, &config));

        // 预检失败则整体拒绝，不逐条尝试
        publisher.initialize().await?;

        Ok(Self {
            config,
            store,
            catalogue,
            publisher,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 扫描文件夹登记新视频（文件夹不存在时跳过）
        let folder = Path::new(&self.config.video_folder);
        if folder.is_dir() {
            self.catalogue.scan_folder(folder).await?;
        } else if !self.config.demo_mode {
            warn!("⚠️ 视频文件夹不存在，跳过扫描: {}", folder.display());
        }

        // 列出待发布的视频
        let pending = self.store.list(Some(VideoStatus::Unpublished)).await?;
        if pending.is_empty() {
            warn!("⚠️ 没有待发布的视频，程序结束");
            return Ok(());
        }
        info!("✓ 找到 {} 个待发布的视频", pending.len());

        // 按创建顺序发布（列表是倒序的）
        let mut ids: Vec<i64> = pending.iter().map(|r| r.id).collect();
        ids.reverse();

        // 整个批次在独立的工作任务上执行
        let handle = self.publisher.spawn_run(ids, Arc::new(LogSink));
        let summary = handle.await??;

        logging::print_final_stats(&summary, &self.config.output_log_file);
        Ok(())
    }
}
