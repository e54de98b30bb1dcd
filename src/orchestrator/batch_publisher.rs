//! 批量发布器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **顺序执行**：严格按给定顺序逐个发布，绝不并行
//! 2. **单飞保护**：同一时刻最多一个批次在执行，第二个 `run` 立即返回
//!    `AlreadyRunning`，不排队
//! 3. **限速**：相邻条目之间等待固定间隔（可配置，默认 5 秒）
//! 4. **协作式取消**：在每个条目开始前和限速等待期间检查取消标志；
//!    已经发出的后端调用不会被打断，当前条目的结果处理总会完成
//! 5. **结果统计**：调用方总能拿到 `RunSummary`，不存在无账目的部分结果
//!
//! 整个 `run` 预期在独立的工作任务上执行（`spawn_run`），
//! 调用方线程不被阻塞。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{BatchError, PublishError};
use crate::models::RunSummary;
use crate::services::RequestBuilder;
use crate::store::CatalogueStore;
use crate::uploader::PublishBackend;
use crate::workflow::{ItemOutcome, ItemProgress, ProgressSink, PublishCtx, PublishFlow};

/// 取消句柄
///
/// 可随批次任务一起分发给任意前端；`cancel()` 置位标志并唤醒
/// 正在限速等待中的批次。
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// 一次批次执行的内部账目
struct BatchRun {
    cursor: usize,
    succeeded: usize,
    failed: usize,
}

/// 批量发布器
pub struct BatchPublisher {
    flow: PublishFlow,
    backend: Arc<dyn PublishBackend>,
    pacing: Duration,
    initialized: AtomicBool,
    running: AtomicBool,
    cancel_flag: Arc<AtomicBool>,
    cancel_notify: Arc<Notify>,
}

impl BatchPublisher {
    pub fn new(
        store: Arc<dyn CatalogueStore>,
        backend: Arc<dyn PublishBackend>,
        config: &Config,
    ) -> Self {
        let builder = RequestBuilder::new(config.default_tags.clone());
        Self {
            flow: PublishFlow::new(store, backend.clone(), builder),
            backend,
            pacing: Duration::from_secs(config.pacing_interval_secs),
            initialized: AtomicBool::new(false),
            running: AtomicBool::new(false),
            cancel_flag: Arc::new(AtomicBool::new(false)),
            cancel_notify: Arc::new(Notify::new()),
        }
    }

    /// 预检：验证发布后端的凭据/会话可用
    ///
    /// 必须在任何 `run` 之前成功，否则 `run` 直接拒绝整个批次，
    /// 而不是逐条尝试再逐条失败。
    pub async fn initialize(&self) -> Result<(), PublishError> {
        self.backend.initialize().await?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// 获取取消句柄
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: self.cancel_flag.clone(),
            notify: self.cancel_notify.clone(),
        }
    }

    /// 是否有批次正在执行
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 在独立的工作任务上执行批次
    pub fn spawn_run(
        self: &Arc<Self>,
        ids: Vec<i64>,
        observer: Arc<dyn ProgressSink>,
    ) -> JoinHandle<Result<RunSummary, BatchError>> {
        let publisher = self.clone();
        tokio::spawn(async move { publisher.run(&ids, observer.as_ref()).await })
    }

    /// 按给定顺序批量发布
    ///
    /// 同一 id 出现多次时按独立的顺序尝试处理，不去重。
    /// 单条失败不中止批次；被取消时返回已处理条目的统计，
    /// 未尝试的条目保持原状态。
    pub async fn run(
        &self,
        ids: &[i64],
        observer: &dyn ProgressSink,
    ) -> Result<RunSummary, BatchError> {
        if ids.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(BatchError::NotInitialized);
        }
        // 单飞保护：并发的第二个 run 立即失败，不排队
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BatchError::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);
        self.cancel_flag.store(false, Ordering::SeqCst);

        let total = ids.len();
        info!("🚀 开始批量发布 {} 个视频...", total);

        let mut batch = BatchRun {
            cursor: 0,
            succeeded: 0,
            failed: 0,
        };

        for (i, &id) in ids.iter().enumerate() {
            batch.cursor = i;
            if self.cancel_flag.load(Ordering::SeqCst) {
                warn!(
                    "⛔ 批次已取消，剩余 {} 个视频保持原状态",
                    total - batch.cursor
                );
                break;
            }

            let ctx = PublishCtx {
                index: i + 1,
                total,
            };
            let outcome = self.flow.run(id, &ctx, observer).await;

            let detail = match outcome {
                ItemOutcome::Published => {
                    batch.succeeded += 1;
                    None
                }
                ItemOutcome::Failed(failure) => {
                    batch.failed += 1;
                    Some(failure)
                }
            };
            observer.item_finished(&ItemProgress {
                index: ctx.index,
                total,
                succeeded: batch.succeeded,
                failed: batch.failed,
                last_item_succeeded: detail.is_none(),
                video_id: id,
                detail,
            });

            // 限速：最后一个条目之后不等待；取消会提前唤醒等待
            if ctx.index < total && !self.cancel_flag.load(Ordering::SeqCst) {
                info!("⏳ 等待 {} 秒后发布下一个视频...", self.pacing.as_secs());
                tokio::select! {
                    _ = sleep(self.pacing) => {}
                    _ = self.cancel_notify.notified() => {}
                }
            }
        }

        let summary = RunSummary {
            succeeded: batch.succeeded,
            failed: batch.failed,
            total: batch.succeeded + batch.failed,
        };
        info!(
            "📊 批量发布完成: 成功 {} 个，失败 {} 个",
            summary.succeeded, summary.failed
        );
        Ok(summary)
    }
}

/// 批次结束（含 panic 展开）时释放单飞标志
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
