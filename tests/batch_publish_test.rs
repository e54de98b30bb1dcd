//! 批量发布器的行为测试
//!
//! 使用内存存储和脚本化的发布后端，不依赖浏览器和网络。

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::time::Duration;

use video_batch_publish::{
    BatchError, BatchPublisher, CancelHandle, CatalogueStore, Config, ItemFailure, ItemProgress,
    MemoryStore, NewVideo, NullSink, ProgressSink, PublishBackend, PublishError, PublishRequest,
    VideoRecord, VideoStatus,
};

/// 脚本化的发布后端：按顺序弹出预设结果，耗尽后总是成功
struct MockBackend {
    results: Mutex<VecDeque<Result<(), PublishError>>>,
    calls: Mutex<Vec<String>>,
    delay: Duration,
    fail_init: bool,
}

impl MockBackend {
    fn ok() -> Self {
        Self::with_results(vec![])
    }

    fn with_results(results: Vec<Result<(), PublishError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::from_millis(0),
            fail_init: false,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::ok()
        }
    }

    fn broken_init() -> Self {
        Self {
            fail_init: true,
            ..Self::ok()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PublishBackend for MockBackend {
    async fn initialize(&self) -> Result<(), PublishError> {
        if self.fail_init {
            return Err(PublishError::auth("cookie 已失效"));
        }
        Ok(())
    }

    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError> {
        self.calls.lock().unwrap().push(request.media_path.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// 收集全部进度事件的观察者
#[derive(Default)]
struct CollectSink {
    started: Mutex<Vec<usize>>,
    finished: Mutex<Vec<ItemProgress>>,
}

impl ProgressSink for CollectSink {
    fn item_started(&self, index: usize, _total: usize, _record: &VideoRecord) {
        self.started.lock().unwrap().push(index);
    }

    fn item_finished(&self, progress: &ItemProgress) {
        self.finished.lock().unwrap().push(progress.clone());
    }
}

/// 在第 n 个条目完成后触发取消的观察者
struct CancelAfter {
    handle: CancelHandle,
    after: usize,
}

impl ProgressSink for CancelAfter {
    fn item_finished(&self, progress: &ItemProgress) {
        if progress.index == self.after {
            self.handle.cancel();
        }
    }
}

fn test_config() -> Config {
    Config {
        pacing_interval_secs: 0,
        ..Config::default()
    }
}

/// 在临时目录中创建 n 个真实的视频文件并登记
async fn seed_videos(store: &MemoryStore, dir: &Path, n: usize) -> Vec<i64> {
    let mut ids = Vec::new();
    for i in 1..=n {
        let path = dir.join(format!("video_{}.mp4", i));
        std::fs::write(&path, b"fake video data").unwrap();
        let mut new = NewVideo::from_path(&path);
        new.description = format!("测试视频 {} #测试", i);
        let record = store.add(new).await.unwrap();
        ids.push(record.id);
    }
    ids
}

async fn publisher_with(
    store: Arc<MemoryStore>,
    backend: Arc<MockBackend>,
) -> Arc<BatchPublisher> {
    let publisher = Arc::new(BatchPublisher::new(store, backend, &test_config()));
    publisher.initialize().await.unwrap();
    publisher
}

#[tokio::test]
async fn summary_accounts_for_every_item() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 3).await;
    let backend = Arc::new(MockBackend::ok());
    let publisher = publisher_with(store.clone(), backend.clone()).await;

    let summary = publisher.run(&ids, &NullSink).await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded + summary.failed, summary.total);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(backend.call_count(), 3);
    for id in ids {
        assert_eq!(store.get(id).await.unwrap().status, VideoStatus::Published);
    }
}

#[tokio::test]
async fn progress_indices_strictly_increase_without_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 4).await;
    let backend = Arc::new(MockBackend::with_results(vec![
        Ok(()),
        Err(PublishError::network("连接中断")),
        Ok(()),
        Ok(()),
    ]));
    let publisher = publisher_with(store.clone(), backend).await;
    let sink = CollectSink::default();

    let summary = publisher.run(&ids, &sink).await.unwrap();

    let finished = sink.finished.lock().unwrap();
    let indices: Vec<usize> = finished.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    // 失败路径也恰好一次
    assert!(!finished[1].last_item_succeeded);
    assert!(matches!(
        finished[1].detail,
        Some(ItemFailure::Publish(_))
    ));
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn second_run_is_rejected_while_first_is_active() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 1).await;
    let backend = Arc::new(MockBackend::slow(Duration::from_millis(300)));
    let publisher = publisher_with(store.clone(), backend).await;

    let first = publisher.spawn_run(ids.clone(), Arc::new(NullSink));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let sink = CollectSink::default();
    let second = publisher.run(&ids, &sink).await;
    assert_eq!(second.unwrap_err(), BatchError::AlreadyRunning);
    // 被拒绝的调用不产生任何进度事件，也不触碰任何状态
    assert!(sink.finished.lock().unwrap().is_empty());
    assert!(sink.started.lock().unwrap().is_empty());

    let summary = first.await.unwrap().unwrap();
    assert_eq!(summary.succeeded, 1);
    // 第一个批次结束后可以再次运行
    let again = publisher.run(&ids, &NullSink).await.unwrap();
    assert_eq!(again.succeeded, 1);
}

#[tokio::test]
async fn missing_media_fails_without_touching_backend() {
    let store = Arc::new(MemoryStore::new());
    let record = store
        .add(NewVideo {
            filename: "ghost.mp4".to_string(),
            source_path: "/nonexistent/ghost.mp4".to_string(),
            display_title: "ghost".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let backend = Arc::new(MockBackend::ok());
    let publisher = publisher_with(store.clone(), backend.clone()).await;
    let sink = CollectSink::default();

    let summary = publisher.run(&[record.id], &sink).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(backend.call_count(), 0);
    assert_eq!(
        store.get(record.id).await.unwrap().status,
        VideoStatus::Failed
    );
    // 没有进入发布中状态，不产生 started 事件
    assert!(sink.started.lock().unwrap().is_empty());
    let finished = sink.finished.lock().unwrap();
    assert!(matches!(
        finished[0].detail,
        Some(ItemFailure::MediaMissing { .. })
    ));
}

#[tokio::test]
async fn missing_record_counts_as_failed_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 1).await;
    let backend = Arc::new(MockBackend::ok());
    let publisher = publisher_with(store.clone(), backend.clone()).await;
    let sink = CollectSink::default();

    let batch = vec![999, ids[0]];
    let summary = publisher.run(&batch, &sink).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    let finished = sink.finished.lock().unwrap();
    assert!(matches!(
        finished[0].detail,
        Some(ItemFailure::RecordNotFound { id: 999 })
    ));
    // 第二个条目正常发布
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn rerunning_same_batch_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 3).await;
    let backend = Arc::new(MockBackend::ok());
    let publisher = publisher_with(store.clone(), backend.clone()).await;

    let first = publisher.run(&ids, &NullSink).await.unwrap();
    for &id in &ids {
        assert_eq!(store.get(id).await.unwrap().status, VideoStatus::Published);
    }

    // 已发布的条目可以重新提交，每个条目独立重新尝试
    let second = publisher.run(&ids, &NullSink).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.call_count(), 6);
    for &id in &ids {
        assert_eq!(store.get(id).await.unwrap().status, VideoStatus::Published);
    }
}

#[tokio::test]
async fn cancelling_mid_batch_preserves_remaining_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 5).await;
    // 条目 4、5 预先处于不同状态，验证取消后保持原状
    store
        .update_status(ids[3], VideoStatus::Failed)
        .await
        .unwrap();
    store
        .update_status(ids[4], VideoStatus::Published)
        .await
        .unwrap();

    let backend = Arc::new(MockBackend::ok());
    let publisher = publisher_with(store.clone(), backend.clone()).await;
    let sink = CancelAfter {
        handle: publisher.cancel_handle(),
        after: 2,
    };

    let summary = publisher.run(&ids, &sink).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded + summary.failed, 2);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(
        store.get(ids[2]).await.unwrap().status,
        VideoStatus::Unpublished
    );
    assert_eq!(store.get(ids[3]).await.unwrap().status, VideoStatus::Failed);
    assert_eq!(
        store.get(ids[4]).await.unwrap().status,
        VideoStatus::Published
    );
}

#[tokio::test]
async fn cancel_during_pacing_wait_wakes_the_batch_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 3).await;
    let backend = Arc::new(MockBackend::ok());
    // 足够长的限速间隔：批次不被唤醒就会在等待中停留 30 秒
    let config = Config {
        pacing_interval_secs: 30,
        ..Config::default()
    };
    let publisher = Arc::new(BatchPublisher::new(store.clone(), backend.clone(), &config));
    publisher.initialize().await.unwrap();
    let handle = publisher.cancel_handle();

    let run = publisher.spawn_run(ids.clone(), Arc::new(NullSink));
    // 第 1 个条目瞬间完成，批次随即进入条目间的限速等待
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.cancel();

    let summary = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("取消应当提前唤醒限速等待，而不是睡满整个间隔")
        .unwrap()
        .unwrap();

    // 只有已尝试的条目计入账目，未尝试的条目保持原状态
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total, 1);
    assert_eq!(backend.call_count(), 1);
    assert_eq!(
        store.get(ids[1]).await.unwrap().status,
        VideoStatus::Unpublished
    );
    assert_eq!(
        store.get(ids[2]).await.unwrap().status,
        VideoStatus::Unpublished
    );
}

#[tokio::test]
async fn duplicate_ids_are_independent_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 1).await;
    let backend = Arc::new(MockBackend::ok());
    let publisher = publisher_with(store.clone(), backend.clone()).await;

    let batch = vec![ids[0], ids[0], ids[0]];
    let summary = publisher.run(&batch, &NullSink).await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::ok());
    let publisher = publisher_with(store, backend).await;

    let result = publisher.run(&[], &NullSink).await;
    assert_eq!(result.unwrap_err(), BatchError::EmptyBatch);
}

#[tokio::test]
async fn run_refuses_to_start_without_initialization() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::ok());
    let publisher = BatchPublisher::new(store, backend, &test_config());

    let result = publisher.run(&[1], &NullSink).await;
    assert_eq!(result.unwrap_err(), BatchError::NotInitialized);
}

#[tokio::test]
async fn failed_preflight_blocks_the_batch() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::broken_init());
    let publisher = BatchPublisher::new(store, backend.clone(), &test_config());

    assert!(publisher.initialize().await.is_err());
    let result = publisher.run(&[1], &NullSink).await;
    assert_eq!(result.unwrap_err(), BatchError::NotInitialized);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn failed_item_can_be_resubmitted_in_later_batch() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let ids = seed_videos(&store, dir.path(), 1).await;
    let backend = Arc::new(MockBackend::with_results(vec![Err(
        PublishError::platform("审核拒绝"),
    )]));
    let publisher = publisher_with(store.clone(), backend).await;

    let first = publisher.run(&ids, &NullSink).await.unwrap();
    assert_eq!(first.failed, 1);
    assert_eq!(store.get(ids[0]).await.unwrap().status, VideoStatus::Failed);

    // 预设结果耗尽后成功，失败条目重新提交即可
    let second = publisher.run(&ids, &NullSink).await.unwrap();
    assert_eq!(second.succeeded, 1);
    assert_eq!(
        store.get(ids[0]).await.unwrap().status,
        VideoStatus::Published
    );
}
