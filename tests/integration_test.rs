use async_trait::async_trait;
use std::sync::Arc;
use tokio_test::assert_ok;

use video_batch_publish::utils::logging;
use video_batch_publish::{
    AiService, CatalogueService, CatalogueStore, Config, DouyinUploader, MemoryStore, NewVideo,
    PublishBackend, SqliteStore, StoreError, VideoRecord, VideoStatus,
};

#[tokio::test]
async fn sqlite_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("videos.db");
    let store = SqliteStore::connect(db_path.to_str().unwrap())
        .await
        .unwrap();

    let record = store
        .add(NewVideo {
            filename: "测试视频.mp4".to_string(),
            source_path: "/tmp/测试视频.mp4".to_string(),
            display_title: "测试视频".to_string(),
            description: "描述 #标签".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(record.status, VideoStatus::Unpublished);

    let loaded = store.get(record.id).await.unwrap();
    assert_eq!(loaded.display_title, "测试视频");
    assert_eq!(loaded.description, "描述 #标签");

    store
        .update_status(record.id, VideoStatus::Published)
        .await
        .unwrap();
    let published = store.list(Some(VideoStatus::Published)).await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].id, record.id);

    // 按路径去重查询
    let found = store.find_by_path("/tmp/测试视频.mp4").await.unwrap();
    assert!(found.is_some());
    assert!(store.find_by_path("/tmp/其他.mp4").await.unwrap().is_none());

    store.delete(record.id).await.unwrap();
    assert!(store.get(record.id).await.is_err());
}

#[tokio::test]
async fn sqlite_store_update_fields_keeps_unset_values() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("videos.db");
    let store = SqliteStore::connect(db_path.to_str().unwrap())
        .await
        .unwrap();
    let record = store
        .add(NewVideo {
            filename: "a.mp4".to_string(),
            source_path: "/tmp/a.mp4".to_string(),
            display_title: "原标题".to_string(),
            description: "原描述".to_string(),
        })
        .await
        .unwrap();

    store
        .update_fields(record.id, Some("新标题"), None)
        .await
        .unwrap();
    let updated = store.get(record.id).await.unwrap();
    assert_eq!(updated.display_title, "新标题");
    assert_eq!(updated.description, "原描述");
}

#[tokio::test]
async fn scan_folder_registers_supported_files_once() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.mp4"), b"data").unwrap();
    std::fs::write(dir.path().join("a.MOV"), b"data").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"data").unwrap();

    let store = Arc::new(assert_ok!(
        SqliteStore::connect(dir.path().join("videos.db").to_str().unwrap()).await
    ));
    let config = Config::default();
    let catalogue = CatalogueService::new(store.clone(), None, config);

    let added = catalogue.scan_folder(dir.path()).await.unwrap();
    assert_eq!(added.len(), 2);
    // 重复扫描不产生重复记录
    let added_again = catalogue.scan_folder(dir.path()).await.unwrap();
    assert!(added_again.is_empty());
    assert_eq!(store.list(None).await.unwrap().len(), 2);
}

/// 对指定 id 的名称写回总是失败的存储包装，模拟写库故障
struct WriteFailStore {
    inner: MemoryStore,
    fail_id: i64,
}

#[async_trait]
impl CatalogueStore for WriteFailStore {
    async fn get(&self, id: i64) -> Result<VideoRecord, StoreError> {
        self.inner.get(id).await
    }

    async fn list(&self, status: Option<VideoStatus>) -> Result<Vec<VideoRecord>, StoreError> {
        self.inner.list(status).await
    }

    async fn add(&self, new: NewVideo) -> Result<VideoRecord, StoreError> {
        self.inner.add(new).await
    }

    async fn find_by_path(&self, source_path: &str) -> Result<Option<VideoRecord>, StoreError> {
        self.inner.find_by_path(source_path).await
    }

    async fn update_status(&self, id: i64, status: VideoStatus) -> Result<(), StoreError> {
        self.inner.update_status(id, status).await
    }

    async fn update_fields(
        &self,
        id: i64,
        display_title: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        if id == self.fail_id {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        self.inner.update_fields(id, display_title, description).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn ai_rename_skips_item_whose_write_fails() {
    let inner = MemoryStore::new();
    let first = inner
        .add(NewVideo {
            filename: "a.mp4".to_string(),
            source_path: "/tmp/a.mp4".to_string(),
            display_title: "标题A".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let second = inner
        .add(NewVideo {
            filename: "b.mp4".to_string(),
            source_path: "/tmp/b.mp4".to_string(),
            display_title: "标题B".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let store = Arc::new(WriteFailStore {
        inner,
        fail_id: first.id,
    });
    let config = Config::default();
    let catalogue =
        CatalogueService::new(store.clone(), Some(AiService::new(&config)), config);

    // 第一个条目写回失败被跳过，批量重命名继续处理后续条目
    let renamed = catalogue
        .rename_with_ai(&[first.id, second.id])
        .await
        .unwrap();

    assert_eq!(renamed, 1);
    assert_eq!(store.get(first.id).await.unwrap().display_title, "标题A");
    assert_ne!(store.get(second.id).await.unwrap().display_title, "标题B");
}

#[tokio::test]
#[ignore] // 需要调试端口上的 Chrome 和有效的账号文件：cargo test -- --ignored
async fn douyin_uploader_preflight() {
    logging::init();

    let config = Config::load();
    let uploader = DouyinUploader::new(&config);

    let result = uploader.initialize().await;
    assert!(result.is_ok(), "发布器预检应该成功: {:?}", result.err());
}
