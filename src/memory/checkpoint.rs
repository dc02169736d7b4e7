//! 检查点存储：按会话线程保存序列化后的工作流检查点

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::StoreError;
use crate::db::Database;

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get(&self, thread_id: &str) -> Result<Option<String>, StoreError>;

    /// 覆盖写入该线程的最新检查点
    async fn put(&self, thread_id: &str, checkpoint: &str) -> Result<(), StoreError>;

    /// 删除检查点，返回是否存在过
    async fn delete(&self, thread_id: &str) -> Result<bool, StoreError>;
}

#[derive(Default)]
pub struct InMemoryCheckpointStore {
    items: RwLock<HashMap<String, String>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn get(&self, thread_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.read().await.get(thread_id).cloned())
    }

    async fn put(&self, thread_id: &str, checkpoint: &str) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .insert(thread_id.to_string(), checkpoint.to_string());
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<bool, StoreError> {
        Ok(self.items.write().await.remove(thread_id).is_some())
    }
}

/// checkpoints 表上的存储，进程重启后可继续挂起的会话
pub struct SqliteCheckpointStore {
    db: Arc<Database>,
}

impl SqliteCheckpointStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn get(&self, thread_id: &str) -> Result<Option<String>, StoreError> {
        self.db.checkpoint_get(thread_id)
    }

    async fn put(&self, thread_id: &str, checkpoint: &str) -> Result<(), StoreError> {
        self.db.checkpoint_put(thread_id, checkpoint)
    }

    async fn delete(&self, thread_id: &str) -> Result<bool, StoreError> {
        self.db.checkpoint_delete(thread_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(store: &dyn CheckpointStore) {
        assert_eq!(store.get("t1").await.unwrap(), None);
        store.put("t1", "{\"step\":1}").await.unwrap();
        store.put("t1", "{\"step\":2}").await.unwrap();
        assert_eq!(store.get("t1").await.unwrap().as_deref(), Some("{\"step\":2}"));
        assert!(store.delete("t1").await.unwrap());
        assert!(!store.delete("t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        exercise(&InMemoryCheckpointStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_store() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        exercise(&SqliteCheckpointStore::new(db)).await;
    }
}
