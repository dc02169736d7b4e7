//! 长期记忆：按客户隔离的音乐偏好画像
//!
//! 画像存放在 `("memory_profile", actor_id)` 命名空间下的 `user_memory` 键中，跨会话保留。
//! 会话结束时由 MemoryStoreAdapter::save 做一次「读取 - 结构化抽取 - 写回」（合并由模型按提示完成），
//! 同一客户的并发保存通过每客户一把异步锁串行化。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::core::{AgentError, StoreError};
use crate::db::Database;
use crate::llm::{extract, LlmClient, LlmError};
use crate::support::prompts::create_memory_prompt;

pub const PROFILE_NAMESPACE: &str = "memory_profile";
pub const PROFILE_KEY: &str = "user_memory";

/// 客户画像命名空间
pub fn profile_namespace(actor_id: &str) -> [&str; 2] {
    [PROFILE_NAMESPACE, actor_id]
}

/// 持久化的客户画像
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub customer_id: String,
    #[serde(default)]
    pub music_preferences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ActorProfile {
    /// 同内容比较（忽略更新时间）
    fn same_content(&self, other: &ActorProfile) -> bool {
        self.customer_id == other.customer_id && self.music_preferences == other.music_preferences
    }
}

/// 画像整理的结构化输出
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProfileUpdate {
    /// The customer ID of the customer
    #[serde(default)]
    pub customer_id: String,
    /// The music preferences of the customer
    #[serde(default)]
    pub music_preferences: Vec<String>,
}

/// 画像的提示词形式：无偏好时为空串
pub fn format_profile(profile: &ActorProfile) -> String {
    if profile.music_preferences.is_empty() {
        return String::new();
    }
    format!("Music Preferences: {}", profile.music_preferences.join(", "))
}

/// 去空白、去空、按大小写不敏感去重（保留首次出现）
fn normalize_preferences<'a>(prefs: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in prefs {
        let p = p.trim();
        if p.is_empty() || out.iter().any(|seen| seen.eq_ignore_ascii_case(p)) {
            continue;
        }
        out.push(p.to_string());
    }
    out
}

/// 画像存储：命名空间 + 键 -> JSON 值
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, namespace: &[&str], key: &str) -> Result<Option<Value>, StoreError>;

    async fn put(&self, namespace: &[&str], key: &str, value: Value) -> Result<(), StoreError>;
}

fn namespace_key(namespace: &[&str]) -> String {
    namespace.join("/")
}

/// 进程内画像存储（测试与一次性运行）
#[derive(Default)]
pub struct InMemoryProfileStore {
    items: RwLock<HashMap<(String, String), Value>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, namespace: &[&str], key: &str) -> Result<Option<Value>, StoreError> {
        let items = self.items.read().await;
        Ok(items.get(&(namespace_key(namespace), key.to_string())).cloned())
    }

    async fn put(&self, namespace: &[&str], key: &str, value: Value) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .insert((namespace_key(namespace), key.to_string()), value);
        Ok(())
    }
}

/// kv_store 表上的画像存储
pub struct SqliteProfileStore {
    db: Arc<Database>,
}

impl SqliteProfileStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn get(&self, namespace: &[&str], key: &str) -> Result<Option<Value>, StoreError> {
        match self.db.kv_get(&namespace_key(namespace), key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, namespace: &[&str], key: &str, value: Value) -> Result<(), StoreError> {
        self.db
            .kv_put(&namespace_key(namespace), key, &value.to_string())
    }
}

/// 画像读写适配器
pub struct MemoryStoreAdapter {
    store: Arc<dyn ProfileStore>,
    llm: Arc<dyn LlmClient>,
    /// actor_id -> 该客户的保存锁
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl MemoryStoreAdapter {
    pub fn new(store: Arc<dyn ProfileStore>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            store,
            llm,
            locks: RwLock::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, actor_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(actor_id) {
                return Arc::clone(lock);
            }
        }
        let mut locks = self.locks.write().await;
        Arc::clone(locks.entry(actor_id.to_string()).or_default())
    }

    /// 读取已存画像；存储中的内容无法解析时视为不存在
    pub async fn load_profile(&self, actor_id: &str) -> Result<Option<ActorProfile>, StoreError> {
        let Some(value) = self.store.get(&profile_namespace(actor_id), PROFILE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_value::<ActorProfile>(value) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::warn!(actor_id = %actor_id, error = %e, "stored profile is unreadable, ignoring it");
                Ok(None)
            }
        }
    }

    /// 提示词形式的画像；不存在时为空串
    pub async fn load(&self, actor_id: &str) -> Result<String, StoreError> {
        Ok(self
            .load_profile(actor_id)
            .await?
            .map(|p| format_profile(&p))
            .unwrap_or_default())
    }

    /// 根据本次对话更新画像并写回（总是写回，后写者胜）
    pub async fn save(&self, actor_id: &str, transcript: &str) -> Result<ActorProfile, AgentError> {
        let lock = self.lock_for(actor_id).await;
        let _guard = lock.lock().await;

        let previous = self.load_profile(actor_id).await?;
        let previous_text = previous.as_ref().map(format_profile).unwrap_or_default();
        let prompt = create_memory_prompt(transcript, &previous_text);

        // 模型给出的是整理后的完整画像；只有输出不可用时才沿用旧画像
        let preferences = match extract::<ProfileUpdate>(self.llm.as_ref(), &prompt, &[]).await {
            Ok(update) => {
                if !update.customer_id.is_empty() && update.customer_id != actor_id {
                    tracing::debug!(actor_id = %actor_id, echoed = %update.customer_id, "ignoring customer id echoed by the model");
                }
                update.music_preferences
            }
            Err(e @ LlmError::InvalidStructuredOutput { .. }) => {
                tracing::warn!(actor_id = %actor_id, error = %e, "profile extraction unusable, keeping previous profile");
                previous
                    .as_ref()
                    .map(|p| p.music_preferences.clone())
                    .unwrap_or_default()
            }
            Err(e) => return Err(e.into()),
        };

        let mut profile = ActorProfile {
            customer_id: actor_id.to_string(),
            music_preferences: normalize_preferences(preferences.iter()),
            updated_at: Some(Utc::now()),
        };
        if let Some(prev) = previous.as_ref().filter(|p| p.same_content(&profile)) {
            profile.updated_at = prev.updated_at;
        }

        self.store
            .put(
                &profile_namespace(actor_id),
                PROFILE_KEY,
                serde_json::to_value(&profile).map_err(StoreError::from)?,
            )
            .await?;
        tracing::info!(
            actor_id = %actor_id,
            preferences = profile.music_preferences.len(),
            "profile saved"
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLlmClient, ScriptedLlmClient};

    fn adapter_with(llm: Arc<dyn LlmClient>) -> MemoryStoreAdapter {
        MemoryStoreAdapter::new(Arc::new(InMemoryProfileStore::new()), llm)
    }

    #[test]
    fn test_format_profile() {
        let mut profile = ActorProfile {
            customer_id: "1".to_string(),
            ..Default::default()
        };
        assert_eq!(format_profile(&profile), "");
        profile.music_preferences = vec!["rock".to_string(), "jazz".to_string()];
        assert_eq!(format_profile(&profile), "Music Preferences: rock, jazz");
    }

    #[tokio::test]
    async fn test_absent_profile_loads_as_empty() {
        let adapter = adapter_with(Arc::new(MockLlmClient::new()));
        assert_eq!(adapter.load("60").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_save_then_load_reflects_preference() {
        let adapter = adapter_with(Arc::new(MockLlmClient::new()));
        let transcript = "user: I really like jazz\nassistant(supervisor): noted";
        adapter.save("60", transcript).await.unwrap();
        assert_eq!(adapter.load("60").await.unwrap(), "Music Preferences: jazz");

        // 不变的对话保存两次，画像不变
        let first = adapter.load_profile("60").await.unwrap().unwrap();
        let second = adapter.save("60", transcript).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_model_profile_is_stored_and_echoed_id_ignored() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"customer_id": "60", "music_preferences": ["Rock", " ", "rock"]}"#,
            r#"{"customer_id": "999", "music_preferences": ["Rock", "Blues"]}"#,
            r#"{"customer_id": "60", "music_preferences": ["jazz"]}"#,
            "I am not sure what to say",
        ]));
        let adapter = adapter_with(llm.clone());
        let profile = adapter.save("60", "user: rock please").await.unwrap();
        assert_eq!(profile.music_preferences, vec!["Rock"]);
        let profile = adapter.save("60", "user: and blues").await.unwrap();
        assert_eq!(profile.customer_id, "60");
        assert_eq!(profile.music_preferences, vec!["Rock", "Blues"]);

        // 客户改口时模型给出的修订版画像原样写回
        let profile = adapter
            .save("60", "user: actually I hate rock now, only jazz")
            .await
            .unwrap();
        assert_eq!(profile.music_preferences, vec!["jazz"]);
        assert_eq!(adapter.load("60").await.unwrap(), "Music Preferences: jazz");

        // 输出不可用时沿用旧画像并照常写回
        let profile = adapter.save("60", "user: hmm").await.unwrap();
        assert_eq!(profile.music_preferences, vec!["jazz"]);

        // 第二次抽取的提示里带着已有画像
        let prompt = &llm.requests()[1][0].content;
        assert!(prompt.contains("Music Preferences: Rock"));
    }

    #[tokio::test]
    async fn test_llm_outage_fails_save_and_keeps_stored_profile() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"customer_id": "60", "music_preferences": ["metal"]}"#,
        ]));
        let adapter = adapter_with(llm);
        adapter.save("60", "user: metal").await.unwrap();
        let before = adapter.load_profile("60").await.unwrap();

        let err = adapter.save("60", "user: and pop").await.unwrap_err();
        assert!(matches!(err, AgentError::LlmError(LlmError::ScriptExhausted)));
        assert_eq!(adapter.load_profile("60").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_concurrent_saves_for_one_actor_keep_both_updates() {
        let adapter = Arc::new(adapter_with(Arc::new(MockLlmClient::new())));
        let a = {
            let adapter = adapter.clone();
            tokio::spawn(async move { adapter.save("7", "user: I like metal").await })
        };
        let b = {
            let adapter = adapter.clone();
            tokio::spawn(async move { adapter.save("7", "user: I like reggae").await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
        let profile = adapter.load_profile("7").await.unwrap().unwrap();
        let mut prefs = profile.music_preferences.clone();
        prefs.sort();
        assert_eq!(prefs, vec!["metal", "reggae"]);
    }

    #[tokio::test]
    async fn test_sqlite_store_persists_profiles() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let store = SqliteProfileStore::new(db.clone());
        assert!(store.get(&profile_namespace("1"), PROFILE_KEY).await.unwrap().is_none());
        store
            .put(
                &profile_namespace("1"),
                PROFILE_KEY,
                serde_json::json!({"customer_id": "1", "music_preferences": ["blues"]}),
            )
            .await
            .unwrap();
        let adapter = MemoryStoreAdapter::new(Arc::new(SqliteProfileStore::new(db)), Arc::new(MockLlmClient::new()));
        assert_eq!(adapter.load("1").await.unwrap(), "Music Preferences: blues");
    }
}
