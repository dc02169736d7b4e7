//! 记忆层：短期（对话消息日志）、长期（客户偏好画像）、会话检查点

pub mod checkpoint;
pub mod conversation;
pub mod profile;

pub use checkpoint::{CheckpointStore, InMemoryCheckpointStore, SqliteCheckpointStore};
pub use conversation::{Message, MessageLog, Role, ToolCall};
pub use profile::{
    format_profile, ActorProfile, InMemoryProfileStore, MemoryStoreAdapter, ProfileStore,
    SqliteProfileStore, PROFILE_KEY, PROFILE_NAMESPACE,
};
