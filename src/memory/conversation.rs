//! 短期记忆：对话消息与只追加的消息日志
//!
//! MessageLog 是交互记录中 messages 字段的载体：只追加、保持时间顺序，
//! merge 按消息 id 去重，重复应用同一步的更新不会让历史膨胀。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 消息角色（与 LLM API 一致，Tool 为工具返回结果）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

/// 模型发起的一次工具调用（JSON：{"tool": "get_albums_by_artist", "args": {"artist": "AC/DC"}}）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, args: Value) -> Self {
        Self {
            id: format!("call_{}", short_id()),
            tool: tool.into(),
            args,
        }
    }
}

/// 格式纠正提示的发言者名；这类消息不属于客户发言
pub const RECOVERY_SPEAKER: &str = "recovery";

/// 单条消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// 发言者名（子智能体名 / 工具名）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: format!("msg_{}", short_id()),
            role,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// 输出无法解析时追加给模型的纠正提示
    pub fn recovery(content: impl Into<String>) -> Self {
        Self::new(Role::User, content).with_name(RECOVERY_SPEAKER)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// 带工具调用请求的 assistant 消息
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        msg.tool_calls = calls;
        msg
    }

    /// 工具执行结果，回指对应的 tool_call_id
    pub fn tool(call: &ToolCall, content: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.name = Some(call.tool.clone());
        msg.tool_call_id = Some(call.id.clone());
        msg
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_recovery(&self) -> bool {
        self.name.as_deref() == Some(RECOVERY_SPEAKER)
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// 一行文本形式，用于拼接对话记录（记忆抽取 prompt）
    pub fn render(&self) -> String {
        let speaker = match &self.name {
            Some(name) => format!("{}({})", self.role.as_str(), name),
            None => self.role.as_str().to_string(),
        };
        if self.tool_calls.is_empty() {
            format!("{}: {}", speaker, self.content)
        } else {
            let calls: Vec<String> = self
                .tool_calls
                .iter()
                .map(|c| format!("{}({})", c.tool, c.args))
                .collect();
            format!("{}: {} [tool calls: {}]", speaker, self.content, calls.join(", "))
        }
    }
}

/// 只追加的消息日志
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条消息；id 已存在时忽略并返回 false
    pub fn push(&mut self, msg: Message) -> bool {
        if self.contains(&msg.id) {
            return false;
        }
        self.messages.push(msg);
        true
    }

    /// 合并一批更新：按顺序追加未出现过的消息，返回实际追加条数
    pub fn merge(&mut self, update: impl IntoIterator<Item = Message>) -> usize {
        update.into_iter().filter(|m| self.push(m.clone())).count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// 最近一条用户消息
    pub fn last_user(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User && !m.is_recovery())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 整段对话的文本记录（不含纠正提示）
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .filter(|m| !m.is_recovery())
            .map(Message::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<Message>> for MessageLog {
    fn from(messages: Vec<Message>) -> Self {
        let mut log = Self::new();
        log.merge(messages);
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_append_only_and_idempotent() {
        let mut log = MessageLog::new();
        let a = Message::user("hi");
        let b = Message::assistant("hello");
        let b_id = b.id.clone();
        assert_eq!(log.merge(vec![a.clone(), b.clone()]), 2);
        // 重放同一批更新不会重复追加
        assert_eq!(log.merge(vec![a.clone(), b.clone()]), 0);
        let c = Message::user("my id is 5");
        assert_eq!(log.merge(vec![b, c.clone()]), 1);
        let ids: Vec<&str> = log.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), b_id.as_str(), c.id.as_str()]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_last_user_skips_other_roles() {
        let mut log = MessageLog::new();
        log.push(Message::user("first"));
        log.push(Message::user("second"));
        log.push(Message::system("note"));
        assert_eq!(log.last_user().map(|m| m.content.as_str()), Some("second"));
    }

    #[test]
    fn test_transcript_and_last_user_skip_recovery_prompts() {
        let mut log = MessageLog::new();
        log.push(Message::user("I like the blues"));
        log.push(Message::assistant("not json").with_name("supervisor"));
        log.push(Message::recovery("Reply with a valid JSON block"));
        log.push(Message::assistant("Noted!").with_name("supervisor"));
        let transcript = log.transcript();
        assert!(!transcript.contains("valid JSON"), "{transcript}");
        assert!(transcript.starts_with("user: I like the blues"));
        assert!(transcript.ends_with("assistant(supervisor): Noted!"));
        assert_eq!(
            log.last_user().map(|m| m.content.as_str()),
            Some("I like the blues")
        );
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_tool_message_links_call() {
        let call = ToolCall::new("check_for_songs", serde_json::json!({"song_title": "Holiday"}));
        let msg = Message::tool(&call, "[]");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some(call.id.as_str()));
        assert_eq!(msg.name.as_deref(), Some("check_for_songs"));
    }

    #[test]
    fn test_log_serializes_as_plain_array() {
        let mut log = MessageLog::new();
        log.push(Message::user("hi").with_name("customer"));
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        let back: MessageLog = serde_json::from_value(json).unwrap();
        assert_eq!(back, log);
    }
}
