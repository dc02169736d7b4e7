//! Planner：调用 LLM 并解析回复
//!
//! 回复要么是给客户的纯文本，要么是 `{"tool_calls": [...]}` 形式的工具调用请求
//! （也接受单个 `{"tool": ..., "args": ...}`）。

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::core::AgentError;
use crate::llm::structured::extract_json_block;
use crate::llm::LlmClient;
use crate::memory::{Message, ToolCall};

#[derive(Debug, Deserialize)]
struct RawCall {
    tool: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
struct RawCalls {
    tool_calls: Vec<RawCall>,
}

/// Planner 输出
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerOutput {
    /// 直接回复
    Response(String),
    /// 按顺序执行的工具调用
    ToolCalls(Vec<ToolCall>),
}

fn into_calls(raw: Vec<RawCall>) -> Vec<ToolCall> {
    raw.into_iter()
        .filter(|c| !c.tool.trim().is_empty())
        .map(|c| ToolCall::new(c.tool.trim(), c.args))
        .collect()
}

/// 解析 LLM 输出
///
/// JSON 对象里带 `tool_calls` 或 `tool` 键才算工具请求；回复中提到了 `"tool_calls"`
/// 却无法解析时返回 JsonParseError，交给恢复引擎要求重写。其余一律视为文本回复。
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, AgentError> {
    let trimmed = output.trim();
    let mentions_calls = trimmed.contains("\"tool_calls\"");

    let parsed = extract_json_block(trimmed).and_then(|block| {
        serde_json::from_str::<Value>(block)
            .ok()
            .map(|value| (block, value))
    });

    let Some((block, value)) = parsed else {
        if mentions_calls {
            return Err(AgentError::JsonParseError(trimmed.to_string()));
        }
        return Ok(PlannerOutput::Response(trimmed.to_string()));
    };

    let calls = if value.get("tool_calls").is_some() {
        serde_json::from_value::<RawCalls>(value)
            .map(|r| into_calls(r.tool_calls))
            .map_err(|e| AgentError::JsonParseError(format!("{e}: {block}")))?
    } else if value.get("tool").is_some() {
        serde_json::from_value::<RawCall>(value)
            .map(|c| into_calls(vec![c]))
            .map_err(|e| AgentError::JsonParseError(format!("{e}: {block}")))?
    } else {
        return Ok(PlannerOutput::Response(trimmed.to_string()));
    };

    if calls.is_empty() {
        Ok(PlannerOutput::Response(trimmed.to_string()))
    } else {
        Ok(PlannerOutput::ToolCalls(calls))
    }
}

/// Planner：持有 LLM 与 system prompt，每次调用把 system 拼在消息前
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub async fn plan(&self, messages: &[Message]) -> Result<String, AgentError> {
        let mut full_messages = Vec::with_capacity(messages.len() + 1);
        full_messages.push(Message::system(self.system_prompt.clone()));
        full_messages.extend(messages.iter().cloned());
        tracing::debug!(model = %self.llm.model(), messages = full_messages.len(), "planning");
        Ok(self.llm.complete(&full_messages).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let out = parse_llm_output("  Here are some rock songs.  ").unwrap();
        assert_eq!(out, PlannerOutput::Response("Here are some rock songs.".to_string()));
    }

    #[test]
    fn test_parse_tool_calls_in_order() {
        let out = parse_llm_output(
            r#"```json
{"tool_calls": [{"tool": "get_albums_by_artist", "args": {"artist": "AC/DC"}},
                {"tool": "check_for_songs", "args": {"song_title": "Holiday"}}]}
```"#,
        )
        .unwrap();
        let PlannerOutput::ToolCalls(calls) = out else {
            panic!("expected tool calls");
        };
        let names: Vec<&str> = calls.iter().map(|c| c.tool.as_str()).collect();
        assert_eq!(names, vec!["get_albums_by_artist", "check_for_songs"]);
        assert_eq!(calls[0].args["artist"], "AC/DC");
        assert_ne!(calls[0].id, calls[1].id);
    }

    #[test]
    fn test_parse_single_call_shape() {
        let out = parse_llm_output(r#"{"tool": "get_songs_by_genre", "args": {"genre": "jazz"}}"#).unwrap();
        assert!(matches!(out, PlannerOutput::ToolCalls(calls) if calls.len() == 1));
    }

    #[test]
    fn test_text_with_embedded_rows_is_a_response() {
        let text = r#"Here is what I found: [{"Title": "Let There Be Rock", "Name": "AC/DC"}, {"Title": "Big Ones", "Name": "Aerosmith"}]"#;
        assert!(matches!(parse_llm_output(text).unwrap(), PlannerOutput::Response(_)));
    }

    #[test]
    fn test_broken_tool_call_json_is_an_error() {
        let err = parse_llm_output(r#"{"tool_calls": [{"tool": "x", "args": }"#).unwrap_err();
        assert!(matches!(err, AgentError::JsonParseError(_)));
        let err = parse_llm_output(r#"{"tool_calls": "get_albums_by_artist"}"#).unwrap_err();
        assert!(matches!(err, AgentError::JsonParseError(_)));
    }

    #[test]
    fn test_empty_call_list_is_a_response() {
        let out = parse_llm_output(r#"{"tool_calls": []}"#).unwrap();
        assert!(matches!(out, PlannerOutput::Response(_)));
    }
}
