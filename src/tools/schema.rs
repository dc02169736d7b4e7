//! 工具调用 JSON Schema 生成（schemars 自动生成）
//!
//! 用于将「合法 tool call」的 JSON 结构注入 system prompt，减少 LLM 输出格式错误。

use schemars::{schema_for, JsonSchema};
use serde_json::{Map, Value};

/// 单次工具调用
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallEntry {
    /// 工具名，必须是可用工具列表中的一个
    pub tool: String,
    /// 工具参数，按该工具的 parameters schema 填写
    pub args: Map<String, Value>,
}

/// 一次回复中的工具调用请求：按顺序依次执行
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallsFormat {
    pub tool_calls: Vec<ToolCallEntry>,
}

/// 返回工具调用的 JSON Schema 字符串，可拼入 system prompt
pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallsFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
