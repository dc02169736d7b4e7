//! 结构化抽取：schemars 生成目标类型的 JSON Schema 注入 system prompt，
//! 再从回复中取出 JSON 对象反序列化为目标类型。

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

use crate::llm::{LlmClient, LlmError};
use crate::memory::Message;

/// 从模型回复中取出 JSON 块（```json ... ``` 或首个 '{' 到最后一个 '}'）
pub fn extract_json_block(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        let body = rest.find("```").map(|end| &rest[..end]).unwrap_or(rest);
        return Some(body.trim());
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// 目标类型的 JSON Schema（pretty 格式）
pub fn schema_json<T: JsonSchema>() -> String {
    let schema = schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// 在指令后附加输出格式约束
pub fn structured_system_prompt<T: JsonSchema>(instructions: &str) -> String {
    format!(
        "{}\n\nRespond with a single JSON object for `{}` that matches this JSON Schema. \
         Output only the JSON object.\n{}",
        instructions.trim_end(),
        T::schema_name(),
        schema_json::<T>()
    )
}

pub fn parse_structured<T: JsonSchema + DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let invalid = |reason: String| LlmError::InvalidStructuredOutput {
        schema: T::schema_name(),
        reason,
    };
    let block = extract_json_block(raw).ok_or_else(|| invalid("no JSON object found".to_string()))?;
    serde_json::from_str(block).map_err(|e| invalid(e.to_string()))
}

/// 调用 LLM 做一次结构化抽取：system(指令 + schema) + messages
pub async fn extract<T: JsonSchema + DeserializeOwned>(
    llm: &dyn LlmClient,
    instructions: &str,
    messages: &[Message],
) -> Result<T, LlmError> {
    let mut full = Vec::with_capacity(messages.len() + 1);
    full.push(Message::system(structured_system_prompt::<T>(instructions)));
    full.extend(messages.iter().cloned());
    let raw = llm.complete(&full).await?;
    tracing::debug!(schema = %T::schema_name(), raw = %raw, "structured output");
    parse_structured(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Probe {
        /// 测试字段
        value: String,
    }

    #[test]
    fn test_extract_json_block_variants() {
        assert_eq!(extract_json_block("{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(
            extract_json_block("Sure!\n```json\n{\"a\": 2}\n```\nthanks"),
            Some("{\"a\": 2}")
        );
        assert_eq!(extract_json_block("prefix {\"a\": 3} suffix"), Some("{\"a\": 3}"));
        assert_eq!(extract_json_block("no json here"), None);
    }

    #[test]
    fn test_prompt_mentions_schema_name_and_fields() {
        let prompt = structured_system_prompt::<Probe>("Extract the value.");
        assert!(prompt.starts_with("Extract the value."));
        assert!(prompt.contains("`Probe`"));
        assert!(prompt.contains("\"value\""));
    }

    #[test]
    fn test_parse_structured_errors_name_the_schema() {
        let ok: Probe = parse_structured("{\"value\": \"x\"}").unwrap();
        assert_eq!(ok.value, "x");
        match parse_structured::<Probe>("I could not find anything") {
            Err(LlmError::InvalidStructuredOutput { schema, .. }) => assert_eq!(schema, "Probe"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
