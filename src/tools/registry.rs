//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute）。
//! ToolRegistry 在启动时一次性构建、之后只读，通过 Arc 在智能体之间共享；重名工具在构建时被拒绝。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema（供 LLM 生成正确的参数格式）
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具；Err 中的文本会作为 "Error: ..." 工具结果回写给模型
    async fn execute(&self, args: Value) -> Result<String, String>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),

    #[error("tool name must not be empty")]
    EmptyName,
}

/// 不可变工具表：保持注册顺序（prompt 中的工具列表稳定），按名索引
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn from_tools<I>(tools: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut registry = Self::default();
        for tool in tools {
            let name = tool.name().to_string();
            if name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if registry.index.contains_key(&name) {
                return Err(RegistryError::DuplicateName(name));
            }
            registry.index.insert(name, registry.tools.len());
            registry.tools.push(tool);
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 注册顺序的工具名
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// 工具 schema JSON（name / description / parameters），拼入 system prompt
    pub fn to_schema_json(&self) -> String {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "test tool"
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_registry_rejects_duplicates_and_keeps_order() {
        let ok = ToolRegistry::from_tools(vec![
            Arc::new(Named("b")) as Arc<dyn Tool>,
            Arc::new(Named("a")),
        ])
        .unwrap();
        assert_eq!(ok.tool_names(), vec!["b", "a"]);
        assert!(ok.contains("a"));
        assert!(ok.to_schema_json().contains("\"b\""));

        let err = ToolRegistry::from_tools(vec![
            Arc::new(Named("a")) as Arc<dyn Tool>,
            Arc::new(Named("a")),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("a".to_string()));

        let err = ToolRegistry::from_tools(vec![Arc::new(Named(" ")) as Arc<dyn Tool>]).unwrap_err();
        assert_eq!(err, RegistryError::EmptyName);
    }
}
