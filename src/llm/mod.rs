//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock / Scripted）与结构化抽取

pub mod mock;
pub mod openai;
pub mod provider;
pub mod structured;
pub mod traits;

pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use provider::{create_llm_from_config, DEEPSEEK_BASE_URL, DEEPSEEK_CHAT, DEEPSEEK_REASONER};
pub use structured::{extract, parse_structured, structured_system_prompt};
pub use traits::{LlmClient, LlmError};
