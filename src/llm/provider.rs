//! 按配置选择 LLM 后端
//!
//! DeepSeek 提供与 OpenAI 完全兼容的 API 接口。
//! - Base URL: https://api.deepseek.com
//! - 模型: deepseek-chat (常规对话), deepseek-reasoner (思考模式)
//!
//! 未配置任何 API Key 时回落到 MockLlmClient，便于离线跑通整条客服流程。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::{LlmClient, MockLlmClient, OpenAiClient};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";
pub const DEEPSEEK_REASONER: &str = "deepseek-reasoner";

/// 由 [llm] 段与环境变量决定后端：
/// - provider = "mock" 时始终使用 Mock
/// - 有 DEEPSEEK_API_KEY，或 provider = "deepseek" 且仅有 OPENAI_API_KEY 时走 DeepSeek 端点
/// - 有 OPENAI_API_KEY 且 provider 不是 deepseek 时走 OpenAI 兼容端点（可配 base_url）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let deepseek_key = std::env::var("DEEPSEEK_API_KEY").ok();
    let openai_key = std::env::var("OPENAI_API_KEY").ok();
    let timeout = cfg.llm.timeouts.request;

    if provider == "mock" {
        tracing::info!("Using Mock LLM (provider = mock)");
        return Arc::new(MockLlmClient::new());
    }

    let use_deepseek = provider != "openai"
        && (deepseek_key.is_some() || (provider == "deepseek" && openai_key.is_some()));
    let use_openai = openai_key.is_some() && provider != "deepseek";

    if use_deepseek {
        let model = cfg
            .llm
            .deepseek
            .model
            .clone()
            .or_else(|| cfg.llm.model.clone())
            .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
            .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());
        let key = deepseek_key.or(openai_key);
        tracing::info!("Using DeepSeek LLM ({})", model);
        Arc::new(OpenAiClient::new(
            Some(DEEPSEEK_BASE_URL),
            &model,
            key.as_deref(),
            timeout,
        ))
    } else if use_openai {
        let model = cfg
            .llm
            .openai
            .model
            .clone()
            .or_else(|| cfg.llm.model.clone())
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        tracing::info!("Using OpenAI LLM ({})", model);
        Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &model,
            openai_key.as_deref(),
            timeout,
        ))
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_is_used_offline() {
        let cfg = AppConfig::default();
        let llm = create_llm_from_config(&cfg);
        assert_eq!(llm.model(), "mock");
    }
}
