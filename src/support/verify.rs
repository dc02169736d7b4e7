//! 身份核验关卡
//!
//! 已核验的记录直接放行。未核验时只从最近一条客户消息中结构化抽取标识符并交给 IdentityResolver：
//! 解析成功则写入 actor_id 并追加确认消息；否则让模型按核验指令生成追问，由流程挂起等待客户回复。

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::{AgentError, InteractionRecord};
use crate::llm::{extract, LlmClient, LlmError};
use crate::memory::Message;
use crate::support::identity::IdentityResolver;
use crate::support::prompts::{
    verification_confirmation, IDENTIFIER_EXTRACTION_PROMPT, VERIFICATION_INSTRUCTIONS,
};

pub const VERIFICATION_AGENT: &str = "verify_info";

/// 标识符抽取的结构化输出
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct IdentifierExtraction {
    /// Identifier, which can be a customer ID, email, or phone number.
    #[serde(default)]
    pub identifier: String,
}

/// 一次核验的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    AlreadyVerified,
    Verified(u64),
    /// 已追加追问，需要客户输入
    NeedsInput,
}

pub struct VerificationGate {
    llm: Arc<dyn LlmClient>,
    resolver: IdentityResolver,
}

impl VerificationGate {
    pub fn new(llm: Arc<dyn LlmClient>, resolver: IdentityResolver) -> Self {
        Self { llm, resolver }
    }

    /// 从最近一条客户消息中抽取标识符；输出不可用等同于没有标识符，调用失败照常上抛
    pub async fn extract_identifier(&self, record: &InteractionRecord) -> Result<String, AgentError> {
        let Some(last) = record.messages().last_user() else {
            return Ok(String::new());
        };
        let input = [Message::user(last.content.clone())];
        match extract::<IdentifierExtraction>(self.llm.as_ref(), IDENTIFIER_EXTRACTION_PROMPT, &input).await {
            Ok(parsed) => Ok(parsed.identifier.trim().to_string()),
            Err(e @ LlmError::InvalidStructuredOutput { .. }) => {
                tracing::warn!(error = %e, "identifier extraction unusable");
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn verify(&self, record: &mut InteractionRecord) -> Result<VerifyOutcome, AgentError> {
        if record.is_verified() {
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        let candidate = self.extract_identifier(record).await?;
        if !candidate.is_empty() {
            if let Some(customer_id) = self.resolver.resolve(&candidate).await? {
                record.set_actor_id(customer_id.to_string())?;
                record.append(Message::system(verification_confirmation(customer_id)));
                tracing::info!(customer_id, "customer verified");
                return Ok(VerifyOutcome::Verified(customer_id));
            }
        }

        let mut prompt = Vec::with_capacity(record.messages().len() + 1);
        prompt.push(Message::system(VERIFICATION_INSTRUCTIONS));
        prompt.extend(record.messages().messages().iter().cloned());
        let reply = self.llm.complete(&prompt).await?;
        record.append(Message::assistant(reply).with_name(VERIFICATION_AGENT));
        tracing::info!(candidate = %candidate, "customer not verified yet");
        Ok(VerifyOutcome::NeedsInput)
    }
}
