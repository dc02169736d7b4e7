//! 工具循环过程事件：供命令行 --verbose 展示路由、工具调用、观察与最终回复

use serde::Serialize;

/// 单步过程事件（可序列化为 JSON）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactEvent {
    /// 某个智能体开始第几步；remaining 为共享步数预算的剩余量
    StepUpdate {
        agent: String,
        step: usize,
        remaining: Option<usize>,
    },
    /// 主管把请求交给子智能体
    Handoff { from: String, to: String },
    /// 调用工具
    ToolCall {
        agent: String,
        tool: String,
        args: serde_json::Value,
    },
    /// 工具返回（预览，避免过长）
    Observation {
        agent: String,
        tool: String,
        preview: String,
    },
    /// 工具执行失败（以合成结果回写给模型）
    ToolFailure {
        agent: String,
        tool: String,
        reason: String,
    },
    /// 错误恢复动作
    Recovery { action: String, detail: String },
    /// 步数预算耗尽
    BudgetExhausted { agent: String },
    /// 智能体的最终回复
    FinalMessage { agent: String, text: String },
}
