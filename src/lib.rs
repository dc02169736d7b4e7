//! Cadence - 音乐商店客服多智能体系统
//!
//! 模块划分：
//! - **agent**: 按配置装配客服助手与噪声演示智能体
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 交互记录、错误类型、失败恢复
//! - **db**: SQLite 商店数据与键值 / 检查点表
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）、结构化抽取
//! - **memory**: 消息历史、偏好画像存储、检查点存储
//! - **observability**: 日志初始化
//! - **react**: Planner 与工具循环
//! - **support**: 身份核验、主管路由、子智能体、客服主流程
//! - **tools**: 目录 / 发票查询工具、干扰工具、注册表与执行器
//! - **workflow**: 带中断恢复与检查点的图工作流引擎

pub mod agent;
pub mod config;
pub mod core;
pub mod db;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod support;
pub mod tools;
pub mod workflow;

pub use agent::{create_noisy_agent, create_support_assistant};
pub use support::{SupportAssistant, TurnOutcome};
