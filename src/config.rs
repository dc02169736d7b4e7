//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CADENCE__*` 覆盖（双下划线表示嵌套，如 `CADENCE__LLM__PROVIDER=openai`）。
//! 所有字段都有默认值，空配置即可离线运行（mock LLM + 内存数据库）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub agent: AgentSection,
    pub tools: ToolsSection,
    pub store: StoreSection,
}

/// [app] 段：应用名、数据目录、日志级别
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    /// 数据目录（SQLite 相对路径以此为根），未设置时用 ./data
    pub data_dir: Option<PathBuf>,
    /// 默认日志过滤指令，RUST_LOG 优先
    pub log_level: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "cadence".to_string(),
            data_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppSection {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("data"))
    }
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock；未配置 API Key 时回落到 mock
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub deepseek: LlmDeepSeekSection,
    pub openai: LlmOpenAiSection,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: None,
            base_url: None,
            deepseek: LlmDeepSeekSection::default(),
            openai: LlmOpenAiSection::default(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 单次补全请求超时（秒）
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// 子智能体结果回写到共享历史的方式
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// 只追加子智能体的最后一条消息
    #[default]
    LastMessage,
    /// 追加子智能体产生的全部消息
    FullHistory,
}

/// [agent] 段：步数预算、输出模式、图执行上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 每轮委派共享的 LLM 调用步数
    pub remaining_steps: usize,
    pub output_mode: OutputMode,
    /// 单次 invoke/resume 内图节点执行次数上限
    pub max_graph_iterations: usize,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            remaining_steps: 25,
            output_mode: OutputMode::LastMessage,
            max_graph_iterations: 64,
        }
    }
}

/// [tools] 段：工具超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 30,
        }
    }
}

/// [store] 段：SQLite 路径与演示数据
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// 数据库文件；":memory:" 或未设置时使用内存库，画像与检查点也随进程结束丢失
    pub database: Option<String>,
    /// 首次建库时写入演示用音乐商店数据
    pub seed_demo_data: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            database: None,
            seed_demo_data: true,
        }
    }
}

impl StoreSection {
    /// 解析数据库位置：None 表示内存库；相对路径挂在 data_dir 下
    pub fn database_path(&self, data_dir: &std::path::Path) -> Option<PathBuf> {
        match self.database.as_deref() {
            None | Some(":memory:") | Some("") => None,
            Some(p) => {
                let path = PathBuf::from(p);
                if path.is_absolute() {
                    Some(path)
                } else {
                    Some(data_dir.join(path))
                }
            }
        }
    }
}

/// 从 config 目录加载配置，环境变量 CADENCE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CADENCE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CADENCE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
