//! Cadence - 音乐商店客服
//!
//! 入口：加载配置、初始化日志、装配客服助手，在终端里逐行对话。
//! 同一个 --thread 的会话保存在检查点里，重启后可继续（需使用文件数据库）。

use std::path::PathBuf;

use anyhow::Context;
use cadence::config::load_config;
use cadence::react::ReactEvent;
use cadence::{create_support_assistant, observability, TurnOutcome};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Music store customer support assistant")]
#[command(version)]
struct Cli {
    /// Extra config file layered over config/default.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Conversation thread id
    #[arg(short, long, default_value = "cli")]
    thread: String,

    /// Print agent events (handoffs, tool calls) as JSON lines
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.clone()).context("Failed to load config")?;
    observability::init(&cfg.app.log_level);

    let event_tx = if cli.verbose {
        let (tx, mut rx) = mpsc::unbounded_channel::<ReactEvent>();
        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                if let Ok(line) = serde_json::to_string(&ev) {
                    eprintln!("{line}");
                }
            }
        });
        Some(tx)
    } else {
        None
    };

    let assistant = create_support_assistant(&cfg, event_tx).context("Failed to create assistant")?;

    let cancel = assistant.cancellation_token();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel.cancel();
    });

    println!("Cadence support ({}). Type your message, empty line or Ctrl+D to quit.", cli.thread);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            break;
        }
        match assistant.reply(&cli.thread, input).await {
            Ok(TurnOutcome::Reply { text, .. }) => println!("assistant> {text}"),
            Ok(TurnOutcome::AwaitingInput { interrupt, .. }) => println!("assistant> {}", interrupt.payload),
            Err(cadence::core::AgentError::Cancelled) => {
                println!("(cancelled)");
                break;
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
