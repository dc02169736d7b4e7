//! Cadence 噪声演示
//!
//! 单个智能体挂载音乐目录工具与数十个无关业务的干扰工具，观察模型在大工具集下的选择。
//!
//! 启动: cargo run --bin cadence-noisy -- --prompt "Recommend me some blues"

use std::path::PathBuf;

use anyhow::Context;
use cadence::config::load_config;
use cadence::core::InteractionRecord;
use cadence::memory::Message;
use cadence::react::ReactEvent;
use cadence::{create_noisy_agent, observability};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "cadence-noisy")]
#[command(about = "Single agent with a large set of distractor tools")]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run one prompt and exit; interactive when omitted
    #[arg(short, long)]
    prompt: Option<String>,

    /// Load saved preferences of this customer id into the prompt
    #[arg(long)]
    customer: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.clone()).context("Failed to load config")?;
    observability::init(&cfg.app.log_level);

    let components = create_noisy_agent(&cfg).context("Failed to create noisy agent")?;
    println!("{} tools registered", components.agent.tool_count());

    let mut record = InteractionRecord::new();
    if let Some(customer) = &cli.customer {
        record.set_actor_id(customer.clone())?;
        let memory = components.memory.load(customer).await?;
        record.set_loaded_memory(memory)?;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<ReactEvent>();
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            if let ReactEvent::ToolCall { tool, args, .. } = ev {
                eprintln!("  -> {tool} {args}");
            }
        }
    });

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        ctrl_c.cancel();
    });

    if let Some(prompt) = cli.prompt {
        record.append(Message::user(prompt));
        let outcome = components.agent.run(&mut record, cancel, Some(&tx)).await?;
        println!("{}", outcome.final_text());
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            break;
        }
        record.append(Message::user(input));
        let outcome = components.agent.run(&mut record, cancel.clone(), Some(&tx)).await?;
        println!("assistant> {}", outcome.final_text());
    }
    Ok(())
}
