//! Shop Agent - 对话式购物助手
//!
//! 入口：初始化日志、加载配置、创建 Agent 与会话监管，并运行命令行输入循环。
//! 用法：`shop-agent [config.toml]`；输入 exit / quit 或 Ctrl+C 退出。

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use shop_agent::agent::create_shop_agent;
use shop_agent::config::{load_config, AppConfig};
use shop_agent::core::{AgentError, SessionSupervisor};
use shop_agent::observability;
use shop_agent::react::ReactEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ReactEvent>();
    let agent = create_shop_agent(&cfg)
        .context("Failed to create agent")?
        .with_event_tx(event_tx);
    let supervisor = Arc::new(SessionSupervisor::new(agent, cfg.retry.policy()));

    // 进度展示：只显示工具调用
    tokio::spawn(async move {
        while let Some(ev) = event_rx.recv().await {
            if let ReactEvent::ToolCall { tool, parameters } = ev {
                eprintln!("  -> {} {}", tool, parameters);
            }
        }
    });

    // Ctrl+C 只置停止标志，进行中的请求照常完成
    let sup = supervisor.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after current request");
            sup.cancel();
        }
    });

    println!("{} ready. Type 'help' for commands, 'exit' to quit.", cfg.app.name);

    let cancel = supervisor.cancel_token();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = cancel.cancelled() => break,
        };
        let Some(line) = line else { break };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match supervisor.submit_with_retry(input).await {
            Ok(text) => println!("{}\n", text),
            Err(AgentError::Cancelled) => break,
            Err(e) => println!("Error: {}\n", e),
        }
    }

    println!("Bye.");
    Ok(())
}
