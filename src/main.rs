//! EcoView - IoT 环境监测管理台的 Agentic UI 面板
//!
//! 入口：初始化日志、创建编排器与 TUI，并运行主循环。

use anyhow::Context;
use ecoview::{core::create_console, observability, ui::run_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    observability::init();

    // 创建编排器：返回命令发送端与状态接收端
    let (cmd_tx, state_rx) = create_console(None)
        .await
        .context("Failed to create console runtime")?;

    // 启动 TUI 主循环（消费 state，向 cmd_tx 发送用户指令）
    run_app(state_rx, cmd_tx).await.context("App run failed")?;

    Ok(())
}
