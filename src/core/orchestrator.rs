//! 编排器：主控循环
//!
//! 加载配置、组装智能体组件、建立 cmd/state 两通道，并在后台任务中消费用户
//! 命令（Submit/Cancel/Clear/Quit）。一轮交互放入独立任务执行，编排器继续
//! 响应命令；Cancel 触发取消令牌并留下可见提示，Clear 连同进行中的轮次一并
//! 放弃，不会把旧轮次的回复写进清空后的日志。同一会话内轮次按提交顺序处理，
//! 进行中再收到 Submit 直接忽略。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::agent::{create_agent_components, run_turn, AgentComponents};
use crate::chat::{ConversationLog, ConversationTurn};
use crate::config::{load_config, AppConfig};
use crate::core::{AgentError, AgentPhase, UiState};

/// 启动问候（本地提示，不回放给模型）
const GREETING: &str = "您好，我是 EcoView 管理台智能体，描述需求即可生成面板。";
/// 清空对话后的本地提示
const CLEARED_NOTICE: &str = "对话已清空。";

/// 从 UI 发往编排器的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交用户输入，触发一轮 A2UI 交互
    Submit(String),
    /// 取消当前生成
    Cancel,
    /// 清空对话
    Clear,
    /// 退出应用
    Quit,
}

/// 进行中轮次的句柄：取消令牌 + 结果通道接收端
struct PendingTurn {
    token: CancellationToken,
    done_rx: mpsc::Receiver<Result<ConversationTurn, AgentError>>,
}

/// 创建管理台智能体面板运行时：返回命令发送端与状态接收端。
/// 显式传入的配置文件加载失败即报错；隐式查找失败才退回默认配置。
pub async fn create_console(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(mpsc::UnboundedSender<Command>, watch::Receiver<UiState>)> {
    let explicit = config_path.is_some();
    let cfg = match load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) if explicit => {
            return Err(AgentError::ConfigError(e.to_string()).into());
        }
        Err(e) => {
            tracing::warn!("Config load failed ({}), using defaults", e);
            AppConfig::default()
        }
    };

    let components = Arc::new(create_agent_components(&cfg));
    Ok(spawn_console(components))
}

/// 用现成组件启动命令循环（create_console 与测试共用）
pub fn spawn_console(
    components: Arc<AgentComponents>,
) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(UiState::default());

    tokio::spawn(async move {
        let mut log = ConversationLog::new();
        let mut pending: Option<PendingTurn> = None;

        log.push(ConversationTurn::AgentText(GREETING.to_string()));
        let _ = state_tx.send(project(&log, AgentPhase::Idle, false, &components));

        loop {
            // 进行中：同时等命令与轮次结果；空闲：只等命令
            let next = if let Some(p) = pending.as_mut() {
                tokio::select! {
                    cmd = cmd_rx.recv() => Event::Cmd(cmd),
                    result = p.done_rx.recv() => Event::TurnDone(result),
                }
            } else {
                Event::Cmd(cmd_rx.recv().await)
            };

            match next {
                Event::TurnDone(result) => {
                    pending = None;
                    match result {
                        Some(Ok(turn)) => log.push(turn),
                        Some(Err(e)) => log.push(ConversationTurn::Failure(e.user_facing())),
                        // 任务被取消丢弃
                        None => log.push(ConversationTurn::Failure(
                            AgentError::Cancelled.user_facing(),
                        )),
                    }
                    let _ = state_tx.send(project(&log, AgentPhase::Idle, false, &components));
                }
                Event::Cmd(None) => break,
                Event::Cmd(Some(cmd)) => match cmd {
                    Command::Submit(input) => {
                        if pending.is_some() {
                            // 一轮未结束，忽略新提交（UI 侧本就锁定输入）
                            tracing::debug!("Submit ignored: turn already in flight");
                            continue;
                        }
                        let history = log.to_llm_messages(components.max_context_turns);
                        log.push(ConversationTurn::User(input.clone()));
                        let _ =
                            state_tx.send(project(&log, AgentPhase::Thinking, true, &components));

                        let token = CancellationToken::new();
                        let (done_tx, done_rx) = mpsc::channel(1);
                        spawn_turn(components.clone(), history, input, token.clone(), done_tx);
                        pending = Some(PendingTurn { token, done_rx });
                    }
                    Command::Cancel => {
                        if let Some(p) = &pending {
                            p.token.cancel();
                        }
                    }
                    Command::Clear => {
                        // 进行中的轮次一并放弃，结果通道随句柄丢弃，
                        // 旧轮次不会写进清空后的日志
                        if let Some(p) = pending.take() {
                            p.token.cancel();
                        }
                        log.clear();
                        log.push(ConversationTurn::AgentText(CLEARED_NOTICE.to_string()));
                        let _ = state_tx.send(project(&log, AgentPhase::Idle, false, &components));
                    }
                    Command::Quit => break,
                },
            }
        }
    });

    (cmd_tx, state_rx)
}

enum Event {
    Cmd(Option<Command>),
    TurnDone(Option<Result<ConversationTurn, AgentError>>),
}

/// 在独立任务中跑一轮；取消时直接放弃结果（done_tx 被 drop，接收端得 None）
fn spawn_turn(
    components: Arc<AgentComponents>,
    history: Vec<crate::chat::Message>,
    input: String,
    token: CancellationToken,
    done_tx: mpsc::Sender<Result<ConversationTurn, AgentError>>,
) {
    tokio::spawn(async move {
        tokio::select! {
            result = run_turn(&components, &history, &input) => {
                let _ = done_tx.send(result).await;
            }
            _ = token.cancelled() => {
                tracing::info!("Turn cancelled, discarding pending result");
            }
        }
    });
}

/// 把日志与阶段投影为 UiState；最新一轮若是 Failure 则作为错误文案
fn project(
    log: &ConversationLog,
    phase: AgentPhase,
    input_locked: bool,
    components: &AgentComponents,
) -> UiState {
    let error_message = match log.turns().last() {
        Some(ConversationTurn::Failure(msg)) => Some(msg.clone()),
        _ => None,
    };
    let phase = if error_message.is_some() && phase == AgentPhase::Idle {
        AgentPhase::Error
    } else {
        phase
    };
    UiState {
        phase,
        turns: log.turns().to_vec(),
        input_locked,
        error_message,
        tokens_total: components.session.token_usage().2,
    }
}
