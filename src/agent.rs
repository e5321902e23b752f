//! 无界面智能体运行时
//!
//! 供 TUI 编排器与集成测试共用的一轮交互逻辑：create_agent_components 按配置
//! 组装会话 / 解析器 / 渲染引擎，run_turn 完成「请求 -> 恢复解析 -> 渲染」，
//! process_turn 在其上追加对话日志维护（失败也留下可见轮次）。

use std::sync::Arc;

use crate::a2ui::{default_registry, RecoveryParser, RenderEngine};
use crate::chat::{ConversationLog, ConversationTurn, Message};
use crate::config::AppConfig;
use crate::core::AgentError;
use crate::llm::{create_deepseek_session, AgentSession, MockSession, OpenAiSession};

/// 预组装的智能体组件，可多轮复用；除会话外全部无共享可变状态
pub struct AgentComponents {
    pub session: Arc<dyn AgentSession>,
    pub parser: RecoveryParser,
    pub engine: RenderEngine,
    pub system_prompt: String,
    /// 回放给模型的最大对话轮数
    pub max_context_turns: usize,
}

/// 根据配置与环境变量选择后端（DeepSeek / OpenAI 兼容 / Mock）
pub(crate) fn create_session_from_config(cfg: &AppConfig) -> Arc<dyn AgentSession> {
    let provider = cfg.llm.provider.to_lowercase();
    let use_deepseek = std::env::var("DEEPSEEK_API_KEY").is_ok()
        || (provider == "deepseek" && std::env::var("OPENAI_API_KEY").is_ok());
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "deepseek";

    if use_deepseek {
        let model = cfg
            .llm
            .deepseek
            .model
            .clone()
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using DeepSeek session ({})", model);
        Arc::new(create_deepseek_session(Some(&model)))
    } else if use_openai {
        let model = cfg
            .llm
            .openai
            .model
            .clone()
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using OpenAI session ({})", model);
        Arc::new(OpenAiSession::new(
            cfg.llm.base_url.as_deref(),
            &model,
            std::env::var("OPENAI_API_KEY").ok().as_deref(),
        ))
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock session");
        Arc::new(MockSession)
    }
}

/// 创建智能体组件：会话按配置选择，注册表启动期构建一次后只读共享
pub fn create_agent_components(cfg: &AppConfig) -> AgentComponents {
    let system_prompt = [
        "config/prompts/system.txt",
        "../config/prompts/system.txt",
    ]
    .into_iter()
    .find_map(|p| std::fs::read_to_string(p).ok())
    .unwrap_or_else(|| {
        "You are the EcoView console agent. Reply with exactly one JSON object: \
         {\"version\": \"1.0\", \"components\": [...]}. Component types: text, button, \
         stat-card, container, grid-container."
            .to_string()
    });

    let registry = Arc::new(default_registry());
    let engine = RenderEngine::new(registry).with_max_depth(cfg.a2ui.max_render_depth);

    AgentComponents {
        session: create_session_from_config(cfg),
        parser: RecoveryParser::new(),
        engine,
        system_prompt,
        max_context_turns: cfg.app.max_context_turns,
    }
}

/// 跑一轮：system + 历史回放 + 本轮输入 -> 原始回复 -> 恢复解析 -> 渲染。
/// 成功返回可追加的 AgentUi 轮次；失败的原始回复全文写入日志（tracing），不丢弃。
pub async fn run_turn(
    components: &AgentComponents,
    history: &[Message],
    user_input: &str,
) -> Result<ConversationTurn, AgentError> {
    let mut messages = vec![Message::system(components.system_prompt.clone())];
    messages.extend(history.to_vec());
    messages.push(Message::user(user_input));

    let raw = components.session.request_turn(&messages).await?;

    let payload = components.parser.parse(&raw).map_err(|e| {
        tracing::error!(raw = %e.raw_text(), "Agent reply unusable: {}", e);
        e
    })?;

    tracing::debug!(
        version = %payload.version,
        nodes = payload.node_count(),
        "Payload accepted"
    );
    let rendered = components.engine.render_payload(&payload);

    let (prompt_tokens, completion_tokens, total_tokens) = components.session.token_usage();
    tracing::debug!(prompt_tokens, completion_tokens, total_tokens, "Cumulative token usage");

    Ok(ConversationTurn::AgentUi { payload, rendered })
}

/// 处理单条用户输入并维护日志：先追加用户轮，再追加结果轮；
/// 失败时追加 Failure 轮（每个失败都有可见痕迹），同时把错误返回给调用方。
pub async fn process_turn(
    components: &AgentComponents,
    log: &mut ConversationLog,
    user_input: &str,
) -> Result<(), AgentError> {
    let history = log.to_llm_messages(components.max_context_turns);
    log.push(ConversationTurn::User(user_input.to_string()));

    match run_turn(components, &history, user_input).await {
        Ok(turn) => {
            log.push(turn);
            Ok(())
        }
        Err(e) => {
            log.push(ConversationTurn::Failure(e.user_facing()));
            Err(e)
        }
    }
}
