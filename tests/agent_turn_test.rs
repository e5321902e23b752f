//! 智能体单轮集成测试：请求 -> 恢复解析 -> 渲染 -> 日志

use std::sync::Arc;

use async_trait::async_trait;

use ecoview::a2ui::{default_registry, Element, RecoveryParser, RenderEngine, RenderedNode};
use ecoview::agent::{process_turn, AgentComponents};
use ecoview::chat::{ConversationLog, ConversationTurn, Message};
use ecoview::core::AgentError;
use ecoview::llm::{AgentSession, MockSession, TransportError};

/// 固定回复的会话
struct ScriptedSession {
    reply: String,
}

#[async_trait]
impl AgentSession for ScriptedSession {
    async fn request_turn(&self, _messages: &[Message]) -> Result<String, TransportError> {
        Ok(self.reply.clone())
    }
}

/// 永远联系不上的会话
struct UnreachableSession;

#[async_trait]
impl AgentSession for UnreachableSession {
    async fn request_turn(&self, _messages: &[Message]) -> Result<String, TransportError> {
        Err(TransportError::RateLimited)
    }
}

fn components(session: Arc<dyn AgentSession>) -> AgentComponents {
    AgentComponents {
        session,
        parser: RecoveryParser::new(),
        engine: RenderEngine::new(Arc::new(default_registry())),
        system_prompt: "test prompt".to_string(),
        max_context_turns: 10,
    }
}

/// 深度优先收集所有元素
fn collect_elements<'a>(nodes: &'a [RenderedNode], out: &mut Vec<&'a Element>) {
    for node in nodes {
        out.push(&node.element);
        collect_elements(&node.children, out);
    }
}

#[tokio::test]
async fn test_mock_session_full_turn() {
    let comps = components(Arc::new(MockSession));
    let mut log = ConversationLog::new();

    process_turn(&comps, &mut log, "显示站点概览").await.unwrap();

    let turns = log.turns();
    assert_eq!(turns.len(), 2);
    assert!(matches!(&turns[0], ConversationTurn::User(t) if t == "显示站点概览"));
    let ConversationTurn::AgentUi { payload, rendered } = &turns[1] else {
        panic!("Expected AgentUi turn");
    };
    assert_eq!(payload.version, "1.0");

    let mut elements = Vec::new();
    collect_elements(rendered, &mut elements);
    assert!(elements.iter().any(|e| matches!(
        e,
        Element::StatCard { title, value, .. } if title == "在线传感器" && value == "42"
    )));
    // Mock 回复没有未知类型，不应出现诊断叶子
    assert!(!elements.iter().any(|e| matches!(e, Element::Diagnostic(_))));
}

#[tokio::test]
async fn test_truncated_reply_recovered() {
    // 模拟被 token 上限截断的回复：字符串中断、对象与数组未闭合
    let reply = r#"{"version":"1.0","components":[{"id":"a","type":"stat-card","props":{"title":"T","value":"1"#;
    let comps = components(Arc::new(ScriptedSession {
        reply: reply.to_string(),
    }));
    let mut log = ConversationLog::new();

    process_turn(&comps, &mut log, "概览").await.unwrap();

    let ConversationTurn::AgentUi { rendered, .. } = &log.turns()[1] else {
        panic!("Expected AgentUi turn");
    };
    assert_eq!(
        rendered[0].element,
        Element::StatCard {
            title: "T".to_string(),
            value: "1".to_string(),
            icon: None,
            color_class: None,
        }
    );
}

#[tokio::test]
async fn test_unknown_type_degrades_not_fails() {
    let reply = r#"{"version":"1.0","components":[{"id":"c","type":"container","children":[
        {"id":"ok","type":"text","props":{"content":"正常"}},
        {"id":"odd","type":"holo-grid","children":[{"id":"hidden","type":"text"}]}
    ]}]}"#;
    let comps = components(Arc::new(ScriptedSession {
        reply: reply.to_string(),
    }));
    let mut log = ConversationLog::new();

    // 未知类型不是失败：整轮成功，兄弟节点照常渲染
    process_turn(&comps, &mut log, "概览").await.unwrap();

    let ConversationTurn::AgentUi { rendered, .. } = &log.turns()[1] else {
        panic!("Expected AgentUi turn");
    };
    let container = &rendered[0];
    assert_eq!(container.children.len(), 2);
    assert!(!container.children[0].is_diagnostic());
    assert!(container.children[1].is_diagnostic());
    assert!(container.children[1].children.is_empty());
}

#[tokio::test]
async fn test_transport_failure_leaves_visible_trace() {
    let comps = components(Arc::new(UnreachableSession));
    let mut log = ConversationLog::new();

    let err = process_turn(&comps, &mut log, "概览").await.unwrap_err();
    assert!(matches!(err, AgentError::Transport(_)));

    let turns = log.turns();
    assert_eq!(turns.len(), 2);
    assert!(matches!(&turns[1], ConversationTurn::Failure(msg) if msg.contains("无法连接")));
}

#[tokio::test]
async fn test_unusable_reply_distinct_from_transport() {
    let comps = components(Arc::new(ScriptedSession {
        reply: "not json at all".to_string(),
    }));
    let mut log = ConversationLog::new();

    let err = process_turn(&comps, &mut log, "概览").await.unwrap_err();
    match err {
        AgentError::Parse(e) => assert_eq!(e.raw_text(), "not json at all"),
        other => panic!("Expected parse error, got {:?}", other),
    }
    assert!(
        matches!(log.turns().last(), Some(ConversationTurn::Failure(msg)) if msg.contains("无法解析"))
    );
}

#[tokio::test]
async fn test_turns_appended_in_submission_order() {
    let comps = components(Arc::new(MockSession));
    let mut log = ConversationLog::new();

    process_turn(&comps, &mut log, "第一问").await.unwrap();
    process_turn(&comps, &mut log, "第二问").await.unwrap();

    let turns = log.turns();
    assert_eq!(turns.len(), 4);
    assert!(matches!(&turns[0], ConversationTurn::User(t) if t == "第一问"));
    assert!(matches!(&turns[1], ConversationTurn::AgentUi { .. }));
    assert!(matches!(&turns[2], ConversationTurn::User(t) if t == "第二问"));
    assert!(matches!(&turns[3], ConversationTurn::AgentUi { .. }));
}
