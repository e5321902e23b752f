//! 对话日志
//!
//! ConversationTurn 是按提交顺序追加的标签联合（用户文本 / 智能体文本 /
//! 智能体 Payload / 失败提示），只追加、不原地修改；to_llm_messages 把最近
//! N 轮回放为 LLM 消息（已接受的 Payload 重新序列化为 assistant 内容）。

use serde::{Deserialize, Serialize};

use crate::a2ui::{Payload, RenderedNode};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 发往 LLM 的单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 对话中的一轮记录
#[derive(Clone, Debug)]
pub enum ConversationTurn {
    /// 用户输入的原文
    User(String),
    /// 智能体的纯文本（本地提示等）
    AgentText(String),
    /// 智能体的一轮 A2UI 输出：原始 Payload + 渲染产物，创建后不再改动
    AgentUi {
        payload: Payload,
        rendered: Vec<RenderedNode>,
    },
    /// 本轮失败的可见痕迹（传输失败 / 回复不可用），绝不静默吞掉
    Failure(String),
}

/// 追加式对话日志，最旧在前
#[derive(Default)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// 清空对话（Ctrl+L），仅此一个非追加操作
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// 回放最近 max_turns 轮为 LLM 消息：用户原文 + 已接受 Payload 的 JSON。
    /// 失败轮与本地提示不回放，避免污染模型上下文。
    pub fn to_llm_messages(&self, max_turns: usize) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .turns
            .iter()
            .filter_map(|turn| match turn {
                ConversationTurn::User(text) => Some(Message::user(text.clone())),
                ConversationTurn::AgentUi { payload, .. } => serde_json::to_string(payload)
                    .ok()
                    .map(Message::assistant),
                ConversationTurn::AgentText(_) | ConversationTurn::Failure(_) => None,
            })
            .collect();
        let keep = max_turns * 2;
        if messages.len() > keep {
            messages.drain(..messages.len() - keep);
        }
        messages
    }
}
