//! 状态定义：UiState 投影
//!
//! UI 只持有轻量的投影状态（阶段、对话轮、输入锁、错误、token 统计），由编排器在每个
//! 节点变化时整体发送，UI 侧无须理解任何内部细节。

use crate::chat::ConversationTurn;

/// UI 看到的「投影」状态
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub phase: AgentPhase,
    pub turns: Vec<ConversationTurn>,
    pub input_locked: bool,
    pub error_message: Option<String>,
    /// 会话累计消耗的 token 总数，标题栏展示
    pub tokens_total: u64,
}

/// 一轮交互的阶段（UI 投影用）
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum AgentPhase {
    #[default]
    Idle,
    /// 等待生成 API 返回
    Thinking,
    Error,
}
