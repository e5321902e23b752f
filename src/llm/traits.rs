//! 智能体会话抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 AgentSession：提交一轮消息、
//! 拿回原始回复文本。核心对它的唯一约定：返回的字符串无论多破都交给恢复
//! 解析器处理；返回的错误是「联系不上智能体」，与解析失败分开呈现。

use async_trait::async_trait;
use thiserror::Error;

use crate::chat::Message;

/// 传输层错误：智能体不可达 / 配额受限，与解析错误互不混淆
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Agent request failed: {0}")]
    Api(String),

    #[error("Agent request timed out")]
    Timeout,

    #[error("Rate limited by generation API")]
    RateLimited,
}

/// 智能体会话 trait：一次请求 -> 原始回复文本
#[async_trait]
pub trait AgentSession: Send + Sync {
    async fn request_turn(&self, messages: &[Message]) -> Result<String, TransportError>;

    /// 累计 token 统计：(prompt_tokens, completion_tokens, total_tokens)
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
