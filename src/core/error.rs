//! 错误类型
//!
//! 一轮智能体交互的三种终局失败：传输失败（联系不上生成 API）、解析失败
//! （Malformed / Schema，见 a2ui::ParseError）、取消；另有启动期的配置加载
//! 失败。未知组件类型不是错误，由渲染引擎就地降级为诊断叶子，永远不会传播
//! 到这里。

use thiserror::Error;

use crate::a2ui::ParseError;
use crate::llm::TransportError;

/// 一轮交互可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Cancelled")]
    Cancelled,

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// 面向用户的失败文案：区分「联系不上智能体」与「智能体回复了但不可用」
    pub fn user_facing(&self) -> String {
        match self {
            AgentError::Transport(e) => format!("无法连接智能体: {}", e),
            AgentError::Parse(ParseError::Malformed { .. }) => {
                "智能体已回复，但内容无法解析为界面描述".to_string()
            }
            AgentError::Parse(ParseError::Schema { detail, .. }) => {
                format!("智能体回复缺少界面结构: {}", detail)
            }
            AgentError::Cancelled => "已取消本轮生成".to_string(),
            AgentError::ConfigError(msg) => format!("配置错误: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_parse_messages_distinct() {
        let transport = AgentError::from(TransportError::Timeout);
        let parse = AgentError::from(ParseError::Malformed {
            raw: "garbage".to_string(),
        });
        assert!(transport.user_facing().contains("无法连接"));
        assert!(parse.user_facing().contains("无法解析"));
        assert_ne!(transport.user_facing(), parse.user_facing());
    }
}
