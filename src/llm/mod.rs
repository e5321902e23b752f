//! LLM 层：会话抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod mock;
pub mod openai;
pub mod traits;

pub use deepseek::{create_deepseek_session, DEEPSEEK_CHAT, DEEPSEEK_REASONER};
pub use mock::MockSession;
pub use openai::{OpenAiSession, TokenUsage};
pub use traits::{AgentSession, TransportError};
