//! EcoView - IoT 环境监测管理台的 Agentic UI 面板
//!
//! 模块划分：
//! - **a2ui**: A2UI 协议核心（线上格式、恢复解析、注册表、渲染引擎）
//! - **agent**: 无界面运行时（组件组装、单轮交互）
//! - **chat**: 对话日志（追加式轮次记录与 LLM 消息回放）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 编排、状态投影、错误类型
//! - **llm**: 智能体会话抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: tracing 初始化
//! - **ui**: Ratatui TUI 界面

pub mod a2ui;
pub mod agent;
pub mod chat;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod ui;
