//! Mock 会话（用于测试与无 API Key 的离线演示）
//!
//! 返回一份固定的环境监测仪表盘 Payload（带代码围栏，顺带走一遍提取逻辑），
//! caption 回显用户最后一条输入，便于本地跑通整条解析 / 渲染链路。

use async_trait::async_trait;

use crate::chat::{Message, Role};
use crate::llm::{AgentSession, TransportError};

/// Mock 会话：回显用户输入的固定仪表盘
#[derive(Debug, Default)]
pub struct MockSession;

#[async_trait]
impl AgentSession for MockSession {
    async fn request_turn(&self, messages: &[Message]) -> Result<String, TransportError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!(
            r#"这是当前站点概览：
```json
{{
  "version": "1.0",
  "components": [
    {{"id": "overview", "type": "grid-container", "children": [
      {{"id": "head", "type": "text", "props": {{"content": "站点概览", "style": "title"}}}},
      {{"id": "online", "type": "stat-card", "props": {{"title": "在线传感器", "value": "42", "icon": "sensor", "colorClass": "green"}}}},
      {{"id": "alerts", "type": "stat-card", "props": {{"title": "未处理告警", "value": "3", "colorClass": "red"}}}},
      {{"id": "ack", "type": "button", "props": {{"label": "全部确认", "color": "blue"}}}},
      {{"id": "echo", "type": "text", "props": {{"content": "Mock 回显: {}", "style": "caption"}}}}
    ]}}
  ]
}}
```"#,
            last_user.replace('"', "'")
        ))
    }
}
