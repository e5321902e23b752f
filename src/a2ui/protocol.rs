//! A2UI 线上格式
//!
//! 智能体每轮输出一份 Payload：版本号 + ComponentNode 森林。节点树有限、无环
//! （从文本反序列化从零构建，不存在共享可变引用），解析成功后即不可变。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 一个可递归嵌套的 UI 意图单元
///
/// - `id`: 在单份 Payload 内唯一，作为渲染 key，不跨轮次复用
/// - `type`: 开放集合的类型标签，消费端可能遇到不认识的标签
/// - `props`: 按类型约定的任意 JSON 属性，核心不解释其语义
/// - `children`: 有序子节点，顺序即渲染顺序
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<ComponentNode>,
}

/// 一轮完整的 A2UI 消息：协议版本 + 根节点森林
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// 协议版本标签，仅作记录，不做强校验
    #[serde(default)]
    pub version: String,
    pub components: Vec<ComponentNode>,
}

impl Payload {
    /// 节点总数（含嵌套），用于日志与测试
    pub fn node_count(&self) -> usize {
        fn count(node: &ComponentNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.components.iter().map(count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults() {
        let node: ComponentNode =
            serde_json::from_str(r#"{"id": "a", "type": "text"}"#).unwrap();
        assert_eq!(node.id, "a");
        assert_eq!(node.type_tag, "text");
        assert!(node.props.is_empty());
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_node_count_nested() {
        let payload: Payload = serde_json::from_str(
            r#"{"version": "1.0", "components": [
                {"id": "root", "type": "container", "children": [
                    {"id": "t1", "type": "text"},
                    {"id": "t2", "type": "text"}
                ]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(payload.node_count(), 3);
    }
}
