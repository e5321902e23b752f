//! 渲染引擎
//!
//! 深度优先递归：逐节点查注册表并物化为 RenderedNode 树。未知类型降级为
//! 诊断叶子（保留标签、丢弃子树），超过最大深度时收口为诊断叶子，
//! 防止畸形 / 对抗性嵌套耗尽栈。渲染对 Payload 只读，不持有共享可变状态。

use std::sync::Arc;

use crate::a2ui::{ComponentNode, ComponentRegistry, Payload};

/// 默认最大递归深度；可经配置覆盖
pub const DEFAULT_MAX_RENDER_DEPTH: usize = 64;

/// 文本组件的样式档位
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Body,
    Caption,
}

/// 物化后的具体 UI 元素
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Text {
        content: String,
        style: TextStyle,
    },
    Button {
        label: String,
        color: Option<String>,
    },
    StatCard {
        title: String,
        value: String,
        icon: Option<String>,
        color_class: Option<String>,
    },
    /// 布局容器：只负责承载子节点，grid 表示网格排布
    Container {
        grid: bool,
    },
    /// 诊断叶子：无法正常渲染时的可见占位
    Diagnostic(Diagnostic),
}

/// 诊断叶子的成因
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// 注册表中没有该类型标签（标签作为哨兵保留，供界面展示）
    UnknownType(String),
    /// 嵌套超过最大深度，在该层收口
    DepthExceeded(usize),
}

/// 渲染产物：以节点 id 为 key 的输出树
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedNode {
    pub key: String,
    pub element: Element,
    pub children: Vec<RenderedNode>,
}

impl RenderedNode {
    /// 是否为诊断叶子
    pub fn is_diagnostic(&self) -> bool {
        matches!(self.element, Element::Diagnostic(_))
    }
}

/// 渲染引擎：持有只读注册表与深度上限
///
/// render 对任何语法合法的 Payload 都有定义：不会 panic、必然终止，
/// 未知类型与超深嵌套都以诊断叶子的形式留在输出里。
pub struct RenderEngine {
    registry: Arc<ComponentRegistry>,
    max_depth: usize,
}

impl RenderEngine {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_RENDER_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// 渲染整份 Payload 的根森林，保持原顺序
    pub fn render_payload(&self, payload: &Payload) -> Vec<RenderedNode> {
        payload
            .components
            .iter()
            .map(|node| self.render_at(node, 0))
            .collect()
    }

    /// 渲染单个节点
    pub fn render(&self, node: &ComponentNode) -> RenderedNode {
        self.render_at(node, 0)
    }

    fn render_at(&self, node: &ComponentNode, depth: usize) -> RenderedNode {
        if depth >= self.max_depth {
            return RenderedNode {
                key: node.id.clone(),
                element: Element::Diagnostic(Diagnostic::DepthExceeded(self.max_depth)),
                children: Vec::new(),
            };
        }

        let Some(capability) = self.registry.resolve(&node.type_tag) else {
            // 未知容器的子节点在父上下文中无法解释，整棵丢弃而非孤儿渲染
            tracing::warn!(type_tag = %node.type_tag, id = %node.id, "Unknown component type, rendering diagnostic leaf");
            return RenderedNode {
                key: node.id.clone(),
                element: Element::Diagnostic(Diagnostic::UnknownType(node.type_tag.clone())),
                children: Vec::new(),
            };
        };

        let element = capability.materialize(&node.props);
        let children = node
            .children
            .iter()
            .map(|child| self.render_at(child, depth + 1))
            .collect();

        RenderedNode {
            key: node.id.clone(),
            element,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2ui::builtin::default_registry;
    use crate::a2ui::RecoveryParser;

    fn engine() -> RenderEngine {
        RenderEngine::new(Arc::new(default_registry()))
    }

    fn node(id: &str, type_tag: &str, children: Vec<ComponentNode>) -> ComponentNode {
        ComponentNode {
            id: id.to_string(),
            type_tag: type_tag.to_string(),
            props: serde_json::Map::new(),
            children,
        }
    }

    #[test]
    fn test_render_text_leaf() {
        let raw = r#"{"version":"1.0","components":[{"id":"a","type":"text","props":{"content":"Hi"}}]}"#;
        let payload = RecoveryParser::new().parse(raw).unwrap();
        let rendered = engine().render_payload(&payload);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].key, "a");
        assert_eq!(
            rendered[0].element,
            Element::Text {
                content: "Hi".to_string(),
                style: TextStyle::Body
            }
        );
    }

    #[test]
    fn test_unknown_type_becomes_diagnostic_and_drops_children() {
        let tree = node(
            "root",
            "container",
            vec![
                node("ok", "text", vec![]),
                node("mystery", "holo-grid", vec![node("orphan", "text", vec![])]),
            ],
        );
        let rendered = engine().render(&tree);

        assert_eq!(rendered.children.len(), 2);
        assert!(!rendered.children[0].is_diagnostic());
        let diag = &rendered.children[1];
        assert_eq!(
            diag.element,
            Element::Diagnostic(Diagnostic::UnknownType("holo-grid".to_string()))
        );
        // 未知节点自己的子树不得出现在输出中
        assert!(diag.children.is_empty());
    }

    #[test]
    fn test_unknown_at_any_depth_total() {
        // 渲染全定义：含未知类型的树也能整体渲染，形状保持（未知子树除外）
        let tree = node(
            "root",
            "grid-container",
            vec![node(
                "inner",
                "container",
                vec![node("x", "warp-core", vec![]), node("y", "button", vec![])],
            )],
        );
        let rendered = engine().render(&tree);
        assert_eq!(rendered.children[0].children.len(), 2);
        assert!(rendered.children[0].children[0].is_diagnostic());
        assert!(!rendered.children[0].children[1].is_diagnostic());
    }

    #[test]
    fn test_depth_bound_fails_closed() {
        // 构造超过上限的嵌套容器，应在上限处收口为诊断叶子而非栈溢出
        let mut tree = node("leaf", "text", vec![]);
        for i in 0..200 {
            tree = node(&format!("c{}", i), "container", vec![tree]);
        }
        let rendered = engine().render(&tree);

        let mut depth = 0usize;
        let mut cursor = &rendered;
        while let Some(child) = cursor.children.first() {
            cursor = child;
            depth += 1;
        }
        assert_eq!(
            cursor.element,
            Element::Diagnostic(Diagnostic::DepthExceeded(DEFAULT_MAX_RENDER_DEPTH))
        );
        assert!(depth < 200);
    }

    #[test]
    fn test_render_does_not_mutate_payload() {
        let raw = r#"{"version":"1.0","components":[{"id":"a","type":"container","children":[{"id":"b","type":"text","props":{"content":"x"}}]}]}"#;
        let payload = RecoveryParser::new().parse(raw).unwrap();
        let before = payload.clone();
        let _ = engine().render_payload(&payload);
        assert_eq!(payload, before);
    }
}
