//! 内置组件集
//!
//! 管理台默认认识的类型标签：text / button / stat-card / container / grid-container。
//! default_registry 在启动时构建一次，随后以 Arc 只读共享。

use serde_json::{Map, Value};

use crate::a2ui::engine::{Element, TextStyle};
use crate::a2ui::ComponentRegistry;

/// 取字符串属性；数字 / 布尔值容忍为其文本形式（模型偶尔不加引号）
fn str_prop(props: &Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_capability(props: &Map<String, Value>) -> Element {
    let style = match str_prop(props, "style").as_deref() {
        Some("title") => TextStyle::Title,
        Some("caption") => TextStyle::Caption,
        _ => TextStyle::Body,
    };
    Element::Text {
        content: str_prop(props, "content").unwrap_or_default(),
        style,
    }
}

fn button_capability(props: &Map<String, Value>) -> Element {
    Element::Button {
        label: str_prop(props, "label").unwrap_or_default(),
        color: str_prop(props, "color"),
    }
}

fn stat_card_capability(props: &Map<String, Value>) -> Element {
    Element::StatCard {
        title: str_prop(props, "title").unwrap_or_default(),
        value: str_prop(props, "value").unwrap_or_default(),
        icon: str_prop(props, "icon"),
        color_class: str_prop(props, "colorClass"),
    }
}

/// 构建默认注册表（仅在初始化阶段调用；之后只读）
pub fn default_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register("text", text_capability);
    registry.register("button", button_capability);
    registry.register("stat-card", stat_card_capability);
    // 布局容器忽略 props，只按顺序承载子节点
    registry.register("container", |_props: &Map<String, Value>| Element::Container {
        grid: false,
    });
    registry.register("grid-container", |_props: &Map<String, Value>| {
        Element::Container { grid: true }
    });
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_default_registry_knows_documented_tags() {
        let registry = default_registry();
        for tag in ["text", "button", "stat-card", "container", "grid-container"] {
            assert!(registry.resolve(tag).is_some(), "missing tag {}", tag);
        }
    }

    #[test]
    fn test_text_style_fallback_to_body() {
        let element = text_capability(&props(&[
            ("content", json!("hello")),
            ("style", json!("neon")),
        ]));
        assert_eq!(
            element,
            Element::Text {
                content: "hello".to_string(),
                style: TextStyle::Body
            }
        );
    }

    #[test]
    fn test_stat_card_numeric_value_tolerated() {
        let element = stat_card_capability(&props(&[
            ("title", json!("在线传感器")),
            ("value", json!(42)),
        ]));
        match element {
            Element::StatCard { value, .. } => assert_eq!(value, "42"),
            other => panic!("Expected stat card, got {:?}", other),
        }
    }
}
