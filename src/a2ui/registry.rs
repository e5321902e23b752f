//! 组件注册表
//!
//! 类型标签 -> 渲染能力的开放映射：新增组件类型只需注册，不必改动渲染引擎。
//! 进程启动时一次性填充，此后只读共享（Arc），因此无需加锁。

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::a2ui::engine::Element;

/// 渲染能力：把节点的 props 物化为一个具体 UI 元素
///
/// 只消费 props，不触碰 children——子节点由引擎递归渲染后挂接。
pub trait Capability: Send + Sync {
    fn materialize(&self, props: &Map<String, Value>) -> Element;
}

/// 闭包即能力：简单组件可以直接注册函数
impl<F> Capability for F
where
    F: Fn(&Map<String, Value>) -> Element + Send + Sync,
{
    fn materialize(&self, props: &Map<String, Value>) -> Element {
        self(props)
    }
}

/// 注册表：按类型标签存储 Arc<dyn Capability>
///
/// resolve 是纯查找：未知标签返回 None、永不报错，「缺席」的含义由引擎决定。
/// 同一标签只有一个能力，重复注册即覆盖，无优先级语义。
#[derive(Default)]
pub struct ComponentRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_tag: impl Into<String>, capability: impl Capability + 'static) {
        self.capabilities.insert(type_tag.into(), Arc::new(capability));
    }

    pub fn resolve(&self, type_tag: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(type_tag).cloned()
    }

    /// 已注册的类型标签列表（用于日志与提示词）
    pub fn type_tags(&self) -> Vec<String> {
        self.capabilities.keys().cloned().collect()
    }
}
