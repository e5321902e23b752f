//! A2UI 协议层：线上格式（protocol）、恢复解析（parser）、注册表（registry）、
//! 内置组件（builtin）、渲染引擎（engine）

pub mod builtin;
pub mod engine;
pub mod parser;
pub mod protocol;
pub mod registry;

pub use builtin::default_registry;
pub use engine::{
    Diagnostic, Element, RenderEngine, RenderedNode, TextStyle, DEFAULT_MAX_RENDER_DEPTH,
};
pub use parser::{ParseError, RecoveryParser};
pub use protocol::{ComponentNode, Payload};
pub use registry::{Capability, ComponentRegistry};
