//! 防御式恢复解析器
//!
//! 生成端是远程语言模型，输出可能被 token 上限截断、混入说明文字或代码围栏。
//! parse 流程：提取候选 JSON -> 严格解析 -> 失败则做「补闭合」修复后重试。
//! 修复只追加收尾符号（引号 / 括号），不猜测缺失的字段值：恢复的是结构而非语义。

use serde_json::Value;
use thiserror::Error;

use crate::a2ui::Payload;

/// 解析失败：两种终局错误都保留原始文本，绝不静默丢弃
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// 修复后仍不是合法 JSON
    #[error("Malformed agent response (unrecoverable JSON)")]
    Malformed { raw: String },

    /// JSON 合法但缺少 components 字段或结构不符
    #[error("Schema error in agent response: {detail}")]
    Schema { detail: String, raw: String },
}

impl ParseError {
    /// 原始回复文本（供诊断展示）
    pub fn raw_text(&self) -> &str {
        match self {
            ParseError::Malformed { raw } | ParseError::Schema { raw, .. } => raw,
        }
    }
}

/// 恢复解析器：原始回复文本 -> Payload
///
/// 无内部状态，可在任意并发场景下复用；重试策略属于调用方，这里一次也不重试。
#[derive(Debug, Default)]
pub struct RecoveryParser;

impl RecoveryParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析一轮智能体回复
    ///
    /// 1. 提取候选：定位首个 `{` 及其结构上配对的最外层对象；找不到 `{` 时剥掉代码围栏
    /// 2. 严格解析候选；成功但缺 components 则 Schema 错误
    /// 3. 失败则补闭合后重试；两次都失败返回 Malformed（携带原文）
    pub fn parse(&self, raw: &str) -> Result<Payload, ParseError> {
        let candidate = extract_candidate(raw);

        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            return payload_from_value(value, raw);
        }

        let repaired = repair_truncated(&candidate);
        match serde_json::from_str::<Value>(&repaired) {
            Ok(value) => payload_from_value(value, raw),
            Err(_) => Err(ParseError::Malformed {
                raw: raw.to_string(),
            }),
        }
    }
}

/// 合法 JSON 值 -> Payload；缺 components 或形状不符都归为 Schema 错误
fn payload_from_value(value: Value, raw: &str) -> Result<Payload, ParseError> {
    if value.get("components").is_none() {
        return Err(ParseError::Schema {
            detail: "missing `components` field".to_string(),
            raw: raw.to_string(),
        });
    }
    serde_json::from_value::<Payload>(value).map_err(|e| ParseError::Schema {
        detail: e.to_string(),
        raw: raw.to_string(),
    })
}

/// 从原始文本中提取候选 JSON
///
/// 首选首个 `{` 到结构配对的 `}` 的切片；对象未闭合（被截断）时取到文本末尾，
/// 留给修复阶段处理。整段没有 `{` 时剥掉 ``` 围栏行后原样返回。
fn extract_candidate(raw: &str) -> String {
    if let Some(start) = raw.find('{') {
        let rest = &raw[start..];
        return match matching_object_end(rest) {
            Some(end) => rest[..=end].to_string(),
            None => rest.to_string(),
        };
    }
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// 找到 text 开头 `{` 在结构上配对的 `}` 的字节下标；未闭合返回 None
fn matching_object_end(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// 补闭合修复：小型显式状态机（字符串内标志 + 转义标志 + 开括号栈）
///
/// 扫描结束后：仍在字符串内则补 `"`，再按后开先闭的顺序补齐 `]` / `}`。
/// 对已平衡的输入原样返回（幂等），且输出永远是原文 + 收尾后缀。
pub fn repair_truncated(text: &str) -> String {
    let mut in_string = false;
    let mut escaped = false;
    let mut stack: Vec<char> = Vec::new();

    for ch in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                // 多余 / 错配的闭括号不做处理，留给重解析报错
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut repaired = text.to_string();
    if in_string {
        if escaped {
            // 截断发生在转义符之后：先补一个反斜杠凑成合法转义，再闭合引号
            repaired.push('\\');
        }
        repaired.push('"');
    }
    while let Some(closer) = stack.pop() {
        repaired.push(closer);
    }
    repaired
}
