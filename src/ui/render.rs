//! 界面渲染
//!
//! 根据 UiState（phase、turns、error）与 input_buffer 绘制：标题栏显示阶段，
//! 主体为对话区（用户/智能体着色、A2UI 树缩进展示、按宽度换行），底部为输入框。
//! 诊断叶子以红色醒目标注，不打断兄弟节点的展示。

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::a2ui::{Diagnostic, Element, RenderedNode, TextStyle};
use crate::chat::ConversationTurn;
use crate::core::{AgentPhase, UiState};

/// 单条文本在 UI 中显示的最大字符数
const MAX_DISPLAY_CHARS: usize = 600;
/// A2UI 树每层缩进宽度
const INDENT_WIDTH: usize = 2;

/// 对过长内容做折叠：保留前 N 字 + 省略提示
fn truncate_for_display(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= MAX_DISPLAY_CHARS {
        return content.to_string();
    }
    let head: String = chars.iter().take(MAX_DISPLAY_CHARS).collect();
    format!("{}\n... [内容已省略，共 {} 字]", head, chars.len())
}

/// 将内容按宽度换行，支持 UTF-8（按字符数，避免在 UTF-8 中间截断）
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    for para in s.split('\n') {
        let mut line = String::new();
        for ch in para.chars() {
            if line.chars().count() >= width {
                lines.push(std::mem::take(&mut line));
            }
            line.push(ch);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// 颜色名 -> 终端色；未知颜色退回白色
fn color_from(name: Option<&str>) -> Color {
    match name {
        Some("red") => Color::Red,
        Some("green") => Color::Green,
        Some("blue") => Color::Blue,
        Some("amber") | Some("yellow") => Color::Yellow,
        Some("gray") | Some("grey") => Color::Gray,
        _ => Color::White,
    }
}

/// 把渲染树展开为缩进文本行；容器自身不占行，只提升子节点缩进
pub fn a2ui_lines(nodes: &[RenderedNode], indent: usize, out: &mut Vec<Line<'static>>) {
    for node in nodes {
        let pad = " ".repeat(indent * INDENT_WIDTH);
        match &node.element {
            Element::Text { content, style } => {
                let styled = match style {
                    TextStyle::Title => Span::styled(
                        content.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    TextStyle::Body => Span::raw(content.clone()),
                    TextStyle::Caption => {
                        Span::styled(content.clone(), Style::default().fg(Color::DarkGray))
                    }
                };
                out.push(Line::from(vec![Span::raw(pad), styled]));
                a2ui_lines(&node.children, indent + 1, out);
            }
            Element::Button { label, color } => {
                out.push(Line::from(vec![
                    Span::raw(pad),
                    Span::styled(
                        format!("[ {} ]", label),
                        Style::default()
                            .fg(color_from(color.as_deref()))
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
                a2ui_lines(&node.children, indent + 1, out);
            }
            Element::StatCard {
                title,
                value,
                icon,
                color_class,
            } => {
                let icon_part = icon
                    .as_deref()
                    .map(|i| format!(" ({})", i))
                    .unwrap_or_default();
                out.push(Line::from(vec![
                    Span::raw(pad),
                    Span::styled(
                        format!("▪ {}: {}{}", title, value, icon_part),
                        Style::default().fg(color_from(color_class.as_deref())),
                    ),
                ]));
                a2ui_lines(&node.children, indent + 1, out);
            }
            Element::Container { .. } => {
                a2ui_lines(&node.children, indent + 1, out);
            }
            Element::Diagnostic(diag) => {
                let text = match diag {
                    Diagnostic::UnknownType(tag) => format!("⚠ 未知组件类型: {}", tag),
                    Diagnostic::DepthExceeded(limit) => {
                        format!("⚠ 嵌套超过 {} 层，已截断", limit)
                    }
                };
                out.push(Line::from(vec![
                    Span::raw(pad),
                    Span::styled(
                        text,
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                ]));
                // 诊断叶子没有子节点
            }
        }
    }
}

/// 单轮记录 -> 带角色前缀的文本行
fn turn_lines(turn: &ConversationTurn, width: usize, out: &mut Vec<Line<'static>>) {
    let push_prefixed = |out: &mut Vec<Line<'static>>, prefix: &'static str, color: Color, body: Vec<Line<'static>>| {
        for (i, line) in body.into_iter().enumerate() {
            let pref = if i == 0 { prefix } else { "    " };
            let mut spans = vec![Span::styled(
                pref,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )];
            spans.extend(line.spans);
            out.push(Line::from(spans));
        }
    };

    match turn {
        ConversationTurn::User(text) => {
            let body = wrap_text(&truncate_for_display(text), width)
                .into_iter()
                .map(|l| Line::from(Span::raw(l)))
                .collect();
            push_prefixed(out, "You ", Color::Cyan, body);
        }
        ConversationTurn::AgentText(text) => {
            let body = wrap_text(&truncate_for_display(text), width)
                .into_iter()
                .map(|l| Line::from(Span::raw(l)))
                .collect();
            push_prefixed(out, "Eco ", Color::Green, body);
        }
        ConversationTurn::AgentUi { rendered, .. } => {
            let mut body = Vec::new();
            a2ui_lines(rendered, 0, &mut body);
            if body.is_empty() {
                body.push(Line::from(Span::styled(
                    "(空界面)",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            push_prefixed(out, "Eco ", Color::Green, body);
        }
        ConversationTurn::Failure(msg) => {
            let body = wrap_text(msg, width)
                .into_iter()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Red))))
                .collect();
            push_prefixed(out, "Sys ", Color::Red, body);
        }
    }
}

/// 绘制一帧：上方对话区（标题 + 轮次 + 滚动条），下方输入区；
/// 将 (总行数, 可视高度) 写入 out 供外部 clamp 滚动
pub fn draw(
    f: &mut Frame,
    state: &UiState,
    input_buffer: &str,
    conversation_scroll: usize,
    out: &mut (usize, usize),
) {
    let input_height = 5u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(input_height)])
        .split(f.area());

    let conv_area = chunks[0];
    let content_width = conv_area.width.saturating_sub(2).saturating_sub(1) as usize;

    let phase_str = match &state.phase {
        AgentPhase::Idle => "空闲",
        AgentPhase::Thinking => "生成中…",
        AgentPhase::Error => "错误",
    };

    let title = if state.tokens_total > 0 {
        format!(" EcoView │ {} │ tokens {} ", phase_str, state.tokens_total)
    } else {
        format!(" EcoView │ {} ", phase_str)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let mut text_lines: Vec<Line> = Vec::new();
    for (idx, turn) in state.turns.iter().enumerate() {
        if idx > 0 {
            text_lines.push(Line::from(Span::raw("")));
        }
        turn_lines(turn, content_width.max(40), &mut text_lines);
    }

    let content_height = conv_area.height.saturating_sub(2) as usize;
    let total_lines = text_lines.len();
    let max_scroll = total_lines.saturating_sub(content_height);
    let scroll_offset = conversation_scroll.min(max_scroll);

    let inner = block.inner(conv_area);
    let paragraph = Paragraph::new(Text::from(text_lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset as u16, 0));
    f.render_widget(paragraph, inner);

    if total_lines > content_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .position(scroll_offset)
            .viewport_content_length(content_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_symbol("█")
            .track_symbol(Some("░"));
        f.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
    }

    let input_prompt = if let Some(err) = &state.error_message {
        format!(" 错误: {} ", err.chars().take(36).collect::<String>())
    } else if state.input_locked {
        " 等待回复… ".to_string()
    } else {
        " 输入 ".to_string()
    };

    let border_color = if state.error_message.is_some() {
        Color::Red
    } else {
        Color::Blue
    };

    let hint = " Enter 发送 │ ↑↓ PgUp/PgDn 滚动 │ Ctrl+C 取消 │ Ctrl+Q 退出 ";
    let input_block = Block::default()
        .title(input_prompt)
        .title_bottom(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let input = Paragraph::new(input_buffer)
        .block(input_block)
        .wrap(Wrap { trim: false })
        .style(if state.input_locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        });

    f.render_widget(input, chunks[1]);

    out.0 = total_lines;
    out.1 = content_height;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2ui::{default_registry, RecoveryParser, RenderEngine};
    use std::sync::Arc;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_a2ui_lines_indent_and_diagnostic() {
        let raw = r#"{"version":"1.0","components":[
            {"id":"g","type":"grid-container","children":[
                {"id":"t","type":"text","props":{"content":"站点概览","style":"title"}},
                {"id":"u","type":"holo-grid","children":[{"id":"x","type":"text"}]}
            ]}
        ]}"#;
        let payload = RecoveryParser::new().parse(raw).unwrap();
        let engine = RenderEngine::new(Arc::new(default_registry()));
        let rendered = engine.render_payload(&payload);

        let mut lines = Vec::new();
        a2ui_lines(&rendered, 0, &mut lines);

        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("站点概览"));
        assert!(texts[1].contains("未知组件类型: holo-grid"));
        // 未知节点的子树没有产生任何行
        assert!(!texts.iter().any(|t| t.contains("x")));
    }

    #[test]
    fn test_wrap_text_utf8() {
        let lines = wrap_text("一二三四五六", 3);
        assert_eq!(lines, vec!["一二三", "四五六"]);
    }
}
