use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use tdoc::InlineStyle;

use crate::navigator::{
    Container, ContainerId, ContainerKind, ContentRoot, DocumentLayout, LayoutRow, LineMap,
    Measure, Position, display_width,
};
use crate::theme::Theme;

const TAB: &str = "    ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
}

/// Lay out `root` for the given measure and turn every row into a styled
/// line. Produces exactly as many lines as the gutter numbers.
pub fn render_content(
    root: &ContentRoot,
    measure: Measure,
    cursor: Option<Position>,
    active: Option<ContainerId>,
    theme: &Theme,
) -> RenderResult {
    let layout = DocumentLayout::compute(root, measure);
    let mut renderer = Renderer {
        root,
        theme,
        cursor,
        active,
        lines: Vec::with_capacity(layout.len()),
        cursor_visual: None,
    };

    for entry in layout.rows() {
        match *entry {
            LayoutRow::Separator => renderer.lines.push(Line::default()),
            LayoutRow::Content { container, row } => {
                let map = layout.line_map(container);
                let block = root.container(container);
                match (map, block) {
                    (Some(map), Some(block)) => renderer.push_row(block, map, row),
                    _ => renderer.lines.push(Line::default()),
                }
            }
        }
    }
    renderer.finish()
}

struct Renderer<'a> {
    root: &'a ContentRoot,
    theme: &'a Theme,
    cursor: Option<Position>,
    active: Option<ContainerId>,
    lines: Vec<Line<'static>>,
    cursor_visual: Option<CursorVisualPosition>,
}

impl Renderer<'_> {
    fn push_row(&mut self, container: &Container, map: &LineMap, row: usize) {
        let mut spans = Vec::new();
        let prefix = if row == 0 {
            container.first_prefix()
        } else {
            container.continuation_prefix()
        };
        if !prefix.is_empty() {
            spans.push(Span::styled(prefix.to_string(), self.theme.prefix_style()));
        }

        let base = match container.kind() {
            ContainerKind::Heading(level) => self.theme.heading_style(level),
            ContainerKind::Code => self.theme.code_style(),
            ContainerKind::Text | ContainerKind::ListItem | ContainerKind::Quote => {
                Style::default()
            }
        };

        let Some(visual_row) = map.rows().get(row) else {
            self.lines.push(Line::from(spans));
            return;
        };
        for piece in &visual_row.pieces {
            let inline = self
                .root
                .segment(piece.segment)
                .map(|segment| segment.style())
                .unwrap_or(InlineStyle::None);
            let style = merge_style(base, inline, self.theme);
            let chars = map.piece_chars(piece);

            let cursor_idx = self
                .cursor
                .filter(|cursor| piece.contains(*cursor))
                .map(|cursor| cursor.offset - piece.start);
            let Some(cursor_idx) = cursor_idx else {
                push_text(&mut spans, expand(chars), style);
                continue;
            };

            push_text(&mut spans, expand(&chars[..cursor_idx]), style);
            let marker = chars[cursor_idx];
            let (cell, rest) = match marker {
                '\n' | '\r' => (" ".to_string(), String::new()),
                '\t' => (" ".to_string(), TAB[1..].to_string()),
                ch => (ch.to_string(), String::new()),
            };
            spans.push(Span::styled(cell, self.theme.cursor_style()));
            push_text(&mut spans, rest + &expand(&chars[cursor_idx + 1..]), style);

            let visual = self.cursor.and_then(|position| map.visual_column(position));
            if let Some((_, column)) = visual {
                let column = display_width(prefix) + column;
                self.cursor_visual = Some(CursorVisualPosition {
                    line: self.lines.len(),
                    column: u16::try_from(column).unwrap_or(u16::MAX),
                });
            }
        }

        let mut line = Line::from(spans);
        if self.active == Some(container.id()) {
            line = line.style(self.theme.active_line_style());
        }
        self.lines.push(line);
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        RenderResult {
            total_lines: self.lines.len(),
            lines: self.lines,
            cursor: self.cursor_visual,
        }
    }
}

fn expand(chars: &[char]) -> String {
    let mut text = String::with_capacity(chars.len());
    for ch in chars {
        match ch {
            '\t' => text.push_str(TAB),
            '\n' | '\r' => {}
            ch => text.push(*ch),
        }
    }
    text
}

fn push_text(spans: &mut Vec<Span<'static>>, text: String, style: Style) {
    if !text.is_empty() {
        spans.push(Span::styled(text, style));
    }
}

fn merge_style(base: Style, inline: InlineStyle, theme: &Theme) -> Style {
    match inline {
        InlineStyle::None => base,
        InlineStyle::Bold => base.add_modifier(Modifier::BOLD),
        InlineStyle::Italic => base.add_modifier(Modifier::ITALIC),
        InlineStyle::Highlight => base.add_modifier(Modifier::REVERSED),
        InlineStyle::Underline => base.add_modifier(Modifier::UNDERLINED),
        InlineStyle::Strike => base.add_modifier(Modifier::CROSSED_OUT),
        InlineStyle::Link => base.patch(theme.link_style()),
        InlineStyle::Code => base.patch(theme.code_style()),
    }
}
