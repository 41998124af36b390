use std::ops::Range;

use unicode_width::UnicodeWidthChar;

use super::{Container, ContainerId, ContainerKind, ContentRoot, Position, SegmentId};

const TAB_WIDTH: usize = 4;
const UNBOUNDED_WIDTH: usize = usize::MAX / 4;

/// Layout metrics taken from the last draw: how wide one glyph is and how
/// wide the content area is, both in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measure {
    pub glyph_width: u16,
    pub container_width: u16,
}

impl Measure {
    pub const fn new(glyph_width: u16, container_width: u16) -> Self {
        Self {
            glyph_width,
            container_width,
        }
    }

    pub const fn cells(container_width: u16) -> Self {
        Self::new(1, container_width)
    }

    /// Number of glyphs that fit on one line.
    pub fn columns(&self) -> usize {
        let glyph = self.glyph_width.max(1);
        usize::from(self.container_width / glyph).max(1)
    }
}

impl Default for Measure {
    fn default() -> Self {
        Self::cells(80)
    }
}

pub fn char_width(ch: char) -> usize {
    match ch {
        '\t' => TAB_WIDTH,
        '\n' | '\r' => 0,
        _ => UnicodeWidthChar::width(ch).unwrap_or(0),
    }
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Whitespace,
}

/// Greedy word wrap over `chars`. Whitespace stays on the line it follows,
/// a word wider than the line is split, and `\n` always ends a line (the
/// newline belongs to the line it ends). Every character ends up in exactly
/// one returned range.
pub fn wrap_text(chars: &[char], width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut content_width = 0;
    let mut pending_whitespace = 0;

    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '\n' {
            lines.push(line_start..idx + 1);
            line_start = idx + 1;
            content_width = 0;
            pending_whitespace = 0;
            idx += 1;
            continue;
        }

        let kind = if ch.is_whitespace() {
            TokenKind::Whitespace
        } else {
            TokenKind::Word
        };
        let token_start = idx;
        let mut token_width = 0;
        while idx < chars.len() && chars[idx] != '\n' {
            let same_kind = if chars[idx].is_whitespace() {
                kind == TokenKind::Whitespace
            } else {
                kind == TokenKind::Word
            };
            if !same_kind {
                break;
            }
            token_width += char_width(chars[idx]);
            idx += 1;
        }

        match kind {
            TokenKind::Whitespace => {
                pending_whitespace += token_width;
            }
            TokenKind::Word => {
                if content_width > 0 && content_width + pending_whitespace + token_width > width {
                    lines.push(line_start..token_start);
                    line_start = token_start;
                    content_width = 0;
                    pending_whitespace = 0;
                }
                content_width += pending_whitespace;
                pending_whitespace = 0;

                if content_width + token_width <= width {
                    content_width += token_width;
                    continue;
                }

                // The word alone does not fit: hard split it.
                for (pos, ch) in chars.iter().enumerate().take(idx).skip(token_start) {
                    let ch_width = char_width(*ch);
                    if content_width > 0 && content_width + ch_width > width {
                        lines.push(line_start..pos);
                        line_start = pos;
                        content_width = 0;
                    }
                    content_width += ch_width;
                }
            }
        }
    }

    if line_start < chars.len() || lines.is_empty() {
        lines.push(line_start..chars.len());
    }
    lines
}

pub fn container_wrap_width(container: &Container, measure: Measure) -> usize {
    if container.kind() == ContainerKind::Code {
        return UNBOUNDED_WIDTH;
    }
    let prefix = display_width(container.first_prefix())
        .max(display_width(container.continuation_prefix()));
    measure.columns().saturating_sub(prefix).max(1)
}

/// The part of one visual row that belongs to one segment. `start..end` are
/// offsets into the segment, `indent` is the display column the piece
/// starts at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinePiece {
    pub segment: SegmentId,
    pub start: usize,
    pub end: usize,
    pub indent: usize,
    merged_start: usize,
}

impl LinePiece {
    pub fn contains(&self, position: Position) -> bool {
        self.segment == position.segment && self.start <= position.offset && position.offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisualRow {
    pub pieces: Vec<LinePiece>,
    pub leading_space: bool,
}

/// A container's merged text broken into the rows it occupies on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineMap {
    container: ContainerId,
    chars: Vec<char>,
    rows: Vec<VisualRow>,
}

impl LineMap {
    pub fn for_container(root: &ContentRoot, id: ContainerId, measure: Measure) -> Option<Self> {
        let container = root.container(id)?;
        let mut chars = Vec::new();
        let mut spans = Vec::new();
        for segment_id in container.segment_ids() {
            let segment = root.segment(segment_id)?;
            let start = chars.len();
            chars.extend(segment.text().chars());
            spans.push((segment_id, start..chars.len()));
        }

        let width = container_wrap_width(container, measure);
        let rows = wrap_text(&chars, width)
            .into_iter()
            .map(|line| {
                let mut pieces = Vec::new();
                for (segment_id, span) in &spans {
                    let start = span.start.max(line.start);
                    let end = span.end.min(line.end);
                    if start >= end {
                        continue;
                    }
                    let indent = chars[line.start..start].iter().copied().map(char_width).sum();
                    pieces.push(LinePiece {
                        segment: *segment_id,
                        start: start - span.start,
                        end: end - span.start,
                        indent,
                        merged_start: start,
                    });
                }
                VisualRow {
                    pieces,
                    leading_space: chars.get(line.start) == Some(&' ') && line.start < line.end,
                }
            })
            .collect();

        Some(Self {
            container: id,
            chars,
            rows,
        })
    }

    pub fn for_segment(root: &ContentRoot, id: SegmentId, measure: Measure) -> Option<Self> {
        let segment = root.segment(id)?;
        Self::for_container(root, segment.container(), measure)
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn rows(&self) -> &[VisualRow] {
        &self.rows
    }

    pub fn locate(&self, position: Position) -> Option<(usize, &LinePiece)> {
        self.rows.iter().enumerate().find_map(|(row_idx, row)| {
            row.pieces
                .iter()
                .find(|piece| piece.contains(position))
                .map(|piece| (row_idx, piece))
        })
    }

    /// Row index and logical column of `position`. The column discounts a
    /// leading space on the row.
    pub fn column_of(&self, position: Position) -> Option<(usize, usize)> {
        let (row_idx, piece) = self.locate(position)?;
        let row = &self.rows[row_idx];
        let from = piece.merged_start;
        let to = piece.merged_start + (position.offset - piece.start);
        let width: usize = self.chars[from..to].iter().copied().map(char_width).sum();
        let leading = usize::from(row.leading_space);
        Some((row_idx, (piece.indent + width).saturating_sub(leading)))
    }

    /// The character on `row` at logical `column`, clamped to the row's last
    /// character.
    pub fn position_at(&self, row_idx: usize, column: usize) -> Option<Position> {
        let row = self.rows.get(row_idx)?;
        let column = column + usize::from(row.leading_space);
        for piece in &row.pieces {
            let mut cell = piece.indent;
            for offset in piece.start..piece.end {
                let ch = self.chars[piece.merged_start + (offset - piece.start)];
                let ch_width = char_width(ch);
                if cell + ch_width > column {
                    return Some(Position::new(piece.segment, offset));
                }
                cell += ch_width;
            }
        }
        let last = row.pieces.iter().rev().find(|piece| !piece.is_empty())?;
        Some(Position::new(last.segment, last.end - 1))
    }

    /// Display column where `position` is drawn, ignoring the leading-space
    /// adjustment.
    pub fn visual_column(&self, position: Position) -> Option<(usize, usize)> {
        let (row_idx, piece) = self.locate(position)?;
        let from = piece.merged_start;
        let to = piece.merged_start + (position.offset - piece.start);
        let width: usize = self.chars[from..to].iter().copied().map(char_width).sum();
        Some((row_idx, piece.indent + width))
    }

    pub(crate) fn piece_chars(&self, piece: &LinePiece) -> &[char] {
        &self.chars[piece.merged_start..piece.merged_start + piece.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutRow {
    Separator,
    Content { container: ContainerId, row: usize },
}

/// Every row the content occupies on screen, in order: each container's
/// wrapped rows with one blank row between containers.
#[derive(Clone, Debug, Default)]
pub struct DocumentLayout {
    maps: Vec<LineMap>,
    rows: Vec<LayoutRow>,
}

impl DocumentLayout {
    pub fn compute(root: &ContentRoot, measure: Measure) -> Self {
        let mut maps = Vec::with_capacity(root.containers().len());
        let mut rows = Vec::new();
        for (idx, container) in root.containers().iter().enumerate() {
            if idx > 0 {
                rows.push(LayoutRow::Separator);
            }
            let Some(map) = LineMap::for_container(root, container.id(), measure) else {
                continue;
            };
            for row in 0..map.rows().len() {
                rows.push(LayoutRow::Content {
                    container: container.id(),
                    row,
                });
            }
            maps.push(map);
        }
        Self { maps, rows }
    }

    pub fn rows(&self) -> &[LayoutRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn line_map(&self, container: ContainerId) -> Option<&LineMap> {
        self.maps.iter().find(|map| map.container == container)
    }

    /// Document line of `position`.
    pub fn line_of(&self, root: &ContentRoot, position: Position) -> Option<usize> {
        let container = root.segment(position.segment)?.container();
        let map = self.line_map(container)?;
        let (row, _) = map.locate(position)?;
        self.rows.iter().position(|entry| {
            *entry
                == LayoutRow::Content {
                    container,
                    row,
                }
        })
    }
}

/// Total number of screen lines the content needs, as numbered by the gutter.
pub fn wrapped_line_count(root: &ContentRoot, measure: Measure) -> usize {
    DocumentLayout::compute(root, measure).len().max(1)
}
