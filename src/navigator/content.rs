use std::ops::Range;

use tdoc::{ChecklistItem, Document, InlineStyle, Paragraph, ParagraphType, Span};

use super::{ContainerId, SegmentId};

const QUOTE_PREFIX: &str = "│ ";
const BULLET_PREFIX: &str = "• ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Text,
    Heading(u8),
    Code,
    ListItem,
    Quote,
}

/// A block that owns a contiguous run of segments, e.g. one paragraph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    id: ContainerId,
    kind: ContainerKind,
    first_prefix: String,
    continuation_prefix: String,
    segments: Range<usize>,
}

impl Container {
    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn first_prefix(&self) -> &str {
        &self.first_prefix
    }

    pub fn continuation_prefix(&self) -> &str {
        &self.continuation_prefix
    }

    pub fn segment_ids(&self) -> impl DoubleEndedIterator<Item = SegmentId> + '_ {
        self.segments.clone().map(SegmentId::new)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSegment {
    id: SegmentId,
    container: ContainerId,
    text: String,
    len: usize,
    style: InlineStyle,
}

impl TextSegment {
    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters, the unit every offset is expressed in.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn style(&self) -> InlineStyle {
        self.style
    }

    /// Whether the segment holds anything besides whitespace.
    pub fn is_meaningful(&self) -> bool {
        self.text.chars().any(|ch| !ch.is_whitespace())
    }

    /// Plain runs hang directly off their container. A styled run is its own
    /// inline element, so it only shares a parent with itself.
    pub fn shares_parent(&self, other: &TextSegment) -> bool {
        if self.id == other.id {
            return true;
        }
        self.container == other.container
            && self.style == InlineStyle::None
            && other.style == InlineStyle::None
    }
}

/// Every navigable piece of text of one page, indexed by stable ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentRoot {
    containers: Vec<Container>,
    segments: Vec<TextSegment>,
}

impl ContentRoot {
    pub fn builder() -> ContentBuilder {
        ContentBuilder::new()
    }

    pub fn from_document(document: &Document) -> Self {
        let mut builder = ContentBuilder::new();
        for paragraph in &document.paragraphs {
            collect_paragraph(paragraph, &BlockPrefix::root(), &mut builder);
        }
        builder.build()
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn segments(&self) -> &[TextSegment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&TextSegment> {
        self.segments.get(id.index())
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.index())
    }

    pub fn container_of(&self, id: SegmentId) -> Option<&Container> {
        let segment = self.segment(id)?;
        self.container(segment.container)
    }

    /// True when there is no character the cursor could sit on.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(TextSegment::is_empty)
    }

    pub fn walk_text(&self, from: Option<SegmentId>, direction: Direction) -> TextWalk<'_> {
        TextWalk::new(&self.segments, from, direction)
    }

    pub fn first_text_segment(&self) -> Option<&TextSegment> {
        self.walk_text(None, Direction::Forward).next()
    }

    pub fn first_meaningful_text_segment(&self) -> Option<&TextSegment> {
        self.walk_text(None, Direction::Forward).meaningful().next()
    }

    pub fn last_meaningful_text_segment(&self) -> Option<&TextSegment> {
        self.walk_text(None, Direction::Backward).meaningful().next()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Lazy walk over the non-empty segments of a root, starting next to a
/// given segment (exclusive) or at the edge of the document.
#[derive(Clone, Debug)]
pub struct TextWalk<'a> {
    segments: &'a [TextSegment],
    next: Option<usize>,
    direction: Direction,
    meaningful_only: bool,
}

impl<'a> TextWalk<'a> {
    fn new(segments: &'a [TextSegment], from: Option<SegmentId>, direction: Direction) -> Self {
        let len = segments.len();
        let next = match (from, direction) {
            (None, Direction::Forward) => (len > 0).then_some(0),
            (None, Direction::Backward) => len.checked_sub(1),
            (Some(id), Direction::Forward) => Some(id.index() + 1).filter(|idx| *idx < len),
            (Some(id), Direction::Backward) => id.index().min(len).checked_sub(1),
        };
        Self {
            segments,
            next,
            direction,
            meaningful_only: false,
        }
    }

    /// Skip segments that hold only whitespace.
    pub fn meaningful(mut self) -> Self {
        self.meaningful_only = true;
        self
    }

    fn advance(&mut self, idx: usize) {
        self.next = match self.direction {
            Direction::Forward => Some(idx + 1).filter(|next| *next < self.segments.len()),
            Direction::Backward => idx.checked_sub(1),
        };
    }
}

impl<'a> Iterator for TextWalk<'a> {
    type Item = &'a TextSegment;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.next {
            self.advance(idx);
            let segment = &self.segments[idx];
            if segment.is_empty() {
                continue;
            }
            if self.meaningful_only && !segment.is_meaningful() {
                continue;
            }
            return Some(segment);
        }
        None
    }
}

struct PendingContainer {
    kind: ContainerKind,
    first_prefix: String,
    continuation_prefix: String,
}

/// Assembles a [`ContentRoot`] container by container. Containers that never
/// receive a segment are dropped.
pub struct ContentBuilder {
    containers: Vec<Container>,
    segments: Vec<TextSegment>,
    pending: Option<PendingContainer>,
    open: Option<usize>,
}

impl Default for ContentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self {
            containers: Vec::new(),
            segments: Vec::new(),
            pending: None,
            open: None,
        }
    }

    pub fn container(&mut self, kind: ContainerKind) -> &mut Self {
        self.container_with_prefix(kind, "", "")
    }

    pub fn container_with_prefix(
        &mut self,
        kind: ContainerKind,
        first_prefix: &str,
        continuation_prefix: &str,
    ) -> &mut Self {
        self.open = None;
        self.pending = Some(PendingContainer {
            kind,
            first_prefix: first_prefix.to_string(),
            continuation_prefix: continuation_prefix.to_string(),
        });
        self
    }

    pub fn segment(&mut self, text: &str) -> &mut Self {
        self.styled_segment(text, InlineStyle::None)
    }

    pub fn styled_segment(&mut self, text: &str, style: InlineStyle) -> &mut Self {
        let container = self.open_container();
        let id = SegmentId::new(self.segments.len());
        self.segments.push(TextSegment {
            id,
            container: ContainerId::new(container),
            text: text.to_string(),
            len: text.chars().count(),
            style,
        });
        self.containers[container].segments.end = self.segments.len();
        self
    }

    pub fn build(&mut self) -> ContentRoot {
        self.pending = None;
        self.open = None;
        ContentRoot {
            containers: std::mem::take(&mut self.containers),
            segments: std::mem::take(&mut self.segments),
        }
    }

    fn open_container(&mut self) -> usize {
        if let Some(open) = self.open {
            return open;
        }
        let pending = self.pending.take().unwrap_or(PendingContainer {
            kind: ContainerKind::Text,
            first_prefix: String::new(),
            continuation_prefix: String::new(),
        });
        let index = self.containers.len();
        let start = self.segments.len();
        self.containers.push(Container {
            id: ContainerId::new(index),
            kind: pending.kind,
            first_prefix: pending.first_prefix,
            continuation_prefix: pending.continuation_prefix,
            segments: start..start,
        });
        self.open = Some(index);
        index
    }
}

#[derive(Clone)]
struct BlockPrefix {
    first: String,
    continuation: String,
    text_kind: ContainerKind,
}

impl BlockPrefix {
    fn root() -> Self {
        Self {
            first: String::new(),
            continuation: String::new(),
            text_kind: ContainerKind::Text,
        }
    }

    fn nested(&self, marker: &str, text_kind: ContainerKind) -> Self {
        let padding = " ".repeat(marker.chars().count());
        Self {
            first: format!("{}{}", self.first, marker),
            continuation: format!("{}{}", self.continuation, padding),
            text_kind,
        }
    }

    fn quoted(&self) -> Self {
        Self {
            first: format!("{}{}", self.first, QUOTE_PREFIX),
            continuation: format!("{}{}", self.continuation, QUOTE_PREFIX),
            text_kind: ContainerKind::Quote,
        }
    }

    fn continued(&self) -> Self {
        Self {
            first: self.continuation.clone(),
            continuation: self.continuation.clone(),
            text_kind: self.text_kind,
        }
    }
}

fn collect_paragraph(paragraph: &Paragraph, prefix: &BlockPrefix, builder: &mut ContentBuilder) {
    match paragraph.paragraph_type() {
        ParagraphType::Header1 => collect_leaf(paragraph, ContainerKind::Heading(1), prefix, builder),
        ParagraphType::Header2 => collect_leaf(paragraph, ContainerKind::Heading(2), prefix, builder),
        ParagraphType::Header3 => collect_leaf(paragraph, ContainerKind::Heading(3), prefix, builder),
        ParagraphType::CodeBlock => collect_leaf(paragraph, ContainerKind::Code, prefix, builder),
        ParagraphType::Quote => {
            let quoted = prefix.quoted();
            if !paragraph.content().is_empty() {
                collect_leaf(paragraph, ContainerKind::Quote, &quoted, builder);
            }
            for child in paragraph.children().iter() {
                collect_paragraph(child, &quoted, builder);
            }
        }
        ParagraphType::UnorderedList => {
            for entry in paragraph.entries().iter() {
                let item = prefix.nested(BULLET_PREFIX, ContainerKind::ListItem);
                collect_entry(entry.iter(), &item, builder);
            }
        }
        ParagraphType::OrderedList => {
            for (idx, entry) in paragraph.entries().iter().enumerate() {
                let label = format!("{}. ", idx + 1);
                let item = prefix.nested(&label, ContainerKind::ListItem);
                collect_entry(entry.iter(), &item, builder);
            }
        }
        ParagraphType::Checklist => {
            for item in paragraph.checklist_items().iter() {
                collect_checklist_item(item, prefix, builder);
            }
        }
        _ => collect_leaf(paragraph, prefix.text_kind, prefix, builder),
    }
}

fn collect_entry<'a>(
    entry: impl Iterator<Item = &'a Paragraph>,
    prefix: &BlockPrefix,
    builder: &mut ContentBuilder,
) {
    for (idx, paragraph) in entry.enumerate() {
        if idx == 0 {
            collect_paragraph(paragraph, prefix, builder);
        } else {
            collect_paragraph(paragraph, &prefix.continued(), builder);
        }
    }
}

fn collect_checklist_item(item: &ChecklistItem, prefix: &BlockPrefix, builder: &mut ContentBuilder) {
    let nested = prefix.nested(BULLET_PREFIX, ContainerKind::ListItem);
    builder.container_with_prefix(ContainerKind::ListItem, &nested.first, &nested.continuation);
    for span in &item.content {
        collect_span(span, InlineStyle::None, builder);
    }
    let children = nested.continued();
    for child in &item.children {
        collect_checklist_item(child, &children, builder);
    }
}

fn collect_leaf(
    paragraph: &Paragraph,
    kind: ContainerKind,
    prefix: &BlockPrefix,
    builder: &mut ContentBuilder,
) {
    builder.container_with_prefix(kind, &prefix.first, &prefix.continuation);
    for span in paragraph.content().iter() {
        collect_span(span, InlineStyle::None, builder);
    }
}

fn collect_span(span: &Span, inherited: InlineStyle, builder: &mut ContentBuilder) {
    let style = if span.style == InlineStyle::None {
        inherited
    } else {
        span.style
    };
    if !span.text.is_empty() {
        builder.styled_segment(&span.text, style);
    }
    for child in &span.children {
        collect_span(child, style, builder);
    }
}
