use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

mod content;
mod context;
mod lines;
mod motion;
mod relocate;

pub use content::{
    Container, ContainerKind, ContentBuilder, ContentRoot, Direction, TextSegment, TextWalk,
};
pub use context::{CharClass, LocalContext, is_word_char, local_context};
pub use lines::{
    DocumentLayout, LayoutRow, LineMap, LinePiece, Measure, VisualRow, char_width,
    container_wrap_width, display_width, wrap_text, wrapped_line_count,
};
pub use motion::{
    char_left, char_right, first_char, first_text_segment, last_char, last_text_segment,
    line_down, line_up, word_backward, word_forward,
};
pub use relocate::initial_position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(usize);

impl SegmentId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(usize);

impl ContainerId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// The cursor: a character offset inside one text segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub segment: SegmentId,
    pub offset: usize,
}

impl Position {
    pub fn new(segment: SegmentId, offset: usize) -> Self {
        Self { segment, offset }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => f.write_str("start"),
            Boundary::End => f.write_str("end"),
        }
    }
}

/// Where a motion wants the cursor to go. `segment` is only set when the
/// motion leaves the segment the cursor is currently in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub offset: usize,
    pub segment: Option<SegmentId>,
}

impl Target {
    pub fn within(offset: usize) -> Self {
        Self {
            offset,
            segment: None,
        }
    }

    pub fn cross(segment: SegmentId, offset: usize) -> Self {
        Self {
            offset,
            segment: Some(segment),
        }
    }

    pub(crate) fn between(from: Position, to: Position) -> Self {
        if from.segment == to.segment {
            Self::within(to.offset)
        } else {
            Self::cross(to.segment, to.offset)
        }
    }

    pub fn is_cross_segment(&self) -> bool {
        self.segment.is_some()
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no cursor placed in the content")]
    NoCursor,
    #[error("no content root to navigate")]
    MissingRoot,
    #[error("reached {0} of document")]
    Boundary(Boundary),
    #[error("segment {0} does not exist")]
    UnknownSegment(SegmentId),
    #[error("offset {offset} is outside segment {segment} of length {len}")]
    OffsetOutOfRange {
        segment: SegmentId,
        offset: usize,
        len: usize,
    },
}

impl NavigationError {
    pub fn boundary(&self) -> Option<Boundary> {
        match self {
            NavigationError::Boundary(boundary) => Some(*boundary),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordForward,
    WordBackward,
    FirstChar,
    LastChar,
    FirstTextSegment,
    LastTextSegment,
}

impl Motion {
    pub const ALL: [Motion; 10] = [
        Motion::Left,
        Motion::Right,
        Motion::Up,
        Motion::Down,
        Motion::WordForward,
        Motion::WordBackward,
        Motion::FirstChar,
        Motion::LastChar,
        Motion::FirstTextSegment,
        Motion::LastTextSegment,
    ];
}

/// Owns the content root of the current page together with the single
/// cursor that moves through it.
#[derive(Debug, Default)]
pub struct Navigator {
    root: Option<ContentRoot>,
    cursor: Option<Position>,
    active_container: Option<ContainerId>,
    measure: Measure,
    last_failure: Option<NavigationError>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: ContentRoot) -> Self {
        let mut navigator = Self::new();
        navigator.replace_root(root);
        navigator
    }

    /// Swap in the content of a newly opened page. The previous cursor
    /// belongs to the old root and is discarded.
    pub fn replace_root(&mut self, root: ContentRoot) {
        self.root = Some(root);
        self.cursor = None;
        self.active_container = None;
        self.last_failure = None;
        self.initialize_cursor();
    }

    pub fn root(&self) -> Option<&ContentRoot> {
        self.root.as_ref()
    }

    pub fn locate_root(&self) -> Result<&ContentRoot, NavigationError> {
        self.root.as_ref().ok_or(NavigationError::MissingRoot)
    }

    pub fn cursor(&self) -> Option<Position> {
        self.cursor
    }

    pub fn active_container(&self) -> Option<ContainerId> {
        self.active_container
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn set_measure(&mut self, measure: Measure) {
        self.measure = measure;
    }

    pub fn last_failure(&self) -> Option<&NavigationError> {
        self.last_failure.as_ref()
    }

    pub fn local_context(&self) -> Result<LocalContext<'_>, NavigationError> {
        let root = self.locate_root()?;
        let cursor = self.cursor.ok_or(NavigationError::NoCursor)?;
        local_context(root, cursor)
    }

    pub fn wrapped_line_count(&self) -> usize {
        self.root
            .as_ref()
            .map(|root| wrapped_line_count(root, self.measure))
            .unwrap_or(1)
    }

    /// Compute where `motion` would put the cursor without moving it.
    pub fn compute(&self, motion: Motion) -> Result<Target, NavigationError> {
        let root = self.locate_root()?;
        let context = self.local_context()?;
        match motion {
            Motion::Left => char_left(&context),
            Motion::Right => char_right(&context),
            Motion::Up => line_up(root, &context, self.measure),
            Motion::Down => line_down(root, &context, self.measure),
            Motion::WordForward => word_forward(root, &context),
            Motion::WordBackward => word_backward(root, &context),
            Motion::FirstChar => first_char(&context),
            Motion::LastChar => last_char(&context),
            Motion::FirstTextSegment => first_text_segment(root, &context),
            Motion::LastTextSegment => last_text_segment(root, &context),
        }
    }

    pub fn apply(&mut self, motion: Motion) -> Result<Position, NavigationError> {
        let result = self
            .compute(motion)
            .and_then(|target| self.apply_offset(target));
        match &result {
            Ok(position) => {
                debug!(?motion, segment = %position.segment, offset = position.offset, "cursor moved");
                self.last_failure = None;
            }
            Err(NavigationError::Boundary(boundary)) => {
                debug!(?motion, "reached {boundary} of document");
                self.last_failure = result.clone().err();
            }
            Err(err) => {
                warn!(?motion, "motion ignored: {err}");
                self.last_failure = Some(err.clone());
            }
        }
        result
    }

    fn run(&mut self, motion: Motion) {
        let _ = self.apply(motion);
    }

    pub fn move_right(&mut self) {
        self.run(Motion::Right);
    }

    pub fn move_left(&mut self) {
        self.run(Motion::Left);
    }

    pub fn move_up(&mut self) {
        self.run(Motion::Up);
    }

    pub fn move_down(&mut self) {
        self.run(Motion::Down);
    }

    pub fn move_word_forward(&mut self) {
        self.run(Motion::WordForward);
    }

    pub fn move_word_backward(&mut self) {
        self.run(Motion::WordBackward);
    }

    pub fn move_to_first_char(&mut self) {
        self.run(Motion::FirstChar);
    }

    pub fn move_to_last_char(&mut self) {
        self.run(Motion::LastChar);
    }

    pub fn move_to_first_text_node(&mut self) {
        self.run(Motion::FirstTextSegment);
    }

    pub fn move_to_last_text_node(&mut self) {
        self.run(Motion::LastTextSegment);
    }
}

#[cfg(test)]
#[path = "navigator_tests.rs"]
mod navigator_tests;
