use super::{ContainerId, ContentRoot, NavigationError, Position, SegmentId, TextSegment};

/// The cursor seen from inside its segment: the text on either side of the
/// cursor character and the cursor's offset into the merged text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalContext<'a> {
    pub segment: &'a TextSegment,
    pub before: &'a str,
    pub marker: char,
    pub after: &'a str,
    pub offset: usize,
}

impl<'a> LocalContext<'a> {
    pub fn merged(&self) -> &'a str {
        self.segment.text()
    }

    pub fn len(&self) -> usize {
        self.segment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment.id()
    }

    pub fn container(&self) -> ContainerId {
        self.segment.container()
    }

    pub fn position(&self) -> Position {
        Position::new(self.segment.id(), self.offset)
    }

    pub(crate) fn chars(&self) -> Vec<char> {
        self.merged().chars().collect()
    }
}

pub fn local_context(
    root: &ContentRoot,
    cursor: Position,
) -> Result<LocalContext<'_>, NavigationError> {
    let segment = root
        .segment(cursor.segment)
        .ok_or(NavigationError::UnknownSegment(cursor.segment))?;
    let text = segment.text();
    let start = char_to_byte_idx(text, cursor.offset);
    let Some(marker) = text[start..].chars().next() else {
        return Err(NavigationError::OffsetOutOfRange {
            segment: cursor.segment,
            offset: cursor.offset,
            len: segment.len(),
        });
    };
    let end = start + marker.len_utf8();
    Ok(LocalContext {
        segment,
        before: &text[..start],
        marker,
        after: &text[end..],
        offset: cursor.offset,
    })
}

pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Word,
    Whitespace,
    Other,
}

impl CharClass {
    pub fn of(ch: char) -> Self {
        if ch.is_whitespace() {
            CharClass::Whitespace
        } else if is_word_char(ch) {
            CharClass::Word
        } else {
            CharClass::Other
        }
    }
}

pub(crate) fn skip_leading_whitespace(text: &str) -> usize {
    text.chars().take_while(|ch| ch.is_whitespace()).count()
}
