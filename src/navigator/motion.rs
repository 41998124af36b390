use super::context::skip_leading_whitespace;
use super::{
    Boundary, CharClass, ContentRoot, Direction, LineMap, LocalContext, Measure, NavigationError,
    Target,
};

pub fn char_right(context: &LocalContext<'_>) -> Result<Target, NavigationError> {
    let next = context.offset + 1;
    if next < context.len() {
        Ok(Target::within(next))
    } else {
        Err(NavigationError::Boundary(Boundary::End))
    }
}

pub fn char_left(context: &LocalContext<'_>) -> Result<Target, NavigationError> {
    match context.offset.checked_sub(1) {
        Some(prev) => Ok(Target::within(prev)),
        None => Err(NavigationError::Boundary(Boundary::Start)),
    }
}

pub fn first_char(_context: &LocalContext<'_>) -> Result<Target, NavigationError> {
    Ok(Target::within(0))
}

pub fn last_char(context: &LocalContext<'_>) -> Result<Target, NavigationError> {
    Ok(Target::within(context.len().saturating_sub(1)))
}

/// Start of the next word. Runs of word characters and runs of symbols count
/// as words; whitespace separates them.
pub fn word_forward(
    root: &ContentRoot,
    context: &LocalContext<'_>,
) -> Result<Target, NavigationError> {
    let chars = context.chars();
    let mut idx = context.offset;
    let class = CharClass::of(context.marker);
    while idx < chars.len() && CharClass::of(chars[idx]) == class {
        idx += 1;
    }
    while idx < chars.len() && chars[idx].is_whitespace() {
        idx += 1;
    }
    if idx < chars.len() {
        return Ok(Target::within(idx));
    }

    let next = root
        .walk_text(Some(context.segment_id()), Direction::Forward)
        .meaningful()
        .next()
        .ok_or(NavigationError::Boundary(Boundary::End))?;
    let offset = skip_leading_whitespace(next.text()).min(next.len().saturating_sub(1));
    Ok(Target::cross(next.id(), offset))
}

pub fn word_backward(
    root: &ContentRoot,
    context: &LocalContext<'_>,
) -> Result<Target, NavigationError> {
    if context.offset == 0 {
        let prev = root
            .walk_text(Some(context.segment_id()), Direction::Backward)
            .meaningful()
            .next()
            .ok_or(NavigationError::Boundary(Boundary::Start))?;
        return Ok(Target::cross(prev.id(), prev.len().saturating_sub(1)));
    }

    let chars = context.chars();
    let mut idx = context.offset - 1;
    while idx > 0 && chars[idx].is_whitespace() {
        idx -= 1;
    }
    if chars[idx].is_whitespace() {
        return Ok(Target::within(0));
    }
    let class = CharClass::of(chars[idx]);
    while idx > 0 && CharClass::of(chars[idx - 1]) == class {
        idx -= 1;
    }
    Ok(Target::within(idx))
}

/// `gg`: jump to the first segment of the document unless the cursor already
/// sits in the same parent as that segment.
pub fn first_text_segment(
    root: &ContentRoot,
    context: &LocalContext<'_>,
) -> Result<Target, NavigationError> {
    let first = root
        .first_text_segment()
        .ok_or(NavigationError::Boundary(Boundary::Start))?;
    if first.shares_parent(context.segment) {
        return Err(NavigationError::Boundary(Boundary::Start));
    }
    Ok(Target::cross(first.id(), 0))
}

/// `G`: jump to the last meaningful segment unless the cursor already sits in
/// the same parent as that segment.
pub fn last_text_segment(
    root: &ContentRoot,
    context: &LocalContext<'_>,
) -> Result<Target, NavigationError> {
    let last = root
        .last_meaningful_text_segment()
        .ok_or(NavigationError::Boundary(Boundary::End))?;
    if last.shares_parent(context.segment) {
        return Err(NavigationError::Boundary(Boundary::End));
    }
    Ok(Target::cross(last.id(), 0))
}

pub fn line_up(
    root: &ContentRoot,
    context: &LocalContext<'_>,
    measure: Measure,
) -> Result<Target, NavigationError> {
    vertical(root, context, measure, Direction::Backward)
}

pub fn line_down(
    root: &ContentRoot,
    context: &LocalContext<'_>,
    measure: Measure,
) -> Result<Target, NavigationError> {
    vertical(root, context, measure, Direction::Forward)
}

fn vertical(
    root: &ContentRoot,
    context: &LocalContext<'_>,
    measure: Measure,
    direction: Direction,
) -> Result<Target, NavigationError> {
    let boundary = match direction {
        Direction::Forward => Boundary::End,
        Direction::Backward => Boundary::Start,
    };
    let from = context.position();
    let map = LineMap::for_segment(root, from.segment, measure)
        .ok_or(NavigationError::UnknownSegment(from.segment))?;
    let (row, column) = map
        .column_of(from)
        .ok_or(NavigationError::OffsetOutOfRange {
            segment: from.segment,
            offset: from.offset,
            len: context.len(),
        })?;

    let adjacent = match direction {
        Direction::Forward => Some(row + 1).filter(|next| *next < map.rows().len()),
        Direction::Backward => row.checked_sub(1),
    };
    if let Some(position) = adjacent.and_then(|next| map.position_at(next, column)) {
        return Ok(Target::between(from, position));
    }

    let neighbour = root
        .walk_text(Some(from.segment), direction)
        .meaningful()
        .find(|segment| segment.container() != context.container())
        .ok_or(NavigationError::Boundary(boundary))?;
    let other = LineMap::for_segment(root, neighbour.id(), measure)
        .ok_or(NavigationError::UnknownSegment(neighbour.id()))?;
    let row = match direction {
        Direction::Forward => 0,
        Direction::Backward => other.rows().len().saturating_sub(1),
    };
    let position = other
        .position_at(row, column)
        .ok_or(NavigationError::Boundary(boundary))?;
    Ok(Target::between(from, position))
}
