use tracing::debug;

use super::{ContentRoot, NavigationError, Navigator, Position, Target};

impl Navigator {
    /// Commit `target` as the new cursor. The cursor and the active container
    /// change together or not at all.
    pub fn apply_offset(&mut self, target: Target) -> Result<Position, NavigationError> {
        let root = self.locate_root()?;
        let segment_id = match target.segment {
            Some(id) => id,
            None => self.cursor.ok_or(NavigationError::NoCursor)?.segment,
        };
        let segment = root
            .segment(segment_id)
            .ok_or(NavigationError::UnknownSegment(segment_id))?;
        if target.offset >= segment.len() {
            return Err(NavigationError::OffsetOutOfRange {
                segment: segment_id,
                offset: target.offset,
                len: segment.len(),
            });
        }
        let container = segment.container();
        let position = Position::new(segment_id, target.offset);

        if self.active_container != Some(container) {
            debug!(
                from = ?self.active_container.map(|id| id.index()),
                to = container.index(),
                "active container changed"
            );
        }
        self.cursor = Some(position);
        self.active_container = Some(container);
        Ok(position)
    }

    pub(crate) fn initialize_cursor(&mut self) -> Option<Position> {
        let position = self.root.as_ref().and_then(initial_position)?;
        let container = self
            .root
            .as_ref()
            .and_then(|root| root.segment(position.segment))
            .map(|segment| segment.container());
        self.cursor = Some(position);
        self.active_container = container;
        debug!(segment = %position.segment, "cursor initialized");
        Some(position)
    }
}

/// Offset 0 of the first meaningful segment, or of the first non-empty one
/// when the page is all whitespace.
pub fn initial_position(root: &ContentRoot) -> Option<Position> {
    root.first_meaningful_text_segment()
        .or_else(|| root.first_text_segment())
        .map(|segment| Position::new(segment.id(), 0))
}
