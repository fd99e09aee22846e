use super::{
    Backing,
    ExclusiveSequence,
    view::SubRangeView,
};
use crate::{
    capability::Cursor,
    errors::SequenceError,
    result::SequenceResult,
};
use tracing::warn;

// FailFastCursor - bidirectional cursor with modification tracking
//
// Captures the root change counter at creation and re-checks it before every
// step. Mutations made through the cursor itself re-synchronize the captured
// value, which keeps the cursor usable afterwards.
pub struct FailFastCursor<'a, T> {
    source: &'a (dyn Backing<T> + 'a),
    cursor: usize,
    last_returned: Option<usize>,
    expected: usize,
    exhausted: bool,
}

impl<'a, T: Clone> FailFastCursor<'a, T> {
    pub(crate) fn new(sequence: &'a ExclusiveSequence<T>, index: usize) -> Self {
        Self::over(sequence, index)
    }

    pub(crate) fn over_view(view: &'a SubRangeView<'_, T>, index: usize) -> Self {
        Self::over(view, index)
    }

    fn over(source: &'a (dyn Backing<T> + 'a), index: usize) -> Self {
        Self {
            expected: source.root_change_count(),
            source,
            cursor: index,
            last_returned: None,
            exhausted: false,
        }
    }

    #[inline]
    fn check_for_change(&self, operation: &'static str) -> SequenceResult<()> {
        let found = self.source.root_change_count();
        if found != self.expected {
            warn!(operation, expected = self.expected, found, "structural change behind cursor");
            return Err(SequenceError::interference(operation));
        }
        Ok(())
    }

    fn resync(&mut self) {
        self.expected = self.source.root_change_count();
    }

    fn read(&self, index: usize, operation: &'static str) -> SequenceResult<T> {
        // A slot past the backing means the length moved without the counter
        // noticing (wrap-around); report it as interference rather than a bounds error.
        self.source
            .peek_slot(index)
            .ok_or(SequenceError::interference(operation))
    }
}

impl<T: Clone> Cursor<T> for FailFastCursor<'_, T> {
    fn has_next(&self) -> SequenceResult<bool> {
        self.check_for_change("has_next")?;
        Ok(self.cursor < self.source.visible_len())
    }

    fn advance(&mut self) -> SequenceResult<Option<T>> {
        self.check_for_change("advance")?;
        let index = self.cursor;
        if index >= self.source.visible_len() {
            return Ok(None);
        }
        let item = self.read(index, "advance")?;
        self.cursor = index + 1;
        self.last_returned = Some(index);
        Ok(Some(item))
    }

    fn has_previous(&self) -> SequenceResult<bool> {
        self.check_for_change("has_previous")?;
        Ok(self.cursor > 0)
    }

    fn retreat(&mut self) -> SequenceResult<Option<T>> {
        self.check_for_change("retreat")?;
        let Some(index) = self.cursor.checked_sub(1) else {
            return Ok(None);
        };
        if index >= self.source.visible_len() {
            return Err(SequenceError::interference("retreat"));
        }
        let item = self.read(index, "retreat")?;
        self.cursor = index;
        self.last_returned = Some(index);
        Ok(Some(item))
    }

    #[inline]
    fn next_index(&self) -> usize {
        self.cursor
    }

    fn remove(&mut self) -> SequenceResult<T> {
        let index = self
            .last_returned
            .ok_or(SequenceError::IllegalCursorState { operation: "remove" })?;
        self.check_for_change("remove")?;
        let removed = self.source.remove_slot(index)?;
        self.cursor = index;
        self.last_returned = None;
        self.resync();
        Ok(removed)
    }

    fn replace(&mut self, value: T) -> SequenceResult<T> {
        let index = self
            .last_returned
            .ok_or(SequenceError::IllegalCursorState { operation: "replace" })?;
        self.check_for_change("replace")?;
        self.source.replace_slot(index, value)
    }

    fn insert(&mut self, value: T) -> SequenceResult<()> {
        self.check_for_change("insert")?;
        self.source.insert_slot(self.cursor, value)?;
        self.cursor += 1;
        self.last_returned = None;
        self.resync();
        Ok(())
    }
}

// Plain iteration yields the first error once, then stops
impl<T: Clone> Iterator for FailFastCursor<'_, T> {
    type Item = SequenceResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.advance() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(error) => {
                self.exhausted = true;
                Some(Err(error))
            }
        }
    }
}
