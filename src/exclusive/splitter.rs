use super::{
    Backing,
    ExclusiveSequence,
    view::SubRangeView,
};
use crate::{
    capability::Splitter,
    errors::SequenceError,
    result::SequenceResult,
};
use tracing::warn;

// SplittableCursor - late-binding divide-and-conquer cursor
//
// The upper boundary and the expected change counter are bound on first use,
// not at creation, so cursors taken before a mutation still agree on a
// boundary once they start working. Halves produced by `try_split` share the
// expected counter of their origin.
pub struct SplittableCursor<'a, T> {
    source: &'a (dyn Backing<T> + 'a),
    index: usize,
    fence: Option<usize>,
    expected: usize,
}

impl<'a, T: Clone> SplittableCursor<'a, T> {
    pub(crate) fn new(sequence: &'a ExclusiveSequence<T>) -> Self {
        Self::unbound(sequence)
    }

    pub(crate) fn over_view(view: &'a SubRangeView<'_, T>) -> Self {
        Self::unbound(view)
    }

    fn unbound(source: &'a (dyn Backing<T> + 'a)) -> Self {
        Self {
            source,
            index: 0,
            fence: None,
            expected: 0,
        }
    }

    fn bind(&mut self) -> SequenceResult<usize> {
        match self.fence {
            Some(fence) => Ok(fence),
            None => {
                let fence = self.source.checked_len("splitter")?;
                self.expected = self.source.root_change_count();
                self.fence = Some(fence);
                Ok(fence)
            }
        }
    }

    fn check_for_change(&self, operation: &'static str) -> SequenceResult<()> {
        let found = self.source.root_change_count();
        if found != self.expected {
            warn!(operation, expected = self.expected, found, "structural change behind splitter");
            return Err(SequenceError::interference(operation));
        }
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.fence.is_some()
    }
}

impl<T: Clone> Splitter<T> for SplittableCursor<'_, T> {
    fn try_split(&mut self) -> SequenceResult<Option<Self>> {
        let fence = self.bind()?;
        let low = self.index;
        let middle = low + (fence - low) / 2;
        if low >= middle {
            return Ok(None);
        }
        self.index = middle;
        Ok(Some(Self {
            source: self.source,
            index: low,
            fence: Some(middle),
            expected: self.expected,
        }))
    }

    fn try_advance<F>(&mut self, action: F) -> SequenceResult<bool>
    where
        F: FnOnce(T),
    {
        let fence = self.bind()?;
        self.check_for_change("try_advance")?;
        let index = self.index;
        if index >= fence {
            return Ok(false);
        }
        let item = self
            .source
            .peek_slot(index)
            .ok_or(SequenceError::interference("try_advance"))?;
        self.index = index + 1;
        action(item);
        Ok(true)
    }

    // One validation after the walk. A backing that shrank mid-walk stops the
    // walk early and is reported; the element count delivered is never silently short.
    fn for_each_remaining<F>(&mut self, mut action: F) -> SequenceResult<()>
    where
        F: FnMut(T),
    {
        let (fence, expected) = match self.fence {
            Some(fence) => (fence, self.expected),
            None => (self.source.checked_len("for_each_remaining")?, self.source.root_change_count()),
        };
        let start = self.index;
        self.index = fence.max(start);
        let mut truncated = false;
        for index in start..fence {
            match self.source.peek_slot(index) {
                Some(item) => action(item),
                None => {
                    truncated = true;
                    break;
                }
            }
        }
        let found = self.source.root_change_count();
        if truncated || found != expected {
            warn!(expected, found, truncated, "structural change during for_each_remaining");
            return Err(SequenceError::interference("for_each_remaining"));
        }
        Ok(())
    }

    fn estimate_size(&mut self) -> SequenceResult<usize> {
        let fence = self.bind()?;
        Ok(fence.saturating_sub(self.index))
    }
}
