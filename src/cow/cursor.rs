use crate::{
    capability::{Cursor, Splitter},
    result::SequenceResult,
};
use std::sync::Arc;

// SnapshotCursor - bidirectional cursor pinned to one published array
//
// Holds its own reference to the array, so later writes never reach it and
// it never reports interference. Mutation through it stays unsupported.
// Positions are absolute inside `[start, end)`; `next_index` is relative to `start`.
pub struct SnapshotCursor<T> {
    snapshot: Arc<Vec<T>>,
    start: usize,
    end: usize,
    cursor: usize,
}

impl<T> SnapshotCursor<T> {
    pub(crate) fn over(snapshot: Arc<Vec<T>>, start: usize, end: usize, position: usize) -> Self {
        Self {
            snapshot,
            start,
            end,
            cursor: position,
        }
    }

    pub fn remaining(&self) -> usize {
        self.end - self.cursor
    }
}

impl<T: Clone> Cursor<T> for SnapshotCursor<T> {
    #[inline]
    fn has_next(&self) -> SequenceResult<bool> {
        Ok(self.cursor < self.end)
    }

    fn advance(&mut self) -> SequenceResult<Option<T>> {
        Ok(self.next())
    }

    #[inline]
    fn has_previous(&self) -> SequenceResult<bool> {
        Ok(self.cursor > self.start)
    }

    fn retreat(&mut self) -> SequenceResult<Option<T>> {
        if self.cursor <= self.start {
            return Ok(None);
        }
        self.cursor -= 1;
        Ok(Some(self.snapshot[self.cursor].clone()))
    }

    #[inline]
    fn next_index(&self) -> usize {
        self.cursor - self.start
    }
}

impl<T: Clone> Iterator for SnapshotCursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.cursor >= self.end {
            return None;
        }
        let item = self.snapshot[self.cursor].clone();
        self.cursor += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for SnapshotCursor<T> {}

// SnapshotSplitter - splittable traversal of one published array
//
// Bound at creation: the array cannot change, so there is nothing to bind late
// and nothing to validate.
pub struct SnapshotSplitter<T> {
    snapshot: Arc<Vec<T>>,
    index: usize,
    fence: usize,
}

impl<T> SnapshotSplitter<T> {
    pub(crate) fn over(snapshot: Arc<Vec<T>>, index: usize, fence: usize) -> Self {
        Self {
            snapshot,
            index,
            fence,
        }
    }
}

impl<T: Clone> Splitter<T> for SnapshotSplitter<T> {
    fn try_split(&mut self) -> SequenceResult<Option<Self>> {
        let low = self.index;
        let middle = low + (self.fence - low) / 2;
        if low >= middle {
            return Ok(None);
        }
        self.index = middle;
        Ok(Some(Self::over(Arc::clone(&self.snapshot), low, middle)))
    }

    fn try_advance<F>(&mut self, action: F) -> SequenceResult<bool>
    where
        F: FnOnce(T),
    {
        if self.index >= self.fence {
            return Ok(false);
        }
        let item = self.snapshot[self.index].clone();
        self.index += 1;
        action(item);
        Ok(true)
    }

    fn for_each_remaining<F>(&mut self, action: F) -> SequenceResult<()>
    where
        F: FnMut(T),
    {
        let start = self.index;
        self.index = self.fence;
        self.snapshot[start..self.fence].iter().cloned().for_each(action);
        Ok(())
    }

    #[inline]
    fn estimate_size(&mut self) -> SequenceResult<usize> {
        Ok(self.fence - self.index)
    }
}
