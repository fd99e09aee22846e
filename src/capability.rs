use super::{
    errors::SequenceError,
    result::SequenceResult,
};
use std::fmt::{Debug, Write};

// Cursor - step-wise traversal shared by the fail-fast and snapshot cursors
//
// Mutation through a cursor is optional: cursor kinds that cannot support it
// keep the default bodies and report UnsupportedOperation.
pub trait Cursor<T> {
    fn has_next(&self) -> SequenceResult<bool>;

    fn advance(&mut self) -> SequenceResult<Option<T>>;

    fn has_previous(&self) -> SequenceResult<bool>;

    fn retreat(&mut self) -> SequenceResult<Option<T>>;

    // Index of the element the next `advance` would return
    fn next_index(&self) -> usize;

    fn previous_index(&self) -> Option<usize> {
        self.next_index().checked_sub(1)
    }

    fn remove(&mut self) -> SequenceResult<T> {
        Err(SequenceError::unsupported("cursor remove"))
    }

    fn replace(&mut self, value: T) -> SequenceResult<T> {
        drop(value);
        Err(SequenceError::unsupported("cursor replace"))
    }

    fn insert(&mut self, value: T) -> SequenceResult<()> {
        drop(value);
        Err(SequenceError::unsupported("cursor insert"))
    }
}

// Splitter - divide-and-conquer traversal over a contiguous range
//
// `try_split` hands out the left half and keeps the right half.
pub trait Splitter<T>: Sized {
    fn try_split(&mut self) -> SequenceResult<Option<Self>>;

    fn try_advance<F>(&mut self, action: F) -> SequenceResult<bool>
    where
        F: FnOnce(T);

    fn for_each_remaining<F>(&mut self, action: F) -> SequenceResult<()>
    where
        F: FnMut(T);

    fn estimate_size(&mut self) -> SequenceResult<usize>;
}

// Sequence - the capability set both variants (and their views) expose
//
// Bulk algorithms below are written once against it; the concrete types
// override them when they have a cheaper native path.
pub trait Sequence<T: Clone> {
    type Cursor<'c>: Cursor<T>
    where
        Self: 'c;

    type Splitter<'c>: Splitter<T>
    where
        Self: 'c;

    fn size(&self) -> SequenceResult<usize>;

    fn get(&self, index: usize) -> SequenceResult<T>;

    fn set(&self, index: usize, value: T) -> SequenceResult<T>;

    fn insert(&self, index: usize, value: T) -> SequenceResult<()>;

    fn remove_at(&self, index: usize) -> SequenceResult<T>;

    fn append(&self, value: T) -> SequenceResult<()>;

    fn clear(&self) -> SequenceResult<()>;

    fn cursor(&self) -> SequenceResult<Self::Cursor<'_>>;

    fn splitter(&self) -> SequenceResult<Self::Splitter<'_>>;

    // Provided algorithms

    fn is_empty(&self) -> SequenceResult<bool> {
        Ok(self.size()? == 0)
    }

    fn contains(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        let mut cursor = self.cursor()?;
        while let Some(item) = cursor.advance()? {
            if item == *value {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn to_vec(&self) -> SequenceResult<Vec<T>> {
        let mut splitter = self.splitter()?;
        let mut out = Vec::with_capacity(splitter.estimate_size()?);
        splitter.for_each_remaining(|item| out.push(item))?;
        Ok(out)
    }

    fn render(&self) -> SequenceResult<String>
    where
        T: Debug,
    {
        let mut cursor = self.cursor()?;
        let mut out = String::from("[");
        let mut first = true;
        while let Some(item) = cursor.advance()? {
            if !first {
                out.push_str(", ");
            }
            first = false;
            // writing into a String cannot fail
            let _ = write!(out, "{item:?}");
        }
        out.push(']');
        Ok(out)
    }

    fn remove_matching<P>(&self, mut predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        let mut index = 0;
        let mut removed = 0;
        while index < self.size()? {
            let item = self.get(index)?;
            if predicate(&item) {
                self.remove_at(index)?;
                removed += 1;
            } else {
                index += 1;
            }
        }
        Ok(removed)
    }
}
