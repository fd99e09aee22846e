use super::{
    Backing,
    ExclusiveSequence,
    cursor::FailFastCursor,
    splitter::SplittableCursor,
};
use crate::{
    capability::Sequence,
    errors::{
        SequenceError,
        check_index,
        check_position,
        check_range,
    },
    result::SequenceResult,
};
use std::{
    cell::Cell,
    cmp::Ordering,
    fmt::{self, Debug},
};
use tracing::warn;

// SubRangeView - live window over an exclusive sequence
//
// Holds a borrowed handle to the root plus an absolute offset, never the
// storage itself, so root reallocations do not affect it. Length and the
// expected root counter are tracked per view; a mutation through a view is
// propagated up the parent chain so every enclosing view stays coherent.
// Sibling views, and views created before a direct root mutation, are
// invalidated.
pub struct SubRangeView<'a, T> {
    root: &'a ExclusiveSequence<T>,
    parent: Option<&'a SubRangeView<'a, T>>,
    offset: usize,
    length: Cell<usize>,
    expected: Cell<usize>,
}

impl<'a, T> SubRangeView<'a, T> {
    pub(crate) fn over(root: &'a ExclusiveSequence<T>, offset: usize, length: usize) -> Self {
        Self {
            root,
            parent: None,
            offset,
            length: Cell::new(length),
            expected: Cell::new(root.change_count()),
        }
    }

    #[inline]
    fn check_for_change(&self, operation: &'static str) -> SequenceResult<()> {
        let found = self.root.change_count();
        let expected = self.expected.get();
        if found != expected {
            warn!(operation, expected, found, "sub-range view invalidated by a root change");
            return Err(SequenceError::interference(operation));
        }
        Ok(())
    }

    // Applies a length delta to this view and every ancestor, then adopts the
    // root counter everywhere along the chain.
    fn propagate(&self, delta: isize) {
        let now = self.root.change_count();
        let mut view = Some(self);
        while let Some(current) = view {
            current.length.set(current.length.get().wrapping_add_signed(delta));
            current.expected.set(now);
            view = current.parent;
        }
    }

    #[inline]
    fn end(&self) -> usize {
        self.offset + self.length.get()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> SequenceResult<usize> {
        self.check_for_change("len")?;
        Ok(self.length.get())
    }

    pub fn is_empty(&self) -> SequenceResult<bool> {
        Ok(self.len()? == 0)
    }

    // Element access

    pub fn read_at<R, F>(&self, index: usize, reader: F) -> SequenceResult<R>
    where
        F: FnOnce(&T) -> R,
    {
        check_index(index, self.length.get())?;
        self.check_for_change("read_at")?;
        self.root.read_at(self.offset + index, reader)
    }

    pub fn set(&self, index: usize, value: T) -> SequenceResult<T> {
        check_index(index, self.length.get())?;
        self.check_for_change("set")?;
        self.root.set(self.offset + index, value)
    }

    pub fn insert(&self, index: usize, value: T) -> SequenceResult<()> {
        check_position(index, self.length.get())?;
        self.check_for_change("insert")?;
        self.root.insert(self.offset + index, value)?;
        self.propagate(1);
        Ok(())
    }

    pub fn append(&self, value: T) -> SequenceResult<()> {
        self.insert(self.length.get(), value)
    }

    pub fn remove_at(&self, index: usize) -> SequenceResult<T> {
        check_index(index, self.length.get())?;
        self.check_for_change("remove_at")?;
        let removed = self.root.remove_at(self.offset + index)?;
        self.propagate(-1);
        Ok(removed)
    }

    pub fn remove_first(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        match self.index_of(value)? {
            Some(index) => {
                self.remove_at(index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_range(&self, from: usize, to: usize) -> SequenceResult<()> {
        check_range(from, to, self.length.get())?;
        self.check_for_change("remove_range")?;
        self.root.remove_range(self.offset + from, self.offset + to)?;
        self.propagate(-((to - from) as isize));
        Ok(())
    }

    pub fn clear(&self) -> SequenceResult<()> {
        self.remove_range(0, self.length.get())
    }

    pub fn add_all<I>(&self, items: I) -> SequenceResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        self.insert_all(self.length.get(), items)
    }

    pub fn insert_all<I>(&self, index: usize, items: I) -> SequenceResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        check_position(index, self.length.get())?;
        let incoming: Vec<T> = items.into_iter().collect();
        if incoming.is_empty() {
            return Ok(false);
        }
        self.check_for_change("insert_all")?;
        let added = incoming.len() as isize;
        self.root.insert_all(self.offset + index, incoming)?;
        self.propagate(added);
        Ok(true)
    }

    // Bulk mutations over the window

    pub fn remove_if<P>(&self, predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.check_for_change("remove_if")?;
        let removed = self.root.remove_if_within(predicate, self.offset, self.end())?;
        if removed > 0 {
            self.propagate(-(removed as isize));
        }
        Ok(removed)
    }

    pub fn try_remove_where<E, F>(&self, judge: F) -> Result<usize, E>
    where
        E: From<SequenceError>,
        F: FnMut(&T) -> Result<bool, E>,
    {
        self.check_for_change("remove_where")?;
        let (removed, failure) = self.root.try_remove_within(judge, self.offset, self.end())?;
        if removed > 0 {
            self.propagate(-(removed as isize));
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(removed),
        }
    }

    pub fn remove_all(&self, values: &[T]) -> SequenceResult<usize>
    where
        T: PartialEq,
    {
        self.try_remove_where(|item| Ok::<_, SequenceError>(values.contains(item)))
    }

    pub fn retain_all(&self, values: &[T]) -> SequenceResult<usize>
    where
        T: PartialEq,
    {
        self.try_remove_where(|item| Ok::<_, SequenceError>(!values.contains(item)))
    }

    pub fn replace_all<F>(&self, operator: F) -> SequenceResult<()>
    where
        F: FnMut(&T) -> T,
    {
        self.check_for_change("replace_all")?;
        self.root.replace_all_within(operator, self.offset, self.end())?;
        self.propagate(0);
        Ok(())
    }

    pub fn sort_by<F>(&self, compare: F) -> SequenceResult<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.check_for_change("sort_by")?;
        self.root.sort_within(compare, self.offset, self.end())?;
        self.propagate(0);
        Ok(())
    }

    pub fn for_each<F>(&self, action: F) -> SequenceResult<()>
    where
        F: FnMut(&T),
    {
        self.check_for_change("for_each")?;
        self.root.for_each_within(action, self.offset, self.end())
    }

    // Searches

    pub fn index_of(&self, value: &T) -> SequenceResult<Option<usize>>
    where
        T: PartialEq,
    {
        self.check_for_change("index_of")?;
        Ok(self
            .root
            .index_of_within(value, self.offset, self.end())
            .map(|index| index - self.offset))
    }

    pub fn last_index_of(&self, value: &T) -> SequenceResult<Option<usize>>
    where
        T: PartialEq,
    {
        self.check_for_change("last_index_of")?;
        Ok(self
            .root
            .last_index_of_within(value, self.offset, self.end())
            .map(|index| index - self.offset))
    }

    pub fn contains(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        Ok(self.index_of(value)?.is_some())
    }

    // Nested view; its mutations flow back through this one
    pub fn sub_range(&self, from: usize, to: usize) -> SequenceResult<SubRangeView<'_, T>> {
        check_range(from, to, self.length.get())?;
        self.check_for_change("sub_range")?;
        Ok(SubRangeView {
            root: self.root,
            parent: Some(self),
            offset: self.offset + from,
            length: Cell::new(to - from),
            expected: Cell::new(self.expected.get()),
        })
    }
}

impl<T: Clone> SubRangeView<'_, T> {
    pub fn get(&self, index: usize) -> SequenceResult<T> {
        self.read_at(index, T::clone)
    }

    pub fn to_vec(&self) -> SequenceResult<Vec<T>> {
        self.check_for_change("to_vec")?;
        self.root.to_vec_within(self.offset, self.end())
    }

    pub fn iter(&self) -> SequenceResult<FailFastCursor<'_, T>> {
        self.list_cursor(0)
    }

    pub fn list_cursor(&self, index: usize) -> SequenceResult<FailFastCursor<'_, T>> {
        check_position(index, self.length.get())?;
        self.check_for_change("iter")?;
        Ok(FailFastCursor::over_view(self, index))
    }

    pub fn splitter(&self) -> SplittableCursor<'_, T> {
        SplittableCursor::over_view(self)
    }
}

impl<T: Clone> Backing<T> for SubRangeView<'_, T> {
    #[inline]
    fn visible_len(&self) -> usize {
        self.length.get()
    }

    fn checked_len(&self, operation: &'static str) -> SequenceResult<usize> {
        self.check_for_change(operation)?;
        Ok(self.length.get())
    }

    #[inline]
    fn root_change_count(&self) -> usize {
        self.root.change_count()
    }

    fn peek_slot(&self, index: usize) -> Option<T> {
        self.root.peek(self.offset + index)
    }

    fn remove_slot(&self, index: usize) -> SequenceResult<T> {
        self.remove_at(index)
    }

    fn replace_slot(&self, index: usize, value: T) -> SequenceResult<T> {
        self.set(index, value)
    }

    fn insert_slot(&self, index: usize, value: T) -> SequenceResult<()> {
        self.insert(index, value)
    }
}

impl<T: Clone> Sequence<T> for SubRangeView<'_, T> {
    type Cursor<'c> = FailFastCursor<'c, T> where Self: 'c;
    type Splitter<'c> = SplittableCursor<'c, T> where Self: 'c;

    fn size(&self) -> SequenceResult<usize> {
        self.len()
    }

    fn get(&self, index: usize) -> SequenceResult<T> {
        SubRangeView::get(self, index)
    }

    fn set(&self, index: usize, value: T) -> SequenceResult<T> {
        SubRangeView::set(self, index, value)
    }

    fn insert(&self, index: usize, value: T) -> SequenceResult<()> {
        SubRangeView::insert(self, index, value)
    }

    fn remove_at(&self, index: usize) -> SequenceResult<T> {
        SubRangeView::remove_at(self, index)
    }

    fn append(&self, value: T) -> SequenceResult<()> {
        SubRangeView::append(self, value)
    }

    fn clear(&self) -> SequenceResult<()> {
        SubRangeView::clear(self)
    }

    fn cursor(&self) -> SequenceResult<FailFastCursor<'_, T>> {
        self.iter()
    }

    fn splitter(&self) -> SequenceResult<SplittableCursor<'_, T>> {
        Ok(SubRangeView::splitter(self))
    }

    fn contains(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        SubRangeView::contains(self, value)
    }

    fn to_vec(&self) -> SequenceResult<Vec<T>> {
        SubRangeView::to_vec(self)
    }

    fn remove_matching<P>(&self, predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.remove_if(predicate)
    }
}

impl<T: Debug> Debug for SubRangeView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubRangeView")
            .field("offset", &self.offset)
            .field("length", &self.length.get())
            .field("expected", &self.expected.get())
            .field("nested", &self.parent.is_some())
            .finish()
    }
}
