use super::{
    CopyOnWriteSequence,
    cursor::{SnapshotCursor, SnapshotSplitter},
    filtered,
    replaced,
    sorted,
    spliced,
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
use arc_swap::ArcSwap;
use std::{
    cmp::Ordering,
    fmt::{self, Debug},
    sync::Arc,
};
use tracing::warn;

// Window - what a view knows about its root: the array it last saw and its own length
struct Window<T> {
    expected: Arc<Vec<T>>,
    length: usize,
}

// CowSubRangeView - live window over a copy-on-write sequence
//
// Reads re-load the root's published array and require it to be the very
// array recorded after the view's last own mutation. Any other writer
// invalidates the view. Mutations go through the root's writer lock and then
// record the newly published array here and in every enclosing view.
pub struct CowSubRangeView<'a, T> {
    root: &'a CopyOnWriteSequence<T>,
    parent: Option<&'a CowSubRangeView<'a, T>>,
    offset: usize,
    window: ArcSwap<Window<T>>,
}

impl<'a, T> CowSubRangeView<'a, T> {
    pub(crate) fn over(
        root: &'a CopyOnWriteSequence<T>,
        expected: Arc<Vec<T>>,
        offset: usize,
        length: usize,
    ) -> Self {
        Self {
            root,
            parent: None,
            offset,
            window: ArcSwap::from_pointee(Window { expected, length }),
        }
    }

    // Current window, after checking the root still publishes the array it expects
    fn validated(&self, operation: &'static str) -> SequenceResult<Arc<Window<T>>> {
        let window = self.window.load_full();
        self.check_live(&window, operation)?;
        Ok(window)
    }

    // Callers bounds-check against `window` first and index only `window.expected`
    fn check_live(&self, window: &Window<T>, operation: &'static str) -> SequenceResult<()> {
        let live = self.root.published.load();
        if !Arc::ptr_eq(&*live, &window.expected) {
            warn!(operation, offset = self.offset, "copy-on-write view invalidated by a root change");
            return Err(SequenceError::interference(operation));
        }
        Ok(())
    }

    // Records `published` in this view and every ancestor, adjusting lengths by `delta`
    fn propagate(&self, published: &Arc<Vec<T>>, delta: isize) {
        let mut view = Some(self);
        while let Some(current) = view {
            let length = current.window.load().length.wrapping_add_signed(delta);
            current.window.store(Arc::new(Window {
                expected: Arc::clone(published),
                length,
            }));
            view = current.parent;
        }
    }

    // Runs one mutation of the window under the root's writer lock. The index
    // check sees the window length before the root is consulted.
    fn mutate<R, E, C, F>(&self, operation: &'static str, check: C, rewrite: F) -> Result<R, E>
    where
        E: From<SequenceError>,
        C: FnOnce(usize) -> SequenceResult<()>,
        F: FnOnce(&[T], usize, usize) -> Result<(Option<Vec<T>>, R, isize), E>,
    {
        let _guard = self.root.lock_writes();
        let window = self.window.load_full();
        check(window.length)?;
        let (offset, end) = (self.offset, self.offset + window.length);
        let mut delta = 0;
        let (published, outcome) = self.root.commit::<_, E, _>(operation, Some(&window.expected), |current| {
            let (next, outcome, change) = rewrite(current.as_slice(), offset, end)?;
            delta = change;
            Ok((next, outcome))
        })?;
        self.propagate(&published, delta);
        Ok(outcome)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> SequenceResult<usize> {
        Ok(self.validated("len")?.length)
    }

    pub fn is_empty(&self) -> SequenceResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn read_at<R, F>(&self, index: usize, reader: F) -> SequenceResult<R>
    where
        F: FnOnce(&T) -> R,
    {
        let window = self.window.load_full();
        check_index(index, window.length)?;
        self.check_live(&window, "read_at")?;
        Ok(reader(&window.expected[self.offset + index]))
    }

    pub fn index_of(&self, value: &T) -> SequenceResult<Option<usize>>
    where
        T: PartialEq,
    {
        let window = self.validated("index_of")?;
        let end = self.offset + window.length;
        Ok(window.expected[self.offset..end].iter().position(|item| item == value))
    }

    pub fn last_index_of(&self, value: &T) -> SequenceResult<Option<usize>>
    where
        T: PartialEq,
    {
        let window = self.validated("last_index_of")?;
        let end = self.offset + window.length;
        Ok(window.expected[self.offset..end].iter().rposition(|item| item == value))
    }

    pub fn contains(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        Ok(self.index_of(value)?.is_some())
    }

    pub fn for_each<F>(&self, action: F) -> SequenceResult<()>
    where
        F: FnMut(&T),
    {
        let window = self.validated("for_each")?;
        let end = self.offset + window.length;
        window.expected[self.offset..end].iter().for_each(action);
        Ok(())
    }

    pub fn iter(&self) -> SequenceResult<SnapshotCursor<T>> {
        self.list_cursor(0)
    }

    pub fn list_cursor(&self, index: usize) -> SequenceResult<SnapshotCursor<T>> {
        let window = self.window.load_full();
        check_position(index, window.length)?;
        self.check_live(&window, "iter")?;
        let end = self.offset + window.length;
        Ok(SnapshotCursor::over(
            Arc::clone(&window.expected),
            self.offset,
            end,
            self.offset + index,
        ))
    }

    pub fn splitter(&self) -> SequenceResult<SnapshotSplitter<T>> {
        let window = self.validated("splitter")?;
        let end = self.offset + window.length;
        Ok(SnapshotSplitter::over(Arc::clone(&window.expected), self.offset, end))
    }

    // Nested view; its mutations are recorded in this one as well
    pub fn sub_range(&self, from: usize, to: usize) -> SequenceResult<CowSubRangeView<'_, T>> {
        let window = self.window.load_full();
        check_range(from, to, window.length)?;
        self.check_live(&window, "sub_range")?;
        Ok(CowSubRangeView {
            root: self.root,
            parent: Some(self),
            offset: self.offset + from,
            window: ArcSwap::from_pointee(Window {
                expected: Arc::clone(&window.expected),
                length: to - from,
            }),
        })
    }
}

impl<T: Clone> CowSubRangeView<'_, T> {
    pub fn get(&self, index: usize) -> SequenceResult<T> {
        self.read_at(index, T::clone)
    }

    pub fn to_vec(&self) -> SequenceResult<Vec<T>> {
        let window = self.validated("to_vec")?;
        Ok(window.expected[self.offset..self.offset + window.length].to_vec())
    }

    pub fn set(&self, index: usize, value: T) -> SequenceResult<T> {
        self.mutate(
            "set",
            |length| check_index(index, length),
            |current, offset, _| {
                let mut items = current.to_vec();
                let old = std::mem::replace(&mut items[offset + index], value);
                Ok((Some(items), old, 0))
            },
        )
    }

    pub fn insert(&self, index: usize, value: T) -> SequenceResult<()> {
        self.mutate(
            "insert",
            |length| check_position(index, length),
            |current, offset, _| {
                let at = offset + index;
                Ok((Some(spliced(current, at, at, [value])), (), 1))
            },
        )
    }

    pub fn append(&self, value: T) -> SequenceResult<()> {
        self.mutate(
            "append",
            |_| Ok(()),
            |current, _, end| Ok((Some(spliced(current, end, end, [value])), (), 1)),
        )
    }

    pub fn remove_at(&self, index: usize) -> SequenceResult<T> {
        self.mutate(
            "remove_at",
            |length| check_index(index, length),
            |current, offset, _| {
                let at = offset + index;
                let removed = current[at].clone();
                Ok((Some(spliced(current, at, at + 1, [])), removed, -1))
            },
        )
    }

    pub fn add_all<I>(&self, items: I) -> SequenceResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let incoming: Vec<T> = items.into_iter().collect();
        if incoming.is_empty() {
            // still reports a stale view
            self.validated("add_all")?;
            return Ok(false);
        }
        let added = incoming.len() as isize;
        self.mutate(
            "add_all",
            |_| Ok(()),
            |current, _, end| Ok((Some(spliced(current, end, end, incoming)), true, added)),
        )
    }

    pub fn remove_range(&self, from: usize, to: usize) -> SequenceResult<()> {
        self.mutate(
            "remove_range",
            |length| check_range(from, to, length),
            |current, offset, _| {
                if from == to {
                    return Ok((None, (), 0));
                }
                let removed = (to - from) as isize;
                Ok((Some(spliced(current, offset + from, offset + to, [])), (), -removed))
            },
        )
    }

    pub fn clear(&self) -> SequenceResult<()> {
        self.mutate(
            "clear",
            |_| Ok(()),
            |current, offset, end| {
                if offset == end {
                    return Ok((None, (), 0));
                }
                let removed = (end - offset) as isize;
                Ok((Some(spliced(current, offset, end, [])), (), -removed))
            },
        )
    }

    pub fn remove_if<P>(&self, mut predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.mutate(
            "remove_if",
            |_| Ok(()),
            |current, offset, end| {
                let (next, removed) =
                    filtered(current, offset, end, |item| Ok::<_, SequenceError>(predicate(item)))?;
                Ok((next, removed, -(removed as isize)))
            },
        )
    }

    pub fn replace_all<F>(&self, operator: F) -> SequenceResult<()>
    where
        F: FnMut(&T) -> T,
    {
        self.mutate(
            "replace_all",
            |_| Ok(()),
            |current, offset, end| Ok((Some(replaced(current, offset, end, operator)), (), 0)),
        )
    }

    pub fn sort_by<F>(&self, compare: F) -> SequenceResult<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.mutate(
            "sort_by",
            |_| Ok(()),
            |current, offset, end| Ok((Some(sorted(current, offset, end, compare)), (), 0)),
        )
    }
}

impl<T: Clone> Sequence<T> for CowSubRangeView<'_, T> {
    type Cursor<'c> = SnapshotCursor<T> where Self: 'c;
    type Splitter<'c> = SnapshotSplitter<T> where Self: 'c;

    fn size(&self) -> SequenceResult<usize> {
        self.len()
    }

    fn get(&self, index: usize) -> SequenceResult<T> {
        CowSubRangeView::get(self, index)
    }

    fn set(&self, index: usize, value: T) -> SequenceResult<T> {
        CowSubRangeView::set(self, index, value)
    }

    fn insert(&self, index: usize, value: T) -> SequenceResult<()> {
        CowSubRangeView::insert(self, index, value)
    }

    fn remove_at(&self, index: usize) -> SequenceResult<T> {
        CowSubRangeView::remove_at(self, index)
    }

    fn append(&self, value: T) -> SequenceResult<()> {
        CowSubRangeView::append(self, value)
    }

    fn clear(&self) -> SequenceResult<()> {
        CowSubRangeView::clear(self)
    }

    fn cursor(&self) -> SequenceResult<SnapshotCursor<T>> {
        self.iter()
    }

    fn splitter(&self) -> SequenceResult<SnapshotSplitter<T>> {
        CowSubRangeView::splitter(self)
    }

    fn contains(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        CowSubRangeView::contains(self, value)
    }

    fn to_vec(&self) -> SequenceResult<Vec<T>> {
        CowSubRangeView::to_vec(self)
    }

    fn remove_matching<P>(&self, predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.remove_if(predicate)
    }
}

impl<T> Debug for CowSubRangeView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CowSubRangeView")
            .field("offset", &self.offset)
            .field("length", &self.window.load().length)
            .field("nested", &self.parent.is_some())
            .finish()
    }
}
