pub mod cursor;
pub mod parallel;
pub mod view;

use self::{
    cursor::{SnapshotCursor, SnapshotSplitter},
    parallel::SnapshotParIter,
    view::CowSubRangeView,
};
use super::{
    capability::Sequence,
    errors::{
        SequenceError,
        check_index,
        check_position,
        check_range,
    },
    exclusive::write_elements,
    result::SequenceResult,
};
use arc_swap::ArcSwap;
use parking_lot::ReentrantMutex;
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
    sync::Arc,
};
use tracing::{trace, warn};

/// Thread-safe sequence with snapshot reads.
///
/// The current contents live in an immutable `Arc<Vec<T>>` published through
/// an [`ArcSwap`]. Reads load the published array without locking and always
/// see one complete state. Every mutation takes a single writer lock, builds
/// a new array and publishes it atomically, so a cursor taken before a write
/// keeps iterating the array it started on.
///
/// Bulk operations that run caller code (`remove_if`, `try_remove_where`,
/// `replace_all`, `sort_by`) hold the writer lock for their whole duration.
/// The lock is reentrant: a callback that mutates the same sequence does not
/// deadlock, but the outer operation notices the array it was working on is
/// no longer the published one and fails with
/// [`SequenceError::ConcurrentStructuralChange`] instead of publishing a
/// stale result.
pub struct CopyOnWriteSequence<T> {
    published: ArcSwap<Vec<T>>,
    write_lock: ReentrantMutex<()>,
}

impl<T> CopyOnWriteSequence<T> {
    // Constructors

    pub fn new() -> Self {
        Self::from_snapshot(Arc::new(Vec::new()))
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_snapshot(Arc::new(items))
    }

    pub(crate) fn from_snapshot(snapshot: Arc<Vec<T>>) -> Self {
        Self {
            published: ArcSwap::new(snapshot),
            write_lock: ReentrantMutex::new(()),
        }
    }

    // Lock-free reads

    // Zero-copy handle to the array published right now
    #[inline]
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.published.load_full()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.published.load().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_at<R, F>(&self, index: usize, reader: F) -> SequenceResult<R>
    where
        F: FnOnce(&T) -> R,
    {
        let current = self.published.load();
        check_index(index, current.len())?;
        Ok(reader(&current[index]))
    }

    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.index_of_from(value, 0)
    }

    // First match at or after `from`; a start past the end finds nothing
    pub fn index_of_from(&self, value: &T, from: usize) -> Option<usize>
    where
        T: PartialEq,
    {
        let current = self.published.load();
        current
            .get(from..)?
            .iter()
            .position(|item| item == value)
            .map(|position| position + from)
    }

    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.published.load().iter().rposition(|item| item == value)
    }

    // Last match at or before `index`, searching backwards
    pub fn last_index_of_before(&self, value: &T, index: usize) -> SequenceResult<Option<usize>>
    where
        T: PartialEq,
    {
        let current = self.published.load();
        check_index(index, current.len())?;
        Ok(current[..=index].iter().rposition(|item| item == value))
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.published.load().contains(value)
    }

    // Runs over the snapshot taken at the call; writers are never blocked
    pub fn for_each<F>(&self, action: F)
    where
        F: FnMut(&T),
    {
        self.published.load_full().iter().for_each(action);
    }

    // Write path

    // Runs `rewrite` under the writer lock against the live array and publishes
    // the array it returns, if any. `expected` pins the array a view last saw.
    // The live array is compared again after `rewrite`, which catches callbacks
    // that published through a reentrant lock acquisition.
    pub(crate) fn commit<R, E, F>(
        &self,
        operation: &'static str,
        expected: Option<&Arc<Vec<T>>>,
        rewrite: F,
    ) -> Result<(Arc<Vec<T>>, R), E>
    where
        E: From<SequenceError>,
        F: FnOnce(&Arc<Vec<T>>) -> Result<(Option<Vec<T>>, R), E>,
    {
        let _guard = self.write_lock.lock();
        let current = self.published.load_full();
        if let Some(expected) = expected {
            if !Arc::ptr_eq(&current, expected) {
                warn!(operation, "copy-on-write view invalidated by a root change");
                return Err(SequenceError::interference(operation).into());
            }
        }
        let (next, outcome) = rewrite(&current)?;
        if !Arc::ptr_eq(&*self.published.load(), &current) {
            warn!(operation, "sequence republished while a callback held the writer lock");
            return Err(SequenceError::interference(operation).into());
        }
        let published = match next {
            Some(items) => {
                trace!(operation, from = current.len(), to = items.len(), "publishing snapshot");
                let next = Arc::new(items);
                self.published.store(Arc::clone(&next));
                next
            }
            None => current,
        };
        Ok((published, outcome))
    }

    fn apply<R, F>(&self, operation: &'static str, rewrite: F) -> SequenceResult<R>
    where
        F: FnOnce(&Arc<Vec<T>>) -> SequenceResult<(Option<Vec<T>>, R)>,
    {
        self.commit(operation, None, rewrite).map(|(_, outcome)| outcome)
    }

    pub(crate) fn lock_writes(&self) -> parking_lot::ReentrantMutexGuard<'_, ()> {
        self.write_lock.lock()
    }

    pub fn sub_range(&self, from: usize, to: usize) -> SequenceResult<CowSubRangeView<'_, T>> {
        let current = self.published.load_full();
        check_range(from, to, current.len())?;
        Ok(CowSubRangeView::over(self, current, from, to - from))
    }

    pub fn iter(&self) -> SnapshotCursor<T> {
        let snapshot = self.snapshot();
        let end = snapshot.len();
        SnapshotCursor::over(snapshot, 0, end, 0)
    }

    pub fn list_cursor(&self, index: usize) -> SequenceResult<SnapshotCursor<T>> {
        let snapshot = self.snapshot();
        let end = snapshot.len();
        check_position(index, end)?;
        Ok(SnapshotCursor::over(snapshot, 0, end, index))
    }

    pub fn splitter(&self) -> SnapshotSplitter<T> {
        let snapshot = self.snapshot();
        let end = snapshot.len();
        SnapshotSplitter::over(snapshot, 0, end)
    }
}

impl<T: Clone> CopyOnWriteSequence<T> {
    pub fn get(&self, index: usize) -> SequenceResult<T> {
        self.read_at(index, T::clone)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.published.load().to_vec()
    }

    pub fn par_iter(&self) -> SnapshotParIter<T>
    where
        T: Send + Sync,
    {
        SnapshotParIter::over(self.snapshot())
    }

    // Always copies and republishes, even when the new value equals the old one
    pub fn set(&self, index: usize, value: T) -> SequenceResult<T> {
        self.apply("set", |current| {
            check_index(index, current.len())?;
            let mut items = Vec::clone(current);
            let old = std::mem::replace(&mut items[index], value);
            Ok((Some(items), old))
        })
    }

    pub fn append(&self, value: T) -> SequenceResult<()> {
        self.apply("append", |current| {
            let mut items = Vec::with_capacity(current.len() + 1);
            items.extend_from_slice(current);
            items.push(value);
            Ok((Some(items), ()))
        })
    }

    pub fn insert(&self, index: usize, value: T) -> SequenceResult<()> {
        self.apply("insert", |current| {
            check_position(index, current.len())?;
            Ok((Some(spliced(current, index, index, [value])), ()))
        })
    }

    pub fn remove_at(&self, index: usize) -> SequenceResult<T> {
        self.apply("remove_at", |current| {
            check_index(index, current.len())?;
            let removed = current[index].clone();
            Ok((Some(spliced(current, index, index + 1, [])), removed))
        })
    }

    // Searches a private snapshot first. The removal re-checks the live array
    // once under the lock and searches it again only if a writer got in between.
    pub fn remove_first(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        let snapshot = self.snapshot();
        let Some(found) = snapshot.iter().position(|item| item == value) else {
            return Ok(false);
        };
        self.apply("remove_first", |current| {
            let index = if Arc::ptr_eq(current, &snapshot) {
                Some(found)
            } else {
                current.iter().position(|item| item == value)
            };
            match index {
                Some(index) => Ok((Some(spliced(current, index, index + 1, [])), true)),
                None => Ok((None, false)),
            }
        })
    }

    pub fn add_if_absent(&self, value: T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        let snapshot = self.snapshot();
        if snapshot.contains(&value) {
            return Ok(false);
        }
        self.apply("add_if_absent", |current| {
            if !Arc::ptr_eq(current, &snapshot) && current.contains(&value) {
                return Ok((None, false));
            }
            let end = current.len();
            Ok((Some(spliced(current, end, end, [value])), true))
        })
    }

    // Appends, in order, every item not yet present; duplicates inside
    // `items` are added once. Returns how many were added.
    pub fn add_all_absent<I>(&self, items: I) -> SequenceResult<usize>
    where
        T: PartialEq,
        I: IntoIterator<Item = T>,
    {
        let incoming: Vec<T> = items.into_iter().collect();
        if incoming.is_empty() {
            return Ok(0);
        }
        self.apply("add_all_absent", |current| {
            let mut fresh: Vec<T> = Vec::with_capacity(incoming.len());
            for item in incoming {
                if !current.contains(&item) && !fresh.contains(&item) {
                    fresh.push(item);
                }
            }
            if fresh.is_empty() {
                return Ok((None, 0));
            }
            let added = fresh.len();
            let end = current.len();
            Ok((Some(spliced(current, end, end, fresh)), added))
        })
    }

    pub fn add_all<I>(&self, items: I) -> SequenceResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let incoming: Vec<T> = items.into_iter().collect();
        if incoming.is_empty() {
            return Ok(false);
        }
        self.apply("add_all", |current| {
            let end = current.len();
            Ok((Some(spliced(current, end, end, incoming)), true))
        })
    }

    pub fn insert_all<I>(&self, index: usize, items: I) -> SequenceResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let incoming: Vec<T> = items.into_iter().collect();
        self.apply("insert_all", |current| {
            check_position(index, current.len())?;
            if incoming.is_empty() {
                return Ok((None, false));
            }
            Ok((Some(spliced(current, index, index, incoming)), true))
        })
    }

    pub fn remove_range(&self, from: usize, to: usize) -> SequenceResult<()> {
        self.apply("remove_range", |current| {
            check_range(from, to, current.len())?;
            if from == to {
                return Ok((None, ()));
            }
            Ok((Some(spliced(current, from, to, [])), ()))
        })
    }

    pub fn clear(&self) -> SequenceResult<()> {
        self.apply("clear", |_| Ok((Some(Vec::new()), ())))
    }

    // Bulk mutations; the callback runs under the writer lock

    pub fn remove_if<P>(&self, mut predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.apply("remove_if", |current| {
            let end = current.len();
            filtered(current, 0, end, |item| Ok::<_, SequenceError>(predicate(item)))
        })
    }

    // A failing judgement leaves the published array untouched
    pub fn try_remove_where<E, F>(&self, judge: F) -> Result<usize, E>
    where
        E: From<SequenceError>,
        F: FnMut(&T) -> Result<bool, E>,
    {
        self.commit("remove_where", None, |current| {
            let end = current.len();
            filtered(current, 0, end, judge)
        })
        .map(|(_, removed)| removed)
    }

    pub fn remove_all(&self, values: &[T]) -> SequenceResult<usize>
    where
        T: PartialEq,
    {
        self.remove_if(|item| values.contains(item))
    }

    pub fn retain_all(&self, values: &[T]) -> SequenceResult<usize>
    where
        T: PartialEq,
    {
        self.remove_if(|item| !values.contains(item))
    }

    pub fn replace_all<F>(&self, operator: F) -> SequenceResult<()>
    where
        F: FnMut(&T) -> T,
    {
        self.apply("replace_all", |current| {
            let end = current.len();
            Ok((Some(replaced(current, 0, end, operator)), ()))
        })
    }

    pub fn sort_by<F>(&self, compare: F) -> SequenceResult<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.apply("sort_by", |current| {
            let end = current.len();
            Ok((Some(sorted(current, 0, end, compare)), ()))
        })
    }

    pub fn sort(&self) -> SequenceResult<()>
    where
        T: Ord,
    {
        self.sort_by(T::cmp)
    }
}

// Array builders shared with the sub-range view. Each returns a fresh array
// and leaves the published one alone. Ranges are absolute and pre-validated.

// Copy of `current` with `[from, to)` replaced by `insert`, in one allocation
pub(crate) fn spliced<T, I>(current: &[T], from: usize, to: usize, insert: I) -> Vec<T>
where
    T: Clone,
    I: IntoIterator<Item = T>,
{
    let insert = insert.into_iter();
    let mut items = Vec::with_capacity(current.len() - (to - from) + insert.size_hint().0);
    items.extend_from_slice(&current[..from]);
    items.extend(insert);
    items.extend_from_slice(&current[to..]);
    items
}

// Survivors of `[from, end)` plus the untouched rest, and the removal count.
// Returns no array when nothing matched.
pub(crate) fn filtered<T, E, F>(
    current: &[T],
    from: usize,
    end: usize,
    mut judge: F,
) -> Result<(Option<Vec<T>>, usize), E>
where
    T: Clone,
    F: FnMut(&T) -> Result<bool, E>,
{
    let window = &current[from..end];
    let mut first = None;
    for (position, item) in window.iter().enumerate() {
        if judge(item)? {
            first = Some(position);
            break;
        }
    }
    let Some(first) = first else {
        return Ok((None, 0));
    };
    let mut items = Vec::with_capacity(current.len() - 1);
    items.extend_from_slice(&current[..from + first]);
    for item in &window[first + 1..] {
        if !judge(item)? {
            items.push(item.clone());
        }
    }
    let kept = items.len() - from;
    items.extend_from_slice(&current[end..]);
    Ok((Some(items), window.len() - kept))
}

pub(crate) fn replaced<T, F>(current: &[T], from: usize, end: usize, mut operator: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T) -> T,
{
    let mut items = Vec::with_capacity(current.len());
    items.extend_from_slice(&current[..from]);
    items.extend(current[from..end].iter().map(&mut operator));
    items.extend_from_slice(&current[end..]);
    items
}

pub(crate) fn sorted<T, F>(current: &[T], from: usize, end: usize, compare: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut items = current.to_vec();
    items[from..end].sort_by(compare);
    items
}

impl<T: Clone> Sequence<T> for CopyOnWriteSequence<T> {
    type Cursor<'c> = SnapshotCursor<T> where Self: 'c;
    type Splitter<'c> = SnapshotSplitter<T> where Self: 'c;

    fn size(&self) -> SequenceResult<usize> {
        Ok(self.len())
    }

    fn get(&self, index: usize) -> SequenceResult<T> {
        CopyOnWriteSequence::get(self, index)
    }

    fn set(&self, index: usize, value: T) -> SequenceResult<T> {
        CopyOnWriteSequence::set(self, index, value)
    }

    fn insert(&self, index: usize, value: T) -> SequenceResult<()> {
        CopyOnWriteSequence::insert(self, index, value)
    }

    fn remove_at(&self, index: usize) -> SequenceResult<T> {
        CopyOnWriteSequence::remove_at(self, index)
    }

    fn append(&self, value: T) -> SequenceResult<()> {
        CopyOnWriteSequence::append(self, value)
    }

    fn clear(&self) -> SequenceResult<()> {
        CopyOnWriteSequence::clear(self)
    }

    fn cursor(&self) -> SequenceResult<SnapshotCursor<T>> {
        Ok(self.iter())
    }

    fn splitter(&self) -> SequenceResult<SnapshotSplitter<T>> {
        Ok(CopyOnWriteSequence::splitter(self))
    }

    fn contains(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        Ok(CopyOnWriteSequence::contains(self, value))
    }

    fn to_vec(&self) -> SequenceResult<Vec<T>> {
        Ok(CopyOnWriteSequence::to_vec(self))
    }

    fn remove_matching<P>(&self, predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.remove_if(predicate)
    }
}

// Value semantics

impl<T> Default for CopyOnWriteSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Shares the published array; the clone gets its own writer lock
impl<T> Clone for CopyOnWriteSequence<T> {
    fn clone(&self) -> Self {
        Self::from_snapshot(self.snapshot())
    }
}

impl<T: PartialEq> PartialEq for CopyOnWriteSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        let (left, right) = (self.snapshot(), other.snapshot());
        Arc::ptr_eq(&left, &right) || left == right
    }
}

impl<T: Eq> Eq for CopyOnWriteSequence<T> {}

impl<T: Hash> Hash for CopyOnWriteSequence<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.published.load().hash(state);
    }
}

impl<T: Debug> Debug for CopyOnWriteSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.published.load().iter()).finish()
    }
}

impl<T: Display> Display for CopyOnWriteSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_elements(f, self.published.load().iter())
    }
}

impl<T> From<Vec<T>> for CopyOnWriteSequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T> FromIterator<T> for CopyOnWriteSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
