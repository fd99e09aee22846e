pub mod cursor;
pub mod splitter;
pub mod view;

use self::{
    cursor::FailFastCursor,
    splitter::SplittableCursor,
    view::SubRangeView,
};
use super::{
    capability::Sequence,
    config::SequenceConfig,
    errors::{
        SequenceError,
        check_index,
        check_position,
        check_range,
    },
    growth::GrowthPolicy,
    model::SequenceStats,
    result::SequenceResult,
};
use bitvec::vec::BitVec;
use std::{
    cell::{Cell, RefCell, RefMut},
    cmp::Ordering,
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
};
use tracing::{debug, warn};

// Store - owned element buffer plus capacity bookkeeping
//
// `items.len()` is the logical length. `capacity` is the planned capacity the
// growth policy works with; the Vec is always reserved to at least that much.

struct Store<T> {
    items: Vec<T>,
    capacity: usize,
    lazily_sized: bool,
    policy: GrowthPolicy,
    growth_count: usize,
    copied_elements: usize,
}

impl<T> Store<T> {
    fn lazy(policy: GrowthPolicy) -> Self {
        Self {
            items: Vec::new(),
            capacity: 0,
            lazily_sized: true,
            policy,
            growth_count: 0,
            copied_elements: 0,
        }
    }

    fn allocate(policy: GrowthPolicy, capacity: usize) -> SequenceResult<Self> {
        let mut store = Self::lazy(policy);
        store.lazily_sized = false;
        if capacity > 0 {
            if capacity > policy.max_capacity() {
                return Err(SequenceError::AllocationLimitExceeded {
                    requested: capacity,
                    limit: policy.max_capacity(),
                });
            }
            store.resize_storage(capacity)?;
        }
        Ok(store)
    }

    // Capacity is derived from the adopted length alone
    fn adopt(policy: GrowthPolicy, mut items: Vec<T>) -> Self {
        items.shrink_to_fit();
        Self {
            capacity: items.len(),
            items,
            lazily_sized: false,
            policy,
            growth_count: 0,
            copied_elements: 0,
        }
    }

    fn reserve(&mut self, additional: usize) -> SequenceResult<()> {
        let required = self.items.len().checked_add(additional).ok_or(
            SequenceError::AllocationLimitExceeded {
                requested: usize::MAX,
                limit: self.policy.max_capacity(),
            },
        )?;
        if required > self.capacity {
            self.grow(required)?;
        }
        Ok(())
    }

    fn grow(&mut self, min_required: usize) -> SequenceResult<()> {
        let target = self
            .policy
            .new_capacity(self.capacity, min_required, self.lazily_sized)?;
        self.resize_storage(target)?;
        self.lazily_sized = false;
        self.growth_count += 1;
        self.copied_elements += self.items.len();
        Ok(())
    }

    fn resize_storage(&mut self, target: usize) -> SequenceResult<()> {
        let additional = target.saturating_sub(self.items.len());
        self.items
            .try_reserve_exact(additional)
            .map_err(|_| SequenceError::AllocationLimitExceeded {
                requested: target,
                limit: self.policy.max_capacity(),
            })?;
        debug!(
            from = self.capacity,
            to = target,
            length = self.items.len(),
            "sequence storage resized"
        );
        self.capacity = target;
        Ok(())
    }

    fn compact(&mut self) -> bool {
        if self.items.len() >= self.capacity {
            return false;
        }
        self.items.shrink_to_fit();
        debug!(from = self.capacity, to = self.items.len(), "sequence storage compacted");
        self.capacity = self.items.len();
        self.lazily_sized = false;
        true
    }

    // Single sweep that drops every element whose bit is set in `doomed`,
    // where bit 0 corresponds to index `from`.
    fn expunge(&mut self, from: usize, doomed: &BitVec) {
        let end = from + doomed.len();
        let mut index = 0;
        self.items.retain(|_| {
            let keep = index < from || index >= end || !doomed[index - from];
            index += 1;
            keep
        });
    }
}

/// Growable array with single-owner semantics.
///
/// All operations take `&self`; the storage lives behind a `RefCell`, so the
/// sequence can be handed to cursors and sub-range views while it is still
/// being mutated directly. Every structural mutation (anything that changes
/// the count or the positions of elements) bumps a change counter. Cursors
/// and views compare that counter before each step and report
/// [`SequenceError::ConcurrentStructuralChange`] when it moved underneath
/// them.
///
/// The counter is a debugging aid, not a synchronization mechanism: it
/// catches the mutate-while-iterating pattern, nothing more. The type is
/// `Send` but not `Sync`, so sharing across threads requires wrapping it in
/// an external lock or using [`crate::CopyOnWriteSequence`] instead.
///
/// Callbacks (predicates, comparators, actions) run while the storage is
/// borrowed for reading. They may read the sequence; any attempt to mutate it
/// from inside the callback fails with `ConcurrentStructuralChange`.
pub struct ExclusiveSequence<T> {
    store: RefCell<Store<T>>,
    length: Cell<usize>,
    change_count: Cell<usize>,
}

impl<T> ExclusiveSequence<T> {
    // Constructors

    pub fn new() -> Self {
        Self::with_config(&SequenceConfig::default())
    }

    pub fn with_config(config: &SequenceConfig) -> Self {
        Self::from_store(Store::lazy(config.growth_policy::<T>()))
    }

    pub fn with_capacity(capacity: usize) -> SequenceResult<Self> {
        Self::with_capacity_and_config(capacity, &SequenceConfig::default())
    }

    pub fn with_capacity_and_config(capacity: usize, config: &SequenceConfig) -> SequenceResult<Self> {
        Store::allocate(config.growth_policy::<T>(), capacity).map(Self::from_store)
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_store(Store::adopt(GrowthPolicy::for_elements::<T>(), items))
    }

    pub fn from_vec_with_config(items: Vec<T>, config: &SequenceConfig) -> SequenceResult<Self> {
        let policy = config.growth_policy::<T>();
        if items.len() > policy.max_capacity() {
            return Err(SequenceError::AllocationLimitExceeded {
                requested: items.len(),
                limit: policy.max_capacity(),
            });
        }
        Ok(Self::from_store(Store::adopt(policy, items)))
    }

    fn from_store(store: Store<T>) -> Self {
        Self {
            length: Cell::new(store.items.len()),
            store: RefCell::new(store),
            change_count: Cell::new(0),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.store.into_inner().items
    }

    // Accessors

    #[inline]
    pub fn len(&self) -> usize {
        self.length.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn change_count(&self) -> usize {
        self.change_count.get()
    }

    pub fn capacity(&self) -> usize {
        self.store.borrow().capacity
    }

    pub fn growth_policy(&self) -> GrowthPolicy {
        self.store.borrow().policy
    }

    pub fn stats(&self) -> SequenceStats {
        let store = self.store.borrow();
        SequenceStats {
            length: store.items.len(),
            capacity: store.capacity,
            change_count: self.change_count(),
            growth_count: store.growth_count,
            copied_elements: store.copied_elements,
        }
    }

    // Mutation plumbing

    fn storage_mut(&self, operation: &'static str) -> SequenceResult<RefMut<'_, Store<T>>> {
        self.store.try_borrow_mut().map_err(|_| {
            warn!(operation, "mutation attempted while the sequence is being traversed");
            SequenceError::interference(operation)
        })
    }

    // Runs a structural mutation and bumps the change counter once it succeeded.
    // The counter wraps; only equality is ever compared.
    fn structural<R, F>(&self, operation: &'static str, mutation: F) -> SequenceResult<R>
    where
        F: FnOnce(&mut Store<T>) -> SequenceResult<R>,
    {
        let mut store = self.storage_mut(operation)?;
        let outcome = mutation(&mut store)?;
        self.length.set(store.items.len());
        self.change_count.set(self.change_count.get().wrapping_add(1));
        Ok(outcome)
    }

    // Reads

    pub fn read_at<R, F>(&self, index: usize, reader: F) -> SequenceResult<R>
    where
        F: FnOnce(&T) -> R,
    {
        check_index(index, self.len())?;
        let store = self.store.borrow();
        Ok(reader(&store.items[index]))
    }

    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.index_of_within(value, 0, self.len())
    }

    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.last_index_of_within(value, 0, self.len())
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    pub fn for_each<F>(&self, action: F)
    where
        F: FnMut(&T),
    {
        let store = self.store.borrow();
        store.items.iter().for_each(action);
    }

    pub(crate) fn with_items<R, F>(&self, reader: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        reader(&self.store.borrow().items)
    }

    // Element writes

    pub fn append(&self, value: T) -> SequenceResult<()> {
        self.structural("append", |store| {
            store.reserve(1)?;
            store.items.push(value);
            Ok(())
        })
    }

    pub fn insert(&self, index: usize, value: T) -> SequenceResult<()> {
        check_position(index, self.len())?;
        self.structural("insert", |store| {
            store.reserve(1)?;
            store.items.insert(index, value);
            Ok(())
        })
    }

    // Replacement at a fixed index is not structural
    pub fn set(&self, index: usize, value: T) -> SequenceResult<T> {
        check_index(index, self.len())?;
        let mut store = self.storage_mut("set")?;
        Ok(std::mem::replace(&mut store.items[index], value))
    }

    pub fn remove_at(&self, index: usize) -> SequenceResult<T> {
        check_index(index, self.len())?;
        self.structural("remove_at", |store| Ok(store.items.remove(index)))
    }

    // `None` stored in an `Option` sequence only matches a queried `None`,
    // which is exactly what `PartialEq` for `Option` gives.
    pub fn remove_first(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        match self.index_of(value) {
            Some(index) => {
                self.remove_at(index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_range(&self, from: usize, to: usize) -> SequenceResult<()> {
        check_range(from, to, self.len())?;
        self.structural("remove_range", |store| {
            store.items.drain(from..to);
            Ok(())
        })
    }

    pub fn clear(&self) -> SequenceResult<()> {
        self.structural("clear", |store| {
            store.items.clear();
            Ok(())
        })
    }

    pub fn add_all<I>(&self, items: I) -> SequenceResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let incoming: Vec<T> = items.into_iter().collect();
        self.structural("add_all", |store| {
            if incoming.is_empty() {
                return Ok(false);
            }
            store.reserve(incoming.len())?;
            store.items.extend(incoming);
            Ok(true)
        })
    }

    pub fn insert_all<I>(&self, index: usize, items: I) -> SequenceResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        check_position(index, self.len())?;
        let incoming: Vec<T> = items.into_iter().collect();
        self.structural("insert_all", |store| {
            if incoming.is_empty() {
                return Ok(false);
            }
            store.reserve(incoming.len())?;
            store.items.splice(index..index, incoming);
            Ok(true)
        })
    }

    // Bulk mutations

    pub fn remove_if<P>(&self, predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.remove_if_within(predicate, 0, self.len())
    }

    // Fallible membership test. On the first error the elements judged so far
    // are compacted, the unjudged tail stays in place, and the error is returned.
    pub fn try_remove_where<E, F>(&self, judge: F) -> Result<usize, E>
    where
        E: From<SequenceError>,
        F: FnMut(&T) -> Result<bool, E>,
    {
        let (removed, failure) = self.try_remove_within(judge, 0, self.len())?;
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
        self.replace_all_within(operator, 0, self.len())
    }

    pub fn sort_by<F>(&self, compare: F) -> SequenceResult<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.sort_within(compare, 0, self.len())
    }

    pub fn sort(&self) -> SequenceResult<()>
    where
        T: Ord,
    {
        self.sort_by(T::cmp)
    }

    // Capacity management, never structural

    pub fn compact(&self) -> SequenceResult<bool> {
        let mut store = self.storage_mut("compact")?;
        Ok(store.compact())
    }

    pub fn ensure_capacity(&self, min_capacity: usize) -> SequenceResult<()> {
        let mut store = self.storage_mut("ensure_capacity")?;
        let covered_by_default =
            store.lazily_sized && min_capacity <= store.policy.default_capacity();
        if min_capacity > store.capacity && !covered_by_default {
            store.grow(min_capacity)?;
        }
        Ok(())
    }

    // Traversal

    pub fn sub_range(&self, from: usize, to: usize) -> SequenceResult<SubRangeView<'_, T>> {
        check_range(from, to, self.len())?;
        Ok(SubRangeView::over(self, from, to - from))
    }

    // Range primitives shared with sub-range views. Indices are absolute.

    pub(crate) fn remove_if_within<P>(&self, mut predicate: P, from: usize, end: usize) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        let (start, doomed) = {
            let store = self.store.borrow();
            check_range(from, end, store.items.len())?;
            let items = &store.items[from..end];
            // First pass: most calls remove nothing and stop here
            let Some(first) = items.iter().position(|item| predicate(item)) else {
                return Ok(0);
            };
            // Second pass records victims; the predicate may still read the sequence
            let mut doomed: BitVec = BitVec::repeat(false, items.len() - first);
            doomed.set(0, true);
            for (offset, item) in items[first + 1..].iter().enumerate() {
                if predicate(item) {
                    doomed.set(offset + 1, true);
                }
            }
            (from + first, doomed)
        };
        let removed = doomed.count_ones();
        self.structural("remove_if", |store| {
            store.expunge(start, &doomed);
            Ok(removed)
        })
    }

    pub(crate) fn try_remove_within<E, F>(
        &self,
        mut judge: F,
        from: usize,
        end: usize,
    ) -> Result<(usize, Option<E>), E>
    where
        E: From<SequenceError>,
        F: FnMut(&T) -> Result<bool, E>,
    {
        let (doomed, failure) = {
            let store = self.store.borrow();
            check_range(from, end, store.items.len())?;
            let mut doomed: BitVec = BitVec::repeat(false, end - from);
            let mut failure = None;
            for (offset, item) in store.items[from..end].iter().enumerate() {
                match judge(item) {
                    Ok(true) => doomed.set(offset, true),
                    Ok(false) => {}
                    Err(error) => {
                        failure = Some(error);
                        break;
                    }
                }
            }
            (doomed, failure)
        };
        let removed = doomed.count_ones();
        if removed > 0 {
            self.structural("remove_where", |store| {
                store.expunge(from, &doomed);
                Ok(())
            })?;
        }
        Ok((removed, failure))
    }

    pub(crate) fn replace_all_within<F>(&self, mut operator: F, from: usize, end: usize) -> SequenceResult<()>
    where
        F: FnMut(&T) -> T,
    {
        let replaced: Vec<T> = {
            let store = self.store.borrow();
            check_range(from, end, store.items.len())?;
            store.items[from..end].iter().map(&mut operator).collect()
        };
        self.structural("replace_all", |store| {
            for (slot, value) in store.items[from..end].iter_mut().zip(replaced) {
                *slot = value;
            }
            Ok(())
        })
    }

    // Sorts a permutation while only reading, then moves the elements once.
    // Stable, like `slice::sort_by`.
    pub(crate) fn sort_within<F>(&self, mut compare: F, from: usize, end: usize) -> SequenceResult<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let order: Vec<usize> = {
            let store = self.store.borrow();
            check_range(from, end, store.items.len())?;
            let items = &store.items;
            let mut order: Vec<usize> = (from..end).collect();
            order.sort_by(|&left, &right| compare(&items[left], &items[right]));
            order
        };
        self.structural("sort_by", |store| {
            let mut slots: Vec<Option<T>> = store.items.drain(from..end).map(Some).collect();
            let mut sorted = Vec::with_capacity(slots.len());
            for index in &order {
                if let Some(item) = slots[index - from].take() {
                    sorted.push(item);
                }
            }
            store.items.splice(from..from, sorted);
            Ok(())
        })
    }

    pub(crate) fn for_each_within<F>(&self, action: F, from: usize, end: usize) -> SequenceResult<()>
    where
        F: FnMut(&T),
    {
        let store = self.store.borrow();
        check_range(from, end, store.items.len())?;
        store.items[from..end].iter().for_each(action);
        Ok(())
    }

    pub(crate) fn index_of_within(&self, value: &T, from: usize, end: usize) -> Option<usize>
    where
        T: PartialEq,
    {
        let store = self.store.borrow();
        store
            .items
            .get(from..end)?
            .iter()
            .position(|item| item == value)
            .map(|position| position + from)
    }

    pub(crate) fn last_index_of_within(&self, value: &T, from: usize, end: usize) -> Option<usize>
    where
        T: PartialEq,
    {
        let store = self.store.borrow();
        store
            .items
            .get(from..end)?
            .iter()
            .rposition(|item| item == value)
            .map(|position| position + from)
    }
}

impl<T: Clone> ExclusiveSequence<T> {
    pub fn get(&self, index: usize) -> SequenceResult<T> {
        self.read_at(index, T::clone)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.store.borrow().items.clone()
    }

    pub fn iter(&self) -> FailFastCursor<'_, T> {
        FailFastCursor::new(self, 0)
    }

    pub fn list_cursor(&self, index: usize) -> SequenceResult<FailFastCursor<'_, T>> {
        check_position(index, self.len())?;
        Ok(FailFastCursor::new(self, index))
    }

    pub fn splitter(&self) -> SplittableCursor<'_, T> {
        SplittableCursor::new(self)
    }

    pub(crate) fn to_vec_within(&self, from: usize, end: usize) -> SequenceResult<Vec<T>> {
        let store = self.store.borrow();
        check_range(from, end, store.items.len())?;
        Ok(store.items[from..end].to_vec())
    }

    // Unchecked peek used by cursors; `None` past the live length
    pub(crate) fn peek(&self, index: usize) -> Option<T> {
        self.store.borrow().items.get(index).cloned()
    }
}

// Backing - what cursors need from the thing they traverse
//
// Implemented by the sequence itself and by its sub-range views, so one cursor
// implementation serves both. Indices are relative to the backing.

pub(crate) trait Backing<T> {
    // Live length without interference validation
    fn visible_len(&self) -> usize;

    // Length after validating the backing itself is still coherent
    fn checked_len(&self, operation: &'static str) -> SequenceResult<usize>;

    fn root_change_count(&self) -> usize;

    fn peek_slot(&self, index: usize) -> Option<T>;

    fn remove_slot(&self, index: usize) -> SequenceResult<T>;

    fn replace_slot(&self, index: usize, value: T) -> SequenceResult<T>;

    fn insert_slot(&self, index: usize, value: T) -> SequenceResult<()>;
}

impl<T: Clone> Backing<T> for ExclusiveSequence<T> {
    #[inline]
    fn visible_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn checked_len(&self, _operation: &'static str) -> SequenceResult<usize> {
        Ok(self.len())
    }

    #[inline]
    fn root_change_count(&self) -> usize {
        self.change_count()
    }

    fn peek_slot(&self, index: usize) -> Option<T> {
        self.peek(index)
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

impl<T: Clone> Sequence<T> for ExclusiveSequence<T> {
    type Cursor<'c> = FailFastCursor<'c, T> where Self: 'c;
    type Splitter<'c> = SplittableCursor<'c, T> where Self: 'c;

    fn size(&self) -> SequenceResult<usize> {
        Ok(self.len())
    }

    fn get(&self, index: usize) -> SequenceResult<T> {
        ExclusiveSequence::get(self, index)
    }

    fn set(&self, index: usize, value: T) -> SequenceResult<T> {
        ExclusiveSequence::set(self, index, value)
    }

    fn insert(&self, index: usize, value: T) -> SequenceResult<()> {
        ExclusiveSequence::insert(self, index, value)
    }

    fn remove_at(&self, index: usize) -> SequenceResult<T> {
        ExclusiveSequence::remove_at(self, index)
    }

    fn append(&self, value: T) -> SequenceResult<()> {
        ExclusiveSequence::append(self, value)
    }

    fn clear(&self) -> SequenceResult<()> {
        ExclusiveSequence::clear(self)
    }

    fn cursor(&self) -> SequenceResult<FailFastCursor<'_, T>> {
        Ok(self.iter())
    }

    fn splitter(&self) -> SequenceResult<SplittableCursor<'_, T>> {
        Ok(ExclusiveSequence::splitter(self))
    }

    fn contains(&self, value: &T) -> SequenceResult<bool>
    where
        T: PartialEq,
    {
        Ok(ExclusiveSequence::contains(self, value))
    }

    fn to_vec(&self) -> SequenceResult<Vec<T>> {
        Ok(ExclusiveSequence::to_vec(self))
    }

    fn remove_matching<P>(&self, predicate: P) -> SequenceResult<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.remove_if(predicate)
    }
}

// Value semantics

impl<T> Default for ExclusiveSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

// A clone is a fresh root: own storage sized to the length, counter at zero
impl<T: Clone> Clone for ExclusiveSequence<T> {
    fn clone(&self) -> Self {
        let store = self.store.borrow();
        Self::from_store(Store::adopt(store.policy, store.items.clone()))
    }
}

impl<T: PartialEq> PartialEq for ExclusiveSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.store.borrow().items == other.store.borrow().items
    }
}

impl<T: Eq> Eq for ExclusiveSequence<T> {}

impl<T: Hash> Hash for ExclusiveSequence<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.store.borrow().items.hash(state);
    }
}

impl<T: Debug> Debug for ExclusiveSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.store.borrow().items.iter()).finish()
    }
}

impl<T: Display> Display for ExclusiveSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_elements(f, self.store.borrow().items.iter())
    }
}

pub(crate) fn write_elements<'i, T, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    T: Display + 'i,
    I: Iterator<Item = &'i T>,
{
    f.write_str("[")?;
    for (position, item) in items.enumerate() {
        if position > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl<T> From<Vec<T>> for ExclusiveSequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T> FromIterator<T> for ExclusiveSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
