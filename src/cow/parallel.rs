use rayon::iter::{
    IndexedParallelIterator,
    ParallelIterator,
    plumbing::{
        Consumer,
        Producer,
        ProducerCallback,
        UnindexedConsumer,
        bridge,
    },
};
use std::sync::Arc;

// Below this many elements a producer is not split further
pub const PARALLEL_SPLIT_THRESHOLD: usize = 1024;

// SnapshotParIter - rayon view of one published array
//
// Every split shares the same `Arc`; items are cloned out as they are produced.
pub struct SnapshotParIter<T> {
    snapshot: Arc<Vec<T>>,
    start: usize,
    end: usize,
}

impl<T> SnapshotParIter<T> {
    pub(crate) fn over(snapshot: Arc<Vec<T>>) -> Self {
        let end = snapshot.len();
        Self {
            snapshot,
            start: 0,
            end,
        }
    }
}

impl<T: Clone + Send + Sync> ParallelIterator for SnapshotParIter<T> {
    type Item = T;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge(self, consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        Some(self.end - self.start)
    }
}

impl<T: Clone + Send + Sync> IndexedParallelIterator for SnapshotParIter<T> {
    fn len(&self) -> usize {
        self.end - self.start
    }

    fn drive<C: Consumer<Self::Item>>(self, consumer: C) -> C::Result {
        bridge(self, consumer)
    }

    fn with_producer<CB: ProducerCallback<Self::Item>>(self, callback: CB) -> CB::Output {
        callback.callback(SnapshotProducer {
            snapshot: self.snapshot,
            start: self.start,
            end: self.end,
        })
    }
}

struct SnapshotProducer<T> {
    snapshot: Arc<Vec<T>>,
    start: usize,
    end: usize,
}

impl<T: Clone + Send + Sync> Producer for SnapshotProducer<T> {
    type Item = T;
    type IntoIter = SnapshotRange<T>;

    fn into_iter(self) -> Self::IntoIter {
        SnapshotRange {
            snapshot: self.snapshot,
            front: self.start,
            back: self.end,
        }
    }

    fn min_len(&self) -> usize {
        PARALLEL_SPLIT_THRESHOLD
    }

    // `index` is relative to this producer
    fn split_at(self, index: usize) -> (Self, Self) {
        let middle = self.start + index;
        let left = Self {
            snapshot: Arc::clone(&self.snapshot),
            start: self.start,
            end: middle,
        };
        let right = Self {
            snapshot: self.snapshot,
            start: middle,
            end: self.end,
        };
        (left, right)
    }
}

// Sequential leg of a producer, consumable from either end
pub struct SnapshotRange<T> {
    snapshot: Arc<Vec<T>>,
    front: usize,
    back: usize,
}

impl<T: Clone> Iterator for SnapshotRange<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        let item = self.snapshot[self.front].clone();
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for SnapshotRange<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.snapshot[self.back].clone())
    }
}

impl<T: Clone> ExactSizeIterator for SnapshotRange<T> {}
