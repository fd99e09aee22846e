#[cfg(test)]
mod tests {
    use rand::Rng;
    use rayon::prelude::*;
    use seq_man::{
        CopyOnWriteSequence,
        Sequence,
        SequenceError,
    };
    use std::{cell::RefCell, sync::Arc, thread};

    thread_local! {
        // Runs once, from inside the next equality comparison on this thread
        static ON_COMPARE: RefCell<Option<Box<dyn FnOnce()>>> = RefCell::new(None);
    }

    // Element whose comparisons can trigger a write between search and removal
    #[derive(Debug, Clone)]
    struct Interleaved(i32);

    impl PartialEq for Interleaved {
        fn eq(&self, other: &Self) -> bool {
            let hook = ON_COMPARE.with(|hook| hook.borrow_mut().take());
            if let Some(hook) = hook {
                hook();
            }
            self.0 == other.0
        }
    }

    fn on_next_compare<F: FnOnce() + 'static>(hook: F) {
        ON_COMPARE.with(|slot| *slot.borrow_mut() = Some(Box::new(hook)));
    }

    fn ids(cow: &CopyOnWriteSequence<Interleaved>) -> Vec<i32> {
        cow.to_vec().into_iter().map(|item| item.0).collect()
    }

    #[test]
    fn test_snapshot_isolation() {
        let cow = CopyOnWriteSequence::from_vec(vec![1, 2, 3]);
        let cursor = cow.iter();
        cow.append(4).unwrap();
        assert_eq!(cursor.collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(cow.to_vec(), vec![1, 2, 3, 4]);

        let snapshot = cow.snapshot();
        cow.clear().unwrap();
        assert_eq!(*snapshot, vec![1, 2, 3, 4]);
        assert!(cow.is_empty());
    }

    #[test]
    fn test_basic_operations() {
        let cow = CopyOnWriteSequence::new();
        cow.append(1).unwrap();
        cow.insert(0, 0).unwrap();
        cow.insert(2, 2).unwrap();
        assert_eq!(cow.to_vec(), vec![0, 1, 2]);
        assert_eq!(cow.get(1), Ok(1));
        assert_eq!(cow.remove_at(0), Ok(0));
        assert_eq!(cow.get(5), Err(SequenceError::IndexOutOfRange { index: 5, length: 2 }));
        assert_eq!(cow.insert(3, 9), Err(SequenceError::IndexOutOfRange { index: 3, length: 2 }));
        assert_eq!(cow.remove_first(&2), Ok(true));
        assert_eq!(cow.remove_first(&2), Ok(false));
        assert_eq!(cow.to_vec(), vec![1]);
        println!("{}", cow);
    }

    #[test]
    fn test_set_always_republishes() {
        let cow = CopyOnWriteSequence::from_vec(vec!["a", "b"]);
        let before = cow.snapshot();
        assert_eq!(cow.set(0, "a"), Ok("a"));
        let after = cow.snapshot();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before, after);
    }

    #[test]
    fn test_searches() {
        let cow = CopyOnWriteSequence::from_vec(vec![5, 1, 5, 2, 5]);
        assert_eq!(cow.index_of(&5), Some(0));
        assert_eq!(cow.index_of_from(&5, 1), Some(2));
        assert_eq!(cow.index_of_from(&5, 10), None);
        assert_eq!(cow.last_index_of(&5), Some(4));
        assert_eq!(cow.last_index_of_before(&5, 3), Ok(Some(2)));
        assert_eq!(cow.last_index_of_before(&1, 0), Ok(None));
        assert!(cow.last_index_of_before(&5, 5).unwrap_err().is_out_of_range());
        assert!(cow.contains(&2));
    }

    #[test]
    fn test_absent_additions() {
        let cow = CopyOnWriteSequence::from_vec(vec![1, 2, 3]);
        assert_eq!(cow.add_if_absent(2), Ok(false));
        assert_eq!(cow.add_if_absent(4), Ok(true));
        assert_eq!(cow.add_all_absent(vec![3, 5, 5, 6]), Ok(2));
        assert_eq!(cow.add_all_absent(Vec::new()), Ok(0));
        assert_eq!(cow.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_remove_first_searches_again_after_concurrent_insert() {
        let cow = Arc::new(CopyOnWriteSequence::from_vec(vec![Interleaved(1), Interleaved(2), Interleaved(3)]));
        let writer = Arc::clone(&cow);
        on_next_compare(move || writer.insert(0, Interleaved(99)).unwrap());

        // found at 1 in the private snapshot, at 2 in the live array
        assert_eq!(cow.remove_first(&Interleaved(2)), Ok(true));
        assert_eq!(ids(&cow), vec![99, 1, 3]);
    }

    #[test]
    fn test_remove_first_reports_value_removed_meanwhile() {
        let cow = Arc::new(CopyOnWriteSequence::from_vec(vec![Interleaved(1), Interleaved(2), Interleaved(3)]));
        let writer = Arc::clone(&cow);
        on_next_compare(move || {
            writer.remove_at(1).unwrap();
        });

        assert_eq!(cow.remove_first(&Interleaved(2)), Ok(false));
        assert_eq!(ids(&cow), vec![1, 3]);
    }

    #[test]
    fn test_add_if_absent_rechecks_live_array() {
        let cow = Arc::new(CopyOnWriteSequence::from_vec(vec![Interleaved(1), Interleaved(2)]));
        let writer = Arc::clone(&cow);
        on_next_compare(move || writer.append(Interleaved(3)).unwrap());

        assert_eq!(cow.add_if_absent(Interleaved(3)), Ok(false));
        assert_eq!(ids(&cow), vec![1, 2, 3]);

        // uncontended: added once
        assert_eq!(cow.add_if_absent(Interleaved(4)), Ok(true));
        assert_eq!(ids(&cow), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_bulk_operations() {
        let cow: CopyOnWriteSequence<i32> = (1..=6).collect();
        assert_eq!(cow.remove_if(|x| x % 2 == 0), Ok(3));
        assert_eq!(cow.to_vec(), vec![1, 3, 5]);

        assert_eq!(cow.add_all(vec![7, 8]), Ok(true));
        assert_eq!(cow.insert_all(0, [0]), Ok(true));
        assert_eq!(cow.insert_all(0, []), Ok(false));
        cow.remove_range(1, 2).unwrap();
        assert_eq!(cow.to_vec(), vec![0, 3, 5, 7, 8]);

        assert_eq!(cow.remove_all(&[3, 8]), Ok(2));
        assert_eq!(cow.retain_all(&[0, 5]), Ok(1));
        cow.replace_all(|x| x + 1).unwrap();
        cow.sort_by(|a, b| b.cmp(a)).unwrap();
        assert_eq!(cow.to_vec(), vec![6, 1]);
        cow.sort().unwrap();
        assert_eq!(cow.to_vec(), vec![1, 6]);

        let mut total = 0;
        cow.for_each(|x| total += x);
        assert_eq!(total, 7);
    }

    #[test]
    fn test_failed_judgement_publishes_nothing() {
        let cow: CopyOnWriteSequence<i32> = (1..=4).collect();
        let before = cow.snapshot();
        let result = cow.try_remove_where(|x| {
            if *x == 3 {
                return Err(SequenceError::UnsupportedOperation { operation: "judge" });
            }
            Ok(true)
        });
        assert!(result.is_err());
        assert!(Arc::ptr_eq(&before, &cow.snapshot()));
    }

    #[test]
    fn test_reentrant_mutation_is_rejected() {
        let cow = CopyOnWriteSequence::from_vec(vec![1, 2, 3]);
        let result = cow.remove_if(|x| {
            if *x == 2 {
                // reentrant lock: no deadlock, but the outer result is stale
                cow.append(100).unwrap();
            }
            x % 2 == 0
        });
        let err = result.unwrap_err();
        println!("{}", err);
        assert!(err.is_interference());
        assert_eq!(cow.to_vec(), vec![1, 2, 3, 100]);

        let result = cow.sort_by(|a, b| {
            let _ = cow.clear();
            a.cmp(b)
        });
        assert!(result.unwrap_err().is_interference());
    }

    #[test]
    fn test_clone_shares_snapshot() {
        let cow = CopyOnWriteSequence::from_vec(vec![1, 2]);
        let copy = cow.clone();
        assert!(Arc::ptr_eq(&cow.snapshot(), &copy.snapshot()));
        assert_eq!(cow, copy);

        copy.append(3).unwrap();
        assert_eq!(cow.to_vec(), vec![1, 2]);
        assert_eq!(copy.to_vec(), vec![1, 2, 3]);
        assert_ne!(cow, copy);
    }

    #[test]
    fn test_readers_see_complete_snapshots() {
        let cow = Arc::new(CopyOnWriteSequence::new());
        thread::scope(|scope| {
            let writer = Arc::clone(&cow);
            scope.spawn(move || {
                for i in 0..2_000usize {
                    writer.append(i).unwrap();
                }
            });
            for _ in 0..4 {
                let reader = Arc::clone(&cow);
                scope.spawn(move || {
                    let mut last = 0;
                    for _ in 0..500 {
                        let snapshot = reader.snapshot();
                        // each snapshot is a full prefix, never a partial write
                        assert!(snapshot.iter().enumerate().all(|(i, v)| i == *v));
                        assert!(snapshot.len() >= last);
                        last = snapshot.len();
                    }
                });
            }
        });
        assert_eq!(cow.len(), 2_000);
    }

    #[test]
    fn test_concurrent_writers_lose_nothing() {
        let cow = Arc::new(CopyOnWriteSequence::new());
        thread::scope(|scope| {
            for worker in 0..4usize {
                let cow = Arc::clone(&cow);
                scope.spawn(move || {
                    let mut rng = rand::rng();
                    for i in 0..250usize {
                        cow.append(worker * 1_000 + i).unwrap();
                        if rng.random_bool(0.1) {
                            let _ = cow.get(0);
                        }
                    }
                });
            }
        });
        assert_eq!(cow.len(), 1_000);
        let mut items = cow.to_vec();
        items.sort_unstable();
        items.dedup();
        assert_eq!(items.len(), 1_000);
    }

    #[test]
    fn test_parallel_iteration() {
        let cow: CopyOnWriteSequence<u64> = (0..10_000).collect();
        let iter = cow.par_iter();
        cow.clear().unwrap();

        // bound to the snapshot taken before the clear
        let sum: u64 = iter.sum();
        assert_eq!(sum, (0..10_000u64).sum());

        let cow: CopyOnWriteSequence<u64> = (0..5_000).collect();
        let doubled: Vec<u64> = cow.par_iter().map(|x| x * 2).collect();
        assert_eq!(doubled, (0..5_000u64).map(|x| x * 2).collect::<Vec<_>>());
        assert_eq!(cow.par_iter().len(), 5_000);
        assert_eq!(cow.par_iter().rev().take(2).collect::<Vec<_>>(), vec![4_999, 4_998]);
    }

    #[test]
    fn test_capability_algorithms() {
        let cow = CopyOnWriteSequence::from_vec(vec!["x", "y", "z"]);
        assert_eq!(cow.render(), Ok("[\"x\", \"y\", \"z\"]".to_string()));
        assert_eq!(Sequence::contains(&cow, &"y"), Ok(true));
        assert_eq!(cow.remove_matching(|s| *s == "x"), Ok(1));
        assert_eq!(Sequence::size(&cow), Ok(2));
    }
}
