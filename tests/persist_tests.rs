#[cfg(test)]
mod tests {
    use seq_man::{
        CopyOnWriteSequence,
        ExclusiveSequence,
        PersistedState,
        SequenceConfig,
        SequenceError,
    };

    #[test]
    fn test_exclusive_round_trip() {
        let seq = ExclusiveSequence::with_capacity(64).unwrap();
        for word in ["alpha", "beta", "gamma"] {
            seq.append(word.to_string()).unwrap();
        }
        let bytes = bincode::serialize(&seq).unwrap();

        // the layout is the length followed by the elements
        let state: PersistedState<String> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(state.length, 3);
        assert_eq!(state, seq.to_persisted().unwrap());

        let restored: ExclusiveSequence<String> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, seq);
        // capacity comes from the length, never from the source
        assert_eq!(restored.capacity(), 3);
        assert_eq!(restored.change_count(), 0);
    }

    #[test]
    fn test_cow_round_trip() {
        let cow: CopyOnWriteSequence<u32> = (0..100).collect();
        let bytes = bincode::serialize(&cow).unwrap();
        let restored: CopyOnWriteSequence<u32> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, cow);

        // both kinds share one layout
        let as_exclusive: ExclusiveSequence<u32> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(as_exclusive.to_vec(), cow.to_vec());
    }

    #[test]
    fn test_negative_length_rejected() {
        let state = PersistedState::<i32> { length: -1, elements: Vec::new() };
        let err = ExclusiveSequence::restore(state.clone()).unwrap_err();
        println!("{}", err);
        assert!(matches!(err, SequenceError::InvalidPersistedState { .. }));
        assert!(CopyOnWriteSequence::restore(state.clone()).is_err());

        let bytes = bincode::serialize(&state).unwrap();
        assert!(bincode::deserialize::<ExclusiveSequence<i32>>(&bytes).is_err());
        assert!(bincode::deserialize::<CopyOnWriteSequence<i32>>(&bytes).is_err());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let state = PersistedState { length: 5, elements: vec![1, 2] };
        assert_eq!(
            ExclusiveSequence::restore(state).unwrap_err(),
            SequenceError::InvalidPersistedState {
                reason: "declared length 5 but 2 elements present".to_string(),
            }
        );
    }

    #[test]
    fn test_restore_respects_configured_limit() {
        let config = SequenceConfig::default().with_max_capacity(2);
        let state = PersistedState::new(vec![1, 2, 3]).unwrap();
        assert!(ExclusiveSequence::restore_with_config(state.clone(), &config).is_err());

        let roomy = SequenceConfig::default().with_max_capacity(3);
        let seq = ExclusiveSequence::restore_with_config(state, &roomy).unwrap();
        assert_eq!(seq.to_vec(), vec![1, 2, 3]);
        assert_eq!(seq.growth_policy().max_capacity(), 3);
    }

    #[test]
    fn test_empty_state() {
        let state = PersistedState::<u8>::new(Vec::new()).unwrap();
        assert_eq!(state.validate(0), Ok(0));
        let seq = ExclusiveSequence::restore(state).unwrap();
        assert!(seq.is_empty());
        seq.append(1).unwrap();
        assert_eq!(seq.len(), 1);
    }
}
