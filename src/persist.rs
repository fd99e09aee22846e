//! Persisted layout shared by both sequence kinds.
//!
//! Only the logical length and the elements in index order are written.
//! Capacity and change counters are never persisted; a restored sequence
//! sizes its storage from the length alone.

use super::{
    config::SequenceConfig,
    cow::CopyOnWriteSequence,
    errors::SequenceError,
    exclusive::ExclusiveSequence,
    result::SequenceResult,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
    de::Error as _,
    ser::Error as _,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState<T> {
    /// Declared element count; signed so a corrupt negative value is
    /// rejected instead of wrapping.
    pub length: i64,
    pub elements: Vec<T>,
}

// Borrowed twin of PersistedState, serialized without cloning elements
#[derive(Serialize)]
struct PersistedRef<'a, T> {
    length: i64,
    elements: &'a [T],
}

impl<T> PersistedState<T> {
    pub fn new(elements: Vec<T>) -> SequenceResult<Self> {
        let length = declared_length(elements.len())?;
        Ok(Self { length, elements })
    }

    // Validated element count, or the reason the state cannot be restored
    pub fn validate(&self, limit: usize) -> SequenceResult<usize> {
        let rejected = |reason: String| {
            debug!(declared = self.length, elements = self.elements.len(), %reason, "persisted state rejected");
            SequenceError::persisted(reason)
        };
        let length = usize::try_from(self.length)
            .map_err(|_| rejected(format!("negative length {}", self.length)))?;
        if length != self.elements.len() {
            return Err(rejected(format!(
                "declared length {length} but {} elements present",
                self.elements.len()
            )));
        }
        if length > limit {
            return Err(rejected(format!("length {length} exceeds the limit of {limit} elements")));
        }
        Ok(length)
    }
}

fn declared_length(length: usize) -> SequenceResult<i64> {
    i64::try_from(length).map_err(|_| SequenceError::persisted(format!("length {length} does not fit the layout")))
}

// Exclusive

impl<T: Clone> ExclusiveSequence<T> {
    pub fn to_persisted(&self) -> SequenceResult<PersistedState<T>> {
        PersistedState::new(self.to_vec())
    }
}

impl<T> ExclusiveSequence<T> {
    pub fn restore(state: PersistedState<T>) -> SequenceResult<Self> {
        Self::restore_with_config(state, &SequenceConfig::default())
    }

    pub fn restore_with_config(state: PersistedState<T>, config: &SequenceConfig) -> SequenceResult<Self> {
        state.validate(config.growth_policy::<T>().max_capacity())?;
        Self::from_vec_with_config(state.elements, config)
    }
}

impl<T: Serialize> Serialize for ExclusiveSequence<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.with_items(|elements| {
            let length = declared_length(elements.len()).map_err(S::Error::custom)?;
            PersistedRef { length, elements }.serialize(serializer)
        })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ExclusiveSequence<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = PersistedState::<T>::deserialize(deserializer)?;
        Self::restore(state).map_err(D::Error::custom)
    }
}

// Copy-on-write

impl<T: Clone> CopyOnWriteSequence<T> {
    pub fn to_persisted(&self) -> SequenceResult<PersistedState<T>> {
        PersistedState::new(self.to_vec())
    }
}

impl<T> CopyOnWriteSequence<T> {
    pub fn restore(state: PersistedState<T>) -> SequenceResult<Self> {
        state.validate(crate::growth::max_elements::<T>())?;
        Ok(Self::from_vec(state.elements))
    }
}

impl<T: Serialize> Serialize for CopyOnWriteSequence<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let snapshot = self.snapshot();
        let length = declared_length(snapshot.len()).map_err(S::Error::custom)?;
        PersistedRef {
            length,
            elements: snapshot.as_slice(),
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for CopyOnWriteSequence<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = PersistedState::<T>::deserialize(deserializer)?;
        Self::restore(state).map_err(D::Error::custom)
    }
}
