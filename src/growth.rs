use super::{
    errors::SequenceError,
    result::SequenceResult,
};

pub const DEFAULT_CAPACITY: usize = 10;

// Largest element count a single allocation can address for `T`.
// Zero-sized elements never allocate, so only the counter limits them.
#[inline]
pub fn max_elements<T>() -> usize {
    match std::mem::size_of::<T>() {
        0 => usize::MAX,
        size => isize::MAX as usize / size,
    }
}

// GrowthPolicy - capacity planning for the exclusive sequence
//
// Grows by half of the current capacity, never below what the caller needs.
// A sequence that was created without an explicit capacity jumps straight to
// `default_capacity` on its first growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    default_capacity: usize,
    max_capacity: usize,
}

impl GrowthPolicy {
    pub const fn new(default_capacity: usize, max_capacity: usize) -> Self {
        Self {
            default_capacity,
            max_capacity,
        }
    }

    pub fn for_elements<T>() -> Self {
        Self::new(DEFAULT_CAPACITY, max_elements::<T>())
    }

    #[inline]
    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn new_capacity(
        &self,
        current: usize,
        min_required: usize,
        lazily_sized: bool,
    ) -> SequenceResult<usize> {
        if min_required > self.max_capacity {
            return Err(SequenceError::AllocationLimitExceeded {
                requested: min_required,
                limit: self.max_capacity,
            });
        }
        let grown = current.saturating_add(current >> 1);
        if grown <= min_required {
            if lazily_sized {
                return Ok(self.default_capacity.max(min_required).min(self.max_capacity));
            }
            return Ok(min_required);
        }
        // min_required <= max_capacity, so clamping keeps the contract
        Ok(grown.min(self.max_capacity))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, usize::MAX)
    }
}
