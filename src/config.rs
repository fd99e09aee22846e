//! Sequence configuration.
//!
//! Both fields have serde defaults, so a partial config (for example one
//! embedded in a larger application config file) deserializes cleanly.

use super::growth::{
    DEFAULT_CAPACITY,
    GrowthPolicy,
    max_elements,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Capacity a lazily sized sequence allocates on its first growth.
    #[serde(default = "default_capacity")]
    pub default_capacity: usize,
    /// Hard element limit. Never raised above what the platform can
    /// address for the element type.
    #[serde(default)]
    pub max_capacity: Option<usize>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            default_capacity: default_capacity(),
            max_capacity: None,
        }
    }
}

impl SequenceConfig {
    pub fn with_default_capacity(mut self, default_capacity: usize) -> Self {
        self.default_capacity = default_capacity;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    pub fn growth_policy<T>(&self) -> GrowthPolicy {
        let platform = max_elements::<T>();
        let limit = self.max_capacity.map_or(platform, |max| max.min(platform));
        GrowthPolicy::new(self.default_capacity, limit)
    }
}
