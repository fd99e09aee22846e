#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceStats {
    pub length: usize,
    pub capacity: usize,
    pub change_count: usize,
    pub growth_count: usize,   // number of storage reallocations
    pub copied_elements: usize, // live elements moved by those reallocations
}

impl SequenceStats {
    // Slack slots that are allocated but not live
    pub fn spare_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.length)
    }

    // Fill ratio of the allocated storage
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        self.length as f64 / self.capacity as f64
    }

    // Average elements copied per live element; bounded by a constant
    // for append-only workloads.
    pub fn copy_ratio(&self) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        self.copied_elements as f64 / self.length as f64
    }
}
