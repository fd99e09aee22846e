use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    IndexOutOfRange {
        index: usize,
        length: usize,
    },
    RangeOutOfBounds {
        from: usize,
        to: usize,
        length: usize,
    },
    // Fail-fast detection: the sequence changed structurally behind a cursor
    // or view, or a mutation was attempted while a traversal held the storage.
    ConcurrentStructuralChange {
        operation: &'static str,
    },
    UnsupportedOperation {
        operation: &'static str,
    },
    AllocationLimitExceeded {
        requested: usize,
        limit: usize,
    },
    InvalidPersistedState {
        reason: String,
    },
    IllegalCursorState {
        operation: &'static str,
    },
}

impl SequenceError {
    #[inline]
    pub(crate) fn interference(operation: &'static str) -> Self {
        Self::ConcurrentStructuralChange { operation }
    }

    #[inline]
    pub(crate) fn unsupported(operation: &'static str) -> Self {
        Self::UnsupportedOperation { operation }
    }

    pub(crate) fn persisted(reason: impl Into<String>) -> Self {
        Self::InvalidPersistedState { reason: reason.into() }
    }

    pub fn is_interference(&self) -> bool {
        matches!(self, Self::ConcurrentStructuralChange { .. })
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. } | Self::RangeOutOfBounds { .. })
    }
}

impl Display for SequenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, length } => write!(
                f, "index {index} out of range for length {length}"
            ),
            Self::RangeOutOfBounds { from, to, length } => write!(
                f, "range {from}..{to} out of bounds for length {length}"
            ),
            Self::ConcurrentStructuralChange { operation } => write!(
                f, "concurrent structural change detected in '{operation}'"
            ),
            Self::UnsupportedOperation { operation } => write!(
                f, "operation '{operation}' is not supported here"
            ),
            Self::AllocationLimitExceeded { requested, limit } => write!(
                f, "requested capacity {requested} exceeds the limit of {limit} elements"
            ),
            Self::InvalidPersistedState { reason } => write!(f, "invalid persisted state: {reason}"),
            Self::IllegalCursorState { operation } => write!(
                f, "cursor has no current element for '{operation}'"
            ),
        }
    }
}

impl std::error::Error for SequenceError {}

// Bounds checks shared by both variants

#[inline]
pub(crate) fn check_index(index: usize, length: usize) -> Result<(), SequenceError> {
    if index < length {
        Ok(())
    } else {
        Err(SequenceError::IndexOutOfRange { index, length })
    }
}

// Insert positions may equal the length
#[inline]
pub(crate) fn check_position(index: usize, length: usize) -> Result<(), SequenceError> {
    if index <= length {
        Ok(())
    } else {
        Err(SequenceError::IndexOutOfRange { index, length })
    }
}

#[inline]
pub(crate) fn check_range(from: usize, to: usize, length: usize) -> Result<(), SequenceError> {
    if from <= to && to <= length {
        Ok(())
    } else {
        Err(SequenceError::RangeOutOfBounds { from, to, length })
    }
}
