pub mod capability;
pub mod config;
pub mod cow;
pub mod errors;
pub mod exclusive;
pub mod growth;
pub mod model;
pub mod persist;
pub mod result;

pub use capability::{
    Cursor,
    Sequence,
    Splitter,
};
pub use config::SequenceConfig;
pub use cow::{
    CopyOnWriteSequence,
    cursor::{SnapshotCursor, SnapshotSplitter},
    parallel::{PARALLEL_SPLIT_THRESHOLD, SnapshotParIter},
    view::CowSubRangeView,
};
pub use errors::SequenceError;
pub use exclusive::{
    ExclusiveSequence,
    cursor::FailFastCursor,
    splitter::SplittableCursor,
    view::SubRangeView,
};
pub use growth::{DEFAULT_CAPACITY, GrowthPolicy};
pub use model::SequenceStats;
pub use persist::PersistedState;
pub use result::SequenceResult;
