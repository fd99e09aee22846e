use super::errors::SequenceError;

pub type SequenceResult<T> = Result<T,SequenceError>;
