use thiserror::Error;

/// Errors raised by positional access. Looking up a key which isn't there
/// is not an error; those calls hand back `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderedMapError {
    /// The index was not within `0..len`.
    #[error("index {index} is out of range for a map of length {len}")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, OrderedMapError>;
