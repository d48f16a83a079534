use thiserror::Error;

/// Errors raised while building an observable pipeline.
///
/// Errors flowing *through* a stream are never of this type: every
/// observable carries its own `Err` parameter and the engine forwards those
/// values untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// `flat_map` needs room for at least one active inner stream.
  #[error("flat_map concurrency must be at least 1, got {0}")]
  InvalidConcurrency(usize),
}

/// Result type alias for pipeline construction.
pub type Result<T> = std::result::Result<T, Error>;
