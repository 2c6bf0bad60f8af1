use core::fmt::Debug;
use thiserror::Error;

/// Errors that abort a capture or an acquisition run.
///
/// Bad frames are not errors: they surface as a [`Classification`](crate::reading::Classification)
/// on the returned reading so the controller can retry them.
#[derive(Debug, PartialEq, Error)]
pub enum Error<TIoError: Debug> {
    /// Wrapped error from the line.
    #[error("line I/O failed: {0:?}")]
    Wrapped(TIoError),
    /// Invalid argument was provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl<TIoError: Debug> From<TIoError> for Error<TIoError> {
    fn from(error: TIoError) -> Error<TIoError> {
        Error::Wrapped(error)
    }
}
