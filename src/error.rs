//! Driver error types

use core::fmt;

use crate::ConfigSourceError;

/// Error returned by every bus-touching operation.
///
/// `E` is the error type of the underlying I²C bus. Bus errors are carried
/// unchanged so the caller sees exactly what the transport reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Register read or write failed on the bus
    Bus(E),
    /// Per-channel parameters were missing or malformed
    ConfigSource(ConfigSourceError),
}

impl<E> From<ConfigSourceError> for Error<E> {
    fn from(err: ConfigSourceError) -> Self {
        Error::ConfigSource(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(err) => write!(f, "register bus error: {err:?}"),
            Error::ConfigSource(err) => write!(f, "configuration error: {err}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}
