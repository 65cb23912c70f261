//! Canonical top-level error type for the crate.
//!
//! Individual operations return the specific error from
//! [`codec::error`](crate::codec::error); `CodecError` is the single surface
//! carried by [`NextFilter::exception_caught`](crate::chain::NextFilter) so
//! downstream filters match on one type.

use thiserror::Error;

use crate::codec::error::{DecodeError, EncodeError, UsageError};

/// Umbrella over every failure the codec filter can surface.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The decoder rejected inbound bytes.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The encoder failed to produce an outbound payload.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The filter was used outside its contract.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl CodecError {
    /// The error category as a string, for logging and metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::Usage(_) => "usage",
        }
    }
}
