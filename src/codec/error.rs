//! Error types for the codec layer.
//!
//! Decode failures carry a hex dump of the offending input region so the
//! bytes that broke the protocol survive into logs; the filter attaches the
//! dump when the decoder did not. A decode failure may be flagged
//! *recoverable*, meaning the decoder can resume provided the input position
//! advanced; the read loop uses both facts together to decide whether to
//! continue.

use thiserror::Error;

/// Boxed error used to wrap foreign failures from codec implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The filter was driven outside its contract.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    /// The same filter instance was added to a chain twice.
    #[error("this filter instance is already in the chain; create a second instance instead")]
    FilterAlreadyInChain,

    /// An encoder wrote a second payload within a single `encode` call.
    #[error("encoder produced more than one payload for a single message")]
    EncoderSlotOccupied,
}

/// A decoder rejected inbound bytes.
#[derive(Debug)]
pub struct DecodeError {
    source: BoxError,
    recoverable: bool,
    hexdump: Option<String>,
}

impl DecodeError {
    /// Wrap `source` as an unrecoverable decode failure.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
            recoverable: false,
            hexdump: None,
        }
    }

    /// Wrap `source` as a failure the decoder can resume from, provided it
    /// consumed input before failing.
    pub fn recoverable(source: impl Into<BoxError>) -> Self {
        Self {
            recoverable: true,
            ..Self::new(source)
        }
    }

    /// Whether the decoder asserted it can resume past this failure.
    #[must_use]
    pub fn is_recoverable(&self) -> bool { self.recoverable }

    /// Hex dump of the input region that produced the failure, if captured.
    #[must_use]
    pub fn hexdump(&self) -> Option<&str> { self.hexdump.as_deref() }

    /// Attach a hex dump; a dump that is already present is kept.
    pub fn set_hexdump(&mut self, dump: String) {
        if self.hexdump.is_none() {
            self.hexdump = Some(dump);
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "decode failed: {}", self.source)?;
        if let Some(dump) = &self.hexdump {
            write!(f, " (input: {dump})")?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(error: std::io::Error) -> Self { Self::new(error) }
}

/// An encoder failed to produce an outbound payload.
#[derive(Debug, Error)]
#[error("encode failed: {source}")]
pub struct EncodeError {
    source: BoxError,
}

impl EncodeError {
    /// Wrap `source` as an encode failure.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl From<UsageError> for EncodeError {
    fn from(error: UsageError) -> Self { Self::new(error) }
}

impl From<std::io::Error> for EncodeError {
    fn from(error: std::io::Error) -> Self { Self::new(error) }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
