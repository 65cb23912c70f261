//! Single-slot sink for the payload produced by an encoder.

use crate::codec::error::{EncodeError, UsageError};
use crate::message::Payload;

/// Holds at most one encoded payload per `encode` call.
///
/// An encoder produces exactly zero or one payload for each logical message;
/// the slot enforces that. There is no general flush operation: the only
/// drain path is the filter's flush-with-future, which takes the payload and
/// forwards it with the originating request's completion future attached.
#[derive(Debug, Default)]
pub struct EncoderOutput {
    slot: Option<Payload>,
}

impl EncoderOutput {
    pub(crate) fn new() -> Self { Self::default() }

    /// Capture the encoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::EncoderSlotOccupied`] (as an [`EncodeError`])
    /// when a payload was already written during the current `encode` call.
    pub fn write(&mut self, message: Payload) -> Result<(), EncodeError> {
        if self.slot.is_some() {
            return Err(UsageError::EncoderSlotOccupied.into());
        }
        self.slot = Some(message);
        Ok(())
    }

    /// Whether a payload is waiting to be flushed.
    #[must_use]
    pub fn is_occupied(&self) -> bool { self.slot.is_some() }

    /// Remove and return the captured payload, leaving the slot empty.
    pub(crate) fn take(&mut self) -> Option<Payload> { self.slot.take() }
}

#[cfg(test)]
#[path = "encoder_output_tests.rs"]
mod tests;
