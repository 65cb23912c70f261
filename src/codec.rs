//! Pluggable protocol codecs and their per-session binding.
//!
//! A codec is a pair of a [`ProtocolDecoder`] (bytes to messages) and a
//! [`ProtocolEncoder`] (messages to bytes), bound to exactly one session for
//! its lifetime. A [`CodecFactory`] resolves the pair when the filter is
//! attached; three construction styles are supported:
//!
//! - a hand-written factory, for codecs that inspect the session;
//! - [`FnCodecFactory`], building the pair from closures;
//! - cloning or defaulting a prototype pair via
//!   [`CodecFilter::from_pair`](crate::filter::CodecFilter::from_pair) and
//!   [`CodecFilter::from_default`](crate::filter::CodecFilter::from_default).
//!
//! Decoders accumulate partial frames internally: `decode` must consume from
//! the input before returning `Ok` while bytes remain, otherwise the read
//! loop will call it again with the same bytes.

use crate::buffer::ByteBuf;
use crate::message::Payload;
use crate::session::Session;

pub mod error;

mod decoder_output;
mod encoder_output;

pub use decoder_output::DecoderOutput;
pub use encoder_output::EncoderOutput;
pub use error::{BoxError, DecodeError, EncodeError, UsageError};

#[doc(hidden)]
pub mod examples;

/// Translates inbound bytes into application messages.
///
/// One decoder instance serves one session; the filter never calls it from
/// two workers at once.
pub trait ProtocolDecoder: Send {
    /// Decode as many messages as `input` allows, writing each to `out`.
    ///
    /// Partial frames must be buffered inside the decoder and the consumed
    /// bytes acknowledged by advancing `input`; the remaining bytes of an
    /// incomplete frame are expected to be consumed into that buffer.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the bytes violate the protocol. Use
    /// [`DecodeError::recoverable`] when decoding can resume past the bad
    /// input; the filter only retries if `input` advanced.
    fn decode(
        &mut self,
        session: &dyn Session,
        input: &mut ByteBuf,
        out: &mut DecoderOutput,
    ) -> Result<(), DecodeError>;

    /// Emit any terminal message buffered for end-of-stream.
    ///
    /// Called once when the session closes, before the decoder is disposed.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the buffered tail is not a valid
    /// message.
    fn finish_decode(
        &mut self,
        session: &dyn Session,
        out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        let _ = (session, out);
        Ok(())
    }

    /// Release resources held for `session`.
    ///
    /// # Errors
    ///
    /// Errors are logged by the filter and never interrupt teardown.
    fn dispose(&mut self, session: &dyn Session) -> Result<(), BoxError> {
        let _ = session;
        Ok(())
    }
}

/// Translates application messages into outbound bytes.
pub trait ProtocolEncoder: Send {
    /// Encode `message`, writing the single resulting payload to `out`.
    ///
    /// Writing nothing is valid (for example when coalescing); the original
    /// write completes successfully with no downstream traffic. Writing
    /// twice within one call is a contract violation surfaced by
    /// [`EncoderOutput::write`].
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] when the message cannot be encoded.
    fn encode(
        &mut self,
        session: &dyn Session,
        message: Payload,
        out: &mut EncoderOutput,
    ) -> Result<(), EncodeError>;

    /// Release resources held for `session`.
    ///
    /// # Errors
    ///
    /// Errors are logged by the filter and never interrupt teardown.
    fn dispose(&mut self, session: &dyn Session) -> Result<(), BoxError> {
        let _ = session;
        Ok(())
    }
}

/// Resolves the codec pair for a session when the filter is attached.
pub trait CodecFactory: Send + Sync {
    /// Build the encoder bound to `session`.
    fn encoder(&self, session: &dyn Session) -> Box<dyn ProtocolEncoder>;

    /// Build the decoder bound to `session`.
    fn decoder(&self, session: &dyn Session) -> Box<dyn ProtocolDecoder>;
}

/// Factory assembling the codec pair from two closures.
///
/// The natural replacement for constructing codecs from type names: the
/// closures capture whatever configuration the codec needs and run once per
/// session.
pub struct FnCodecFactory<FE, FD> {
    make_encoder: FE,
    make_decoder: FD,
}

impl<FE, FD> FnCodecFactory<FE, FD> {
    /// Wrap the two constructors.
    pub fn new(make_encoder: FE, make_decoder: FD) -> Self {
        Self {
            make_encoder,
            make_decoder,
        }
    }
}

impl<FE, FD, E, D> CodecFactory for FnCodecFactory<FE, FD>
where
    FE: Fn() -> E + Send + Sync,
    FD: Fn() -> D + Send + Sync,
    E: ProtocolEncoder + 'static,
    D: ProtocolDecoder + 'static,
{
    fn encoder(&self, _session: &dyn Session) -> Box<dyn ProtocolEncoder> {
        Box::new((self.make_encoder)())
    }

    fn decoder(&self, _session: &dyn Session) -> Box<dyn ProtocolDecoder> {
        Box::new((self.make_decoder)())
    }
}
