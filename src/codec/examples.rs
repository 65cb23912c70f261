//! Shared example codec for tests and documentation.
//!
//! A minimal length-prefixed text protocol: each frame is a big-endian
//! `u16` length followed by that many bytes of UTF-8, decoded to `String`
//! messages. Partial frames are accumulated inside the decoder, so a frame
//! may arrive split across any number of reads.

use bytes::Buf;

use crate::buffer::ByteBuf;
use crate::codec::{DecodeError, DecoderOutput, EncodeError, EncoderOutput};
use crate::codec::{ProtocolDecoder, ProtocolEncoder};
use crate::message::Payload;
use crate::session::Session;

/// Decoder for `u16`-length-prefixed UTF-8 frames.
#[derive(Clone, Debug, Default)]
pub struct LengthPrefixedDecoder {
    pending: Vec<u8>,
}

impl LengthPrefixedDecoder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn drain_frames(&mut self, out: &mut DecoderOutput) -> Result<(), DecodeError> {
        loop {
            if self.pending.len() < 2 {
                return Ok(());
            }
            let len = usize::from(u16::from_be_bytes([self.pending[0], self.pending[1]]));
            if self.pending.len() < 2 + len {
                return Ok(());
            }
            let payload: Vec<u8> = self.pending.drain(..2 + len).skip(2).collect();
            let text = String::from_utf8(payload)
                .map_err(|e| DecodeError::recoverable(format!("frame is not UTF-8: {e}")))?;
            out.write(Payload::value(text));
        }
    }
}

impl ProtocolDecoder for LengthPrefixedDecoder {
    fn decode(
        &mut self,
        _session: &dyn Session,
        input: &mut ByteBuf,
        out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        self.pending.extend_from_slice(input.as_slice());
        input.advance(input.remaining());
        self.drain_frames(out)
    }
}

/// Encoder producing `u16`-length-prefixed UTF-8 frames from `String` or
/// `&'static str` messages.
#[derive(Clone, Debug, Default)]
pub struct LengthPrefixedEncoder;

impl LengthPrefixedEncoder {
    #[must_use]
    pub fn new() -> Self { Self }
}

impl ProtocolEncoder for LengthPrefixedEncoder {
    fn encode(
        &mut self,
        _session: &dyn Session,
        message: Payload,
        out: &mut EncoderOutput,
    ) -> Result<(), EncodeError> {
        let text = match message.downcast::<String>() {
            Ok(text) => text,
            Err(other) => match other.downcast::<&'static str>() {
                Ok(text) => (*text).to_owned(),
                Err(_) => return Err(EncodeError::new("message is not text")),
            },
        };
        let len = u16::try_from(text.len())
            .map_err(|_| EncodeError::new("frame longer than a u16 length can carry"))?;

        let mut frame = ByteBuf::new();
        frame.put_slice(&len.to_be_bytes());
        frame.put_slice(text.as_bytes());
        out.write(Payload::Bytes(frame))
    }
}
