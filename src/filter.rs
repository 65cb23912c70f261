//! The codec filter: translates between byte buffers and application
//! messages inside a filter chain.
//!
//! Inbound, a [`CodecFilter`] drives the session's decoder against each
//! arriving buffer in a loop, delivering decoded messages to the next filter
//! in order. The loop checkpoints the session's worker token between
//! iterations: when the runtime moves the session to another worker
//! mid-decode, the loop yields and hands the unconsumed bytes back to the
//! caller for re-delivery on the new worker. Outbound, the filter runs the
//! session's encoder and forwards the encoded payload downstream with the
//! originating request's completion future attached.
//!
//! Decode failures never escape `message_received`; they are reported to the
//! chain through `exception_caught`, with a hex dump of the offending input
//! region attached, and the loop resumes only for recoverable failures that
//! consumed input. Encode failures are returned to the caller, whose future
//! must reflect the failed write.

use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, trace, warn};
use parking_lot::Mutex;

use crate::buffer::ByteBuf;
use crate::chain::{FilterChain, FilterId, NextFilter};
use crate::codec::{
    CodecFactory,
    DecodeError,
    DecoderOutput,
    EncodeError,
    EncoderOutput,
    FnCodecFactory,
    ProtocolDecoder,
    ProtocolEncoder,
    UsageError,
};
use crate::message::Payload;
use crate::session::{Session, SessionId};
use crate::write::WriteRequest;

/// Codec state bound to one session by one filter instance.
struct SessionCodec {
    encoder: Mutex<Box<dyn ProtocolEncoder>>,
    decoder: Mutex<Box<dyn ProtocolDecoder>>,
    decoder_out: Mutex<DecoderOutput>,
    encoder_out: Mutex<EncoderOutput>,
}

/// Filter translating between raw byte buffers and application messages.
///
/// One instance may serve many sessions; each session gets its own codec
/// pair from the factory when the filter is attached to that session's
/// chain. Attaching the *same instance* twice to one chain is refused;
/// attach a second instance instead, and the two keep fully independent
/// codec state.
pub struct CodecFilter {
    id: FilterId,
    factory: Arc<dyn CodecFactory>,
    sessions: DashMap<SessionId, Arc<SessionCodec>>,
}

impl CodecFilter {
    /// Create a filter resolving codecs through `factory`.
    #[must_use]
    pub fn new(factory: impl CodecFactory + 'static) -> Self {
        Self {
            id: FilterId::next(),
            factory: Arc::new(factory),
            sessions: DashMap::new(),
        }
    }

    /// Create a filter cloning a prototype codec pair for each session.
    ///
    /// Every session receives its own clone, so stateful codecs remain
    /// exclusively owned by the session they serve.
    #[must_use]
    pub fn from_pair<E, D>(encoder: E, decoder: D) -> Self
    where
        E: ProtocolEncoder + Clone + Sync + 'static,
        D: ProtocolDecoder + Clone + Sync + 'static,
    {
        Self::new(FnCodecFactory::new(
            move || encoder.clone(),
            move || decoder.clone(),
        ))
    }

    /// Create a filter default-constructing the codec pair for each session.
    #[must_use]
    pub fn from_default<E, D>() -> Self
    where
        E: ProtocolEncoder + Default + 'static,
        D: ProtocolDecoder + Default + 'static,
    {
        Self::new(FnCodecFactory::new(E::default, D::default))
    }

    /// This instance's chain-unique identity.
    #[must_use]
    pub fn id(&self) -> FilterId { self.id }

    /// Attach the filter to a session's chain, binding a codec pair.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::FilterAlreadyInChain`] when this same instance
    /// is already attached to the chain.
    pub fn on_added(&self, chain: &dyn FilterChain) -> Result<(), UsageError> {
        if chain.contains(self.id) {
            return Err(UsageError::FilterAlreadyInChain);
        }

        let session = chain.session();
        let state = SessionCodec {
            encoder: Mutex::new(self.factory.encoder(session)),
            decoder: Mutex::new(self.factory.decoder(session)),
            decoder_out: Mutex::new(DecoderOutput::new()),
            encoder_out: Mutex::new(EncoderOutput::new()),
        };
        self.sessions.insert(session.id(), Arc::new(state));
        Ok(())
    }

    /// Detach the filter from a session's chain, disposing its codec state.
    pub fn on_removed(&self, chain: &dyn FilterChain) { self.dispose_codec(chain.session()); }

    /// Handle an inbound message.
    ///
    /// Non-buffer messages are forwarded unchanged. Buffers are fed to the
    /// decoder until consumed; decoded messages reach the next filter in
    /// emission order.
    ///
    /// Returns `Some(remainder)` when the session moved to another worker
    /// mid-decode: the unconsumed bytes are handed back, positions intact,
    /// and the embedding runtime must re-deliver them on the session's
    /// current worker. All other outcomes return `None`.
    pub fn message_received(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        message: Payload,
    ) -> Option<ByteBuf> {
        debug!("processing message_received for session {}", session.id());

        let Payload::Bytes(mut input) = message else {
            next.message_received(session, message);
            return None;
        };
        let Some(state) = self.state(session) else {
            next.message_received(session, Payload::Bytes(input));
            return None;
        };

        // Loop until the buffer is consumed, the decoder fails without
        // recovery, or the session is realigned to another worker.
        let worker = session.worker_token();
        while input.has_remaining() {
            if session.worker_token() != worker {
                trace!(
                    "decoding for session {} will be continued by its new worker",
                    session.id()
                );
                crate::metrics::realignment_yield();
                return Some(input);
            }

            let old_pos = input.position();
            let outcome = {
                let mut decoder = state.decoder.lock();
                let mut out = state.decoder_out.lock();
                decoder
                    .decode(session, &mut input, &mut out)
                    .map(|()| out.flush(next, session))
            };

            if let Err(mut error) = outcome {
                if error.hexdump().is_none() {
                    let current = input.position();
                    input.set_position(old_pos);
                    error.set_hexdump(input.hex_dump());
                    input.set_position(current);
                }

                // Messages decoded before the failure still go out, in order.
                state.decoder_out.lock().flush(next, session);

                let recoverable = error.is_recoverable();
                crate::metrics::codec_error("decode");
                next.exception_caught(session, error.into());

                // Retry only when the decoder can recover and made progress;
                // the position check prevents re-raising the same error at
                // the same offset forever.
                if !recoverable || input.position() == old_pos {
                    break;
                }
            }
        }
        None
    }

    /// Handle a completed write.
    ///
    /// The worker-registration sentinel flushes decoded messages parked
    /// while the session had no worker; everything is then forwarded.
    pub fn message_sent(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        request: WriteRequest,
    ) {
        if request.is_registered()
            && let Some(state) = self.state(session)
        {
            // The lock makes the incoming worker wait until the outgoing
            // worker has unwound from its decode loop.
            state.decoder_out.lock().flush(next, session);
        }

        next.message_sent(session, request);
    }

    /// Handle an outbound write request.
    ///
    /// Byte buffers and file regions are already encoded and pass through
    /// unchanged. Anything else is run through the encoder; the encoded
    /// payload replaces the request's message and travels on with the
    /// original completion future. An encoder that emits nothing completes
    /// the future successfully with no downstream write.
    ///
    /// # Errors
    ///
    /// Returns the [`EncodeError`] from a failed encode; the caller owns the
    /// issuer's future and must fail it.
    pub fn filter_write(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
        request: WriteRequest,
    ) -> Result<(), EncodeError> {
        if matches!(request.message(), Payload::Bytes(_) | Payload::File(_)) {
            next.filter_write(session, request);
            return Ok(());
        }
        let Some(state) = self.state(session) else {
            next.filter_write(session, request);
            return Ok(());
        };

        let (message, future) = request.into_parts();
        let encoded = {
            let mut encoder = state.encoder.lock();
            let mut out = state.encoder_out.lock();
            let result = encoder.encode(session, message, &mut out);
            // The slot must not leak a payload from a failed encode into the
            // next write.
            let encoded = out.take();
            result.map(|()| encoded)
        };

        match encoded {
            Ok(Some(payload)) => {
                crate::metrics::message_encoded();
                next.filter_write(session, WriteRequest::with_future(payload, future));
                Ok(())
            }
            Ok(None) => {
                future.set_written();
                Ok(())
            }
            Err(error) => {
                crate::metrics::codec_error("encode");
                Err(error)
            }
        }
    }

    /// Handle session close: finish decoding, dispose the codec pair, flush
    /// whatever the finish produced, then forward the close.
    ///
    /// Teardown always completes. `finish_decode` runs before dispose because
    /// the decoder may still hold a buffered tail; the final flush runs after
    /// dispose to drain any terminal message it emitted.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeError`] from `finish_decode`, after teardown; the
    /// close event is not forwarded in that case, mirroring an exceptional
    /// close handled by the chain.
    pub fn session_closed(
        &self,
        next: &dyn NextFilter,
        session: &dyn Session,
    ) -> Result<(), DecodeError> {
        let Some(state) = self.state(session) else {
            next.session_closed(session);
            return Ok(());
        };

        let finished = {
            let mut decoder = state.decoder.lock();
            let mut out = state.decoder_out.lock();
            decoder.finish_decode(session, &mut out)
        };

        self.dispose_codec(session);
        state.decoder_out.lock().flush(next, session);

        if let Err(error) = finished {
            crate::metrics::codec_error("decode");
            return Err(error);
        }
        next.session_closed(session);
        Ok(())
    }

    fn state(&self, session: &dyn Session) -> Option<Arc<SessionCodec>> {
        self.sessions
            .get(&session.id())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Dispose both codecs, isolating failures: a dispose error is logged
    /// and the rest of the teardown continues. Removing the map entry also
    /// releases the output sinks.
    fn dispose_codec(&self, session: &dyn Session) {
        let Some((_, state)) = self.sessions.remove(&session.id()) else {
            return;
        };
        if let Err(error) = state.encoder.lock().dispose(session) {
            warn!("failed to dispose encoder for session {}: {error}", session.id());
        }
        if let Err(error) = state.decoder.lock().dispose(session) {
            warn!("failed to dispose decoder for session {}: {error}", session.id());
        }
    }
}

impl std::fmt::Debug for CodecFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecFilter")
            .field("id", &self.id)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
