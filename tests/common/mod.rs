//! Shared harness for integration tests.
//!
//! Provides a controllable [`TestSession`] (worker token, registration, and
//! connectedness are all test-settable atomics), a [`RecordingNext`] that
//! captures every downstream event, a [`TestChain`] for lifecycle tests, and
//! the scenario codecs the decode/encode tests drive the filter with.
#![allow(dead_code, reason = "each test binary uses a subset of the harness")]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use bytes::Buf;
use framegate::codec::examples::LengthPrefixedDecoder;
use framegate::{
    ByteBuf,
    CodecError,
    DecodeError,
    DecoderOutput,
    EncodeError,
    EncoderOutput,
    FilterChain,
    FilterId,
    NextFilter,
    Payload,
    ProtocolDecoder,
    ProtocolEncoder,
    Session,
    SessionId,
    WorkerToken,
    WriteFuture,
    WriteRequest,
    WriteSession,
};
use parking_lot::Mutex;

/// Session double with test-settable worker state.
pub struct TestSession {
    id: u64,
    token: AtomicU64,
    registered: AtomicBool,
    connected: AtomicBool,
    auto_complete_writes: AtomicBool,
    writes: Mutex<Vec<(Vec<u8>, WriteFuture)>>,
}

impl TestSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: 42,
            token: AtomicU64::new(0),
            registered: AtomicBool::new(true),
            connected: AtomicBool::new(true),
            auto_complete_writes: AtomicBool::new(false),
            writes: Mutex::new(Vec::new()),
        })
    }

    /// Move the session to a new worker.
    pub fn realign(&self) { self.token.fetch_add(1, Ordering::SeqCst); }

    pub fn set_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::SeqCst);
    }

    pub fn disconnect(&self) { self.connected.store(false, Ordering::SeqCst); }

    /// Complete every submitted write future as soon as it is created.
    pub fn auto_complete_writes(&self) {
        self.auto_complete_writes.store(true, Ordering::SeqCst);
    }

    /// Payloads submitted through [`WriteSession::write`].
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.writes.lock().iter().map(|(bytes, _)| bytes.clone()).collect()
    }

    /// Fail the most recently submitted write.
    pub fn fail_last_write(&self) {
        let writes = self.writes.lock();
        let (_, future) = writes.last().expect("no write was submitted");
        future.fail();
    }

    /// Complete the most recently submitted write.
    pub fn complete_last_write(&self) {
        let writes = self.writes.lock();
        let (_, future) = writes.last().expect("no write was submitted");
        future.set_written();
    }
}

impl Session for TestSession {
    fn id(&self) -> SessionId { SessionId::from(self.id) }

    fn is_connected(&self) -> bool { self.connected.load(Ordering::SeqCst) }

    fn worker_token(&self) -> WorkerToken {
        WorkerToken::from(self.token.load(Ordering::SeqCst))
    }

    fn is_worker_registered(&self) -> bool { self.registered.load(Ordering::SeqCst) }
}

impl WriteSession for TestSession {
    fn write(&self, message: Payload) -> WriteFuture {
        let bytes = message
            .as_bytes()
            .map(|buf| buf.as_slice().to_vec())
            .unwrap_or_default();
        let future = WriteFuture::new();
        if self.auto_complete_writes.load(Ordering::SeqCst) {
            future.set_written();
        }
        self.writes.lock().push((bytes, future.clone()));
        future
    }
}

/// Downstream event captured by [`RecordingNext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Received(String),
    ReceivedBuffer(Vec<u8>),
    Sent { registered: bool },
    Write(Vec<u8>),
    WriteFile,
    DecodeFailure { hexdump: Option<String>, recoverable: bool },
    Closed,
}

/// Next filter recording everything it is handed.
#[derive(Default)]
pub struct RecordingNext {
    events: Mutex<Vec<Event>>,
    write_futures: Mutex<Vec<WriteFuture>>,
}

impl RecordingNext {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<Event> { self.events.lock().clone() }

    /// Only the decoded messages, in delivery order.
    pub fn received(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Received(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Futures attached to forwarded write requests, in forward order.
    pub fn write_futures(&self) -> Vec<WriteFuture> { self.write_futures.lock().clone() }

    fn record(&self, event: Event) { self.events.lock().push(event); }
}

impl NextFilter for RecordingNext {
    fn message_received(&self, _session: &dyn Session, message: Payload) {
        match message {
            Payload::Bytes(buf) => self.record(Event::ReceivedBuffer(buf.as_slice().to_vec())),
            Payload::File(_) => self.record(Event::WriteFile),
            other => {
                let text = other
                    .downcast::<String>()
                    .expect("decoded messages in these tests are Strings");
                self.record(Event::Received(text));
            }
        }
    }

    fn message_sent(&self, _session: &dyn Session, request: WriteRequest) {
        self.record(Event::Sent {
            registered: request.is_registered(),
        });
    }

    fn filter_write(&self, _session: &dyn Session, request: WriteRequest) {
        self.write_futures.lock().push(request.future());
        match request.message() {
            Payload::Bytes(buf) => self.record(Event::Write(buf.as_slice().to_vec())),
            Payload::File(_) => self.record(Event::WriteFile),
            Payload::Value(_) => panic!("unencoded message forwarded downstream"),
        }
    }

    fn exception_caught(&self, _session: &dyn Session, error: CodecError) {
        let CodecError::Decode(error) = error else {
            panic!("only decode errors reach exception_caught in these tests");
        };
        self.record(Event::DecodeFailure {
            hexdump: error.hexdump().map(str::to_owned),
            recoverable: error.is_recoverable(),
        });
    }

    fn session_closed(&self, _session: &dyn Session) { self.record(Event::Closed); }
}

/// Chain double: tracks attached filter ids for the duplicate-add guard.
pub struct TestChain {
    session: Arc<TestSession>,
    attached: Mutex<Vec<FilterId>>,
}

impl TestChain {
    pub fn new(session: Arc<TestSession>) -> Self {
        Self {
            session,
            attached: Mutex::new(Vec::new()),
        }
    }

    /// Attach `filter`, registering its id on success as a runtime would.
    pub fn add(&self, filter: &framegate::CodecFilter) -> Result<(), framegate::UsageError> {
        filter.on_added(self)?;
        self.attached.lock().push(filter.id());
        Ok(())
    }
}

impl FilterChain for TestChain {
    fn session(&self) -> &dyn Session { self.session.as_ref() }

    fn contains(&self, filter: FilterId) -> bool { self.attached.lock().contains(&filter) }
}

/// Encode a `u16`-length-prefixed frame.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = u16::try_from(payload.len())
        .expect("test frame fits a u16 length")
        .to_be_bytes()
        .to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

/// Decoder that fails on a `0xFF` marker byte, optionally consuming it, and
/// otherwise defers to the length-prefixed decoder.
#[derive(Clone, Debug)]
pub struct MarkerDecoder {
    inner: LengthPrefixedDecoder,
    consume_marker: bool,
}

impl MarkerDecoder {
    pub fn consuming() -> Self {
        Self {
            inner: LengthPrefixedDecoder::new(),
            consume_marker: true,
        }
    }

    pub fn stalling() -> Self {
        Self {
            inner: LengthPrefixedDecoder::new(),
            consume_marker: false,
        }
    }
}

impl ProtocolDecoder for MarkerDecoder {
    fn decode(
        &mut self,
        session: &dyn Session,
        input: &mut ByteBuf,
        out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        if input.as_slice().first() == Some(&0xFF) {
            if self.consume_marker {
                input.advance(1);
            }
            return Err(DecodeError::recoverable("marker byte in stream"));
        }
        self.inner.decode(session, input, out)
    }
}

/// Decoder that always fails without recovery and without consuming input.
#[derive(Clone, Debug, Default)]
pub struct PoisonedDecoder;

impl ProtocolDecoder for PoisonedDecoder {
    fn decode(
        &mut self,
        _session: &dyn Session,
        _input: &mut ByteBuf,
        _out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        Err(DecodeError::new("poisoned"))
    }
}

/// Decoder that buffers everything and emits the accumulated text only at
/// end of stream.
#[derive(Clone, Debug, Default)]
pub struct TailDecoder {
    pending: Vec<u8>,
}

impl ProtocolDecoder for TailDecoder {
    fn decode(
        &mut self,
        _session: &dyn Session,
        input: &mut ByteBuf,
        _out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        self.pending.extend_from_slice(input.as_slice());
        input.advance(input.remaining());
        Ok(())
    }

    fn finish_decode(
        &mut self,
        _session: &dyn Session,
        out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8(std::mem::take(&mut self.pending))
            .map_err(|e| DecodeError::new(format!("tail is not UTF-8: {e}")))?;
        out.write(Payload::value(text));
        Ok(())
    }
}

/// Decoder that consumes one complete frame per call and moves the session
/// to a new worker after the first one, so the read loop observes a
/// mid-decode realignment.
pub struct RealigningDecoder {
    session: Arc<TestSession>,
    realigned: bool,
}

impl RealigningDecoder {
    pub fn new(session: Arc<TestSession>) -> Self {
        Self {
            session,
            realigned: false,
        }
    }
}

impl ProtocolDecoder for RealigningDecoder {
    fn decode(
        &mut self,
        _session: &dyn Session,
        input: &mut ByteBuf,
        out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        let bytes = input.as_slice();
        if bytes.len() < 2 {
            return Err(DecodeError::new("truncated frame"));
        }
        let len = usize::from(u16::from_be_bytes([bytes[0], bytes[1]]));
        if bytes.len() < 2 + len {
            return Err(DecodeError::new("truncated frame"));
        }
        let text = String::from_utf8(bytes[2..2 + len].to_vec())
            .map_err(|e| DecodeError::new(format!("frame is not UTF-8: {e}")))?;
        input.advance(2 + len);
        out.write(Payload::value(text));

        if !self.realigned {
            self.realigned = true;
            self.session.realign();
        }
        Ok(())
    }
}

/// Codec pair counting `dispose` calls; the decoder can be made to fail its
/// dispose to exercise teardown isolation.
#[derive(Clone, Default)]
pub struct DisposalProbe {
    pub encoder_disposed: Arc<AtomicUsize>,
    pub decoder_disposed: Arc<AtomicUsize>,
    pub fail_decoder_dispose: bool,
}

#[derive(Clone)]
pub struct ProbedEncoder(pub DisposalProbe);

impl ProtocolEncoder for ProbedEncoder {
    fn encode(
        &mut self,
        _session: &dyn Session,
        _message: Payload,
        _out: &mut EncoderOutput,
    ) -> Result<(), EncodeError> {
        Ok(())
    }

    fn dispose(&mut self, _session: &dyn Session) -> Result<(), framegate::BoxError> {
        self.0.encoder_disposed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone)]
pub struct ProbedDecoder(pub DisposalProbe, pub TailDecoder);

impl ProtocolDecoder for ProbedDecoder {
    fn decode(
        &mut self,
        session: &dyn Session,
        input: &mut ByteBuf,
        out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        self.1.decode(session, input, out)
    }

    fn finish_decode(
        &mut self,
        session: &dyn Session,
        out: &mut DecoderOutput,
    ) -> Result<(), DecodeError> {
        self.1.finish_decode(session, out)
    }

    fn dispose(&mut self, _session: &dyn Session) -> Result<(), framegate::BoxError> {
        self.0.decoder_disposed.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_decoder_dispose {
            return Err("decoder dispose failed".into());
        }
        Ok(())
    }
}
