//! Public API for the `framegate` library.
//!
//! This crate provides a protocol codec filter for session-oriented filter
//! chains: it translates inbound byte buffers into application messages and
//! outbound messages into encoded buffers, correct under partial frames,
//! recoverable decode errors, and mid-decode reassignment of the session's
//! worker.

pub mod buffer;
pub mod chain;
pub mod codec;
pub mod error;
pub mod filter;
pub mod message;
pub mod metrics;
pub mod prelude;
pub mod session;
pub mod session_writer;
pub mod write;

pub use buffer::ByteBuf;
pub use chain::{FilterChain, FilterId, NextFilter};
pub use codec::{
    BoxError,
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
pub use error::CodecError;
pub use filter::CodecFilter;
pub use message::{FileRegion, Payload};
pub use session::{Session, SessionId, WorkerToken};
pub use session_writer::{SessionWriter, WriteSession};
pub use write::{WriteFuture, WriteRequest};
