//! Optional convenience imports for common codec-filter workflows.
//!
//! This module is intentionally small and focused on high-frequency types.
//! Prefer importing specialised APIs directly from their owning modules.
//!
//! # Examples
//!
//! ```rust
//! use framegate::prelude::*;
//!
//! fn build() -> CodecFilter {
//!     CodecFilter::from_default::<
//!         framegate::codec::examples::LengthPrefixedEncoder,
//!         framegate::codec::examples::LengthPrefixedDecoder,
//!     >()
//! }
//! # let _ = build();
//! ```

pub use crate::{
    buffer::ByteBuf,
    chain::{FilterChain, NextFilter},
    codec::{
        CodecFactory,
        DecodeError,
        DecoderOutput,
        EncodeError,
        EncoderOutput,
        ProtocolDecoder,
        ProtocolEncoder,
    },
    error::CodecError,
    filter::CodecFilter,
    message::Payload,
    session::Session,
    write::{WriteFuture, WriteRequest},
};
