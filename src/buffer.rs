//! Positioned byte buffers handed to decoders.
//!
//! A [`ByteBuf`] couples backing storage with a read cursor, so a decoder can
//! consume part of the available bytes and leave the rest in place for a later
//! call. The cursor is exposed directly (`position`/`set_position`) because
//! the decode loop snapshots and restores it around error reporting.

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Maximum number of bytes rendered by [`ByteBuf::hex_dump`].
///
/// Dumps attached to decode errors are truncated at this many bytes and
/// suffixed with an ellipsis, keeping error payloads bounded regardless of
/// buffer size.
pub const HEX_DUMP_LIMIT: usize = 256;

/// A byte buffer with an explicit read position.
///
/// The readable region runs from `position()` to `limit()`. Reading through
/// the [`Buf`] implementation advances the position; the backing bytes are
/// never discarded, so the position can be rewound.
#[derive(Clone, Default)]
pub struct ByteBuf {
    data: BytesMut,
    pos: usize,
}

impl ByteBuf {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a buffer holding a copy of `bytes`, positioned at the start.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            pos: 0,
        }
    }

    /// Current read position.
    #[must_use]
    pub fn position(&self) -> usize { self.pos }

    /// Move the read position.
    ///
    /// # Panics
    ///
    /// Panics if `pos` exceeds [`limit`](Self::limit).
    pub fn set_position(&mut self, pos: usize) {
        assert!(pos <= self.data.len(), "position {pos} beyond limit {}", self.data.len());
        self.pos = pos;
    }

    /// One past the last readable byte (the length of the backing storage).
    #[must_use]
    pub fn limit(&self) -> usize { self.data.len() }

    /// Whether any bytes remain between the position and the limit.
    #[must_use]
    pub fn has_remaining(&self) -> bool { self.pos < self.data.len() }

    /// The bytes between the position and the limit.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.data[self.pos..] }

    /// Append `bytes` after the limit, extending the readable region.
    pub fn put_slice(&mut self, bytes: &[u8]) { self.data.put_slice(bytes); }

    /// Render the remaining bytes as upper-case hex, space separated,
    /// truncated at [`HEX_DUMP_LIMIT`].
    ///
    /// The position is not moved.
    #[must_use]
    pub fn hex_dump(&self) -> String {
        let remaining = self.as_slice();
        let shown = &remaining[..remaining.len().min(HEX_DUMP_LIMIT)];
        let mut dump = String::with_capacity(shown.len() * 3 + 3);
        for (i, byte) in shown.iter().enumerate() {
            if i > 0 {
                dump.push(' ');
            }
            dump.push_str(&format!("{byte:02X}"));
        }
        if remaining.len() > HEX_DUMP_LIMIT {
            dump.push_str("...");
        }
        dump
    }
}

impl Buf for ByteBuf {
    fn remaining(&self) -> usize { self.data.len() - self.pos }

    fn chunk(&self) -> &[u8] { self.as_slice() }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.remaining(),
            "cannot advance past limit: {cnt} > {}",
            self.remaining()
        );
        self.pos += cnt;
    }
}

impl From<BytesMut> for ByteBuf {
    fn from(data: BytesMut) -> Self { Self { data, pos: 0 } }
}

impl From<Bytes> for ByteBuf {
    fn from(data: Bytes) -> Self { Self::from_slice(&data) }
}

impl From<Vec<u8>> for ByteBuf {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data: BytesMut::from(&data[..]),
            pos: 0,
        }
    }
}

impl std::fmt::Debug for ByteBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuf")
            .field("position", &self.pos)
            .field("limit", &self.data.len())
            .finish()
    }
}

/// Equality compares the remaining bytes, position-relative.
impl PartialEq for ByteBuf {
    fn eq(&self, other: &Self) -> bool { self.as_slice() == other.as_slice() }
}

impl Eq for ByteBuf {}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
