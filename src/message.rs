//! The message model flowing through the filter chain.
//!
//! Events carry a [`Payload`]: raw bytes on their way to or from the
//! transport, a [`FileRegion`] scheduled for zero-copy transfer, or an opaque
//! application message produced by a decoder (and consumed by an encoder).
//! The codec filter dispatches on the variant; bytes and file regions pass
//! it untouched.

use std::any::Any;
use std::path::{Path, PathBuf};

use crate::buffer::ByteBuf;

/// A region of a file queued for transfer.
///
/// The filter treats file regions as already encoded and forwards them
/// unchanged; reading and sending the region is the transport's concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRegion {
    path: PathBuf,
    position: u64,
    count: u64,
}

impl FileRegion {
    /// Describe `count` bytes of `path` starting at `position`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, position: u64, count: u64) -> Self {
        Self {
            path: path.into(),
            position,
            count,
        }
    }

    /// File the region belongs to.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Byte offset of the region within the file.
    #[must_use]
    pub fn position(&self) -> u64 { self.position }

    /// Length of the region in bytes.
    #[must_use]
    pub fn count(&self) -> u64 { self.count }
}

/// A message travelling through the chain.
pub enum Payload {
    /// Raw bytes (inbound network reads, encoded outbound writes).
    Bytes(ByteBuf),
    /// A file region scheduled for transfer.
    File(FileRegion),
    /// An opaque application message.
    Value(Box<dyn Any + Send>),
}

impl Payload {
    /// Wrap an application message.
    #[must_use]
    pub fn value<T: Any + Send>(value: T) -> Self { Self::Value(Box::new(value)) }

    /// Whether this payload is raw bytes.
    #[must_use]
    pub fn is_bytes(&self) -> bool { matches!(self, Self::Bytes(_)) }

    /// Borrow the byte buffer, if this payload is one.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&ByteBuf> {
        match self {
            Self::Bytes(buf) => Some(buf),
            _ => None,
        }
    }

    /// Borrow the application message as `T`, if this payload is one.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Value(value) => value.downcast_ref(),
            _ => None,
        }
    }

    /// Recover the application message as `T`.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged when the payload is not a `Value` of type
    /// `T`.
    pub fn downcast<T: Any + Send>(self) -> Result<T, Self> {
        match self {
            Self::Value(value) => match value.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(value) => Err(Self::Value(value)),
            },
            other => Err(other),
        }
    }
}

impl From<ByteBuf> for Payload {
    fn from(buf: ByteBuf) -> Self { Self::Bytes(buf) }
}

impl From<FileRegion> for Payload {
    fn from(region: FileRegion) -> Self { Self::File(region) }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(buf) => f.debug_tuple("Bytes").field(buf).finish(),
            Self::File(region) => f.debug_tuple("File").field(region).finish(),
            Self::Value(_) => f.write_str("Value(..)"),
        }
    }
}
