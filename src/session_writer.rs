//! Blocking `std::io::Write` adapter over a session.
//!
//! [`SessionWriter`] lets stream-oriented code write to a session as if it
//! were a plain byte sink: each `write` submits a buffer down the session's
//! chain, and `flush` blocks until the most recent submission has reached
//! the transport.

use std::io;

use crate::buffer::ByteBuf;
use crate::message::Payload;
use crate::session::Session;
use crate::write::WriteFuture;

/// A session that accepts outbound messages.
///
/// Submitting a message enqueues it on the session's outbound path (the
/// chain's `filter_write` direction) and returns the future that resolves
/// when the transport has written it.
pub trait WriteSession: Session {
    /// Submit `message` for writing.
    fn write(&self, message: Payload) -> WriteFuture;
}

/// Forwards `std::io::Write` operations to a session.
///
/// Writes are submitted immediately; only `flush` waits. The last write
/// future is retained so `flush` observes the newest submission, which by
/// the session's ordered write queue implies all earlier ones.
pub struct SessionWriter<'a, S: WriteSession + ?Sized> {
    session: &'a S,
    last_write: Option<WriteFuture>,
}

impl<'a, S: WriteSession + ?Sized> SessionWriter<'a, S> {
    /// Wrap `session` in a writer.
    #[must_use]
    pub fn new(session: &'a S) -> Self {
        Self {
            session,
            last_write: None,
        }
    }

    fn check_open(&self) -> io::Result<()> {
        if self.session.is_connected() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "the session has been closed",
            ))
        }
    }
}

impl<S: WriteSession + ?Sized> io::Write for SessionWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_open()?;
        if buf.is_empty() {
            return Ok(0);
        }
        let future = self
            .session
            .write(Payload::Bytes(ByteBuf::from_slice(buf)));
        self.last_write = Some(future);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let Some(future) = &self.last_write else {
            return Ok(());
        };
        future.await_uninterruptibly();
        if future.is_written() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "the bytes could not be written to the session",
            ))
        }
    }
}

impl<S: WriteSession + ?Sized> std::fmt::Debug for SessionWriter<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWriter")
            .field("session", &self.session.id())
            .field("pending", &self.last_write.is_some())
            .finish()
    }
}
