//! Write requests and their completion futures.
//!
//! A [`WriteRequest`] bundles an outbound message with the one-shot
//! [`WriteFuture`] that reports whether the transport eventually wrote it.
//! The codec filter replaces the request's message with its encoded form
//! while the future travels along untouched, so completion reaches the
//! original issuer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::buffer::ByteBuf;
use crate::message::Payload;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Completion {
    Pending,
    Written,
    Failed,
}

struct FutureInner {
    state: Mutex<Completion>,
    done: Condvar,
}

/// One-shot completion signal for a write.
///
/// Clones share the same cell; completing any clone wakes every waiter.
#[derive(Clone)]
pub struct WriteFuture(Arc<FutureInner>);

impl WriteFuture {
    /// Create an unresolved future.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(FutureInner {
            state: Mutex::new(Completion::Pending),
            done: Condvar::new(),
        }))
    }

    /// Mark the write as successfully flushed to the transport.
    ///
    /// Resolving an already-resolved future is a no-op.
    pub fn set_written(&self) { self.complete(Completion::Written); }

    /// Mark the write as failed.
    pub fn fail(&self) { self.complete(Completion::Failed); }

    fn complete(&self, outcome: Completion) {
        let mut state = self.0.state.lock();
        if *state == Completion::Pending {
            *state = outcome;
            self.0.done.notify_all();
        }
    }

    /// Block until the future resolves.
    pub fn await_uninterruptibly(&self) {
        let mut state = self.0.state.lock();
        while *state == Completion::Pending {
            self.0.done.wait(&mut state);
        }
    }

    /// Block until the future resolves or `timeout` elapses; returns whether
    /// it resolved.
    #[must_use]
    pub fn await_timeout(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut state = self.0.state.lock();
        while *state == Completion::Pending {
            if self.0.done.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        *state != Completion::Pending
    }

    /// Whether the write completed successfully.
    #[must_use]
    pub fn is_written(&self) -> bool { *self.0.state.lock() == Completion::Written }

    /// Whether the future has resolved at all.
    #[must_use]
    pub fn is_done(&self) -> bool { *self.0.state.lock() != Completion::Pending }
}

impl Default for WriteFuture {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for WriteFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("WriteFuture").field(&*self.0.state.lock()).finish()
    }
}

/// An outbound message paired with its completion future.
#[derive(Debug)]
pub struct WriteRequest {
    message: Payload,
    future: WriteFuture,
    registered: bool,
}

impl WriteRequest {
    /// Create a request with a fresh future.
    #[must_use]
    pub fn new(message: Payload) -> Self { Self::with_future(message, WriteFuture::new()) }

    /// Create a request completing the given future.
    #[must_use]
    pub fn with_future(message: Payload, future: WriteFuture) -> Self {
        Self {
            message,
            future,
            registered: false,
        }
    }

    /// The distinguished sentinel announcing that the session has just been
    /// (re)registered with a worker.
    ///
    /// The runtime dispatches it as a `message_sent` event; the codec filter
    /// reacts by flushing decoded messages parked while the session had no
    /// worker.
    #[must_use]
    pub fn registered() -> Self {
        Self {
            message: Payload::Bytes(ByteBuf::new()),
            future: WriteFuture::new(),
            registered: true,
        }
    }

    /// Whether this request is the worker-registration sentinel.
    #[must_use]
    pub fn is_registered(&self) -> bool { self.registered }

    /// The message to be written.
    #[must_use]
    pub fn message(&self) -> &Payload { &self.message }

    /// Replace the message, keeping the future.
    pub fn set_message(&mut self, message: Payload) { self.message = message; }

    /// A handle to the completion future.
    #[must_use]
    pub fn future(&self) -> WriteFuture { self.future.clone() }

    /// Split the request into its message and future.
    #[must_use]
    pub fn into_parts(self) -> (Payload, WriteFuture) { (self.message, self.future) }
}

#[cfg(test)]
#[path = "write_tests.rs"]
mod tests;
