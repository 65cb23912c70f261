//! Ordered sink for messages produced by a decoder.

use std::collections::VecDeque;

use log::trace;

use crate::chain::NextFilter;
use crate::message::Payload;
use crate::session::Session;

/// FIFO queue of decoded messages awaiting delivery to the next filter.
///
/// The decoder writes into the queue; [`flush`](Self::flush) drains it as
/// `message_received` events. Messages survive in the queue across a worker
/// change: the outgoing worker stops draining the moment the session's
/// worker token moves on, and the incoming worker resumes from the same
/// position, so delivery order is preserved end to end.
///
/// Callers serialise access through the filter's per-session lock; the queue
/// itself carries no synchronisation.
#[derive(Debug, Default)]
pub struct DecoderOutput {
    queue: VecDeque<Payload>,
}

impl DecoderOutput {
    pub(crate) fn new() -> Self { Self::default() }

    /// Enqueue a decoded message.
    pub fn write(&mut self, message: Payload) {
        crate::metrics::message_decoded();
        self.queue.push_back(message);
    }

    /// Number of messages awaiting delivery.
    #[must_use]
    pub fn len(&self) -> usize { self.queue.len() }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.queue.is_empty() }

    /// Deliver queued messages to `next` in enqueue order.
    ///
    /// Returns without draining when the session has no registered worker;
    /// the messages stay parked until the registered sentinel triggers
    /// another flush. The worker token is re-checked before every message,
    /// not just at entry, because the session can move mid-flush.
    pub fn flush(&mut self, next: &dyn NextFilter, session: &dyn Session) {
        if !session.is_worker_registered() {
            return;
        }

        let worker = session.worker_token();
        while !self.queue.is_empty() {
            if session.worker_token() != worker {
                trace!(
                    "flush for session {} yields to the session's new worker",
                    session.id()
                );
                crate::metrics::realignment_yield();
                break;
            }
            let Some(message) = self.queue.pop_front() else {
                break;
            };
            next.message_received(session, message);
        }
    }
}

#[cfg(test)]
#[path = "decoder_output_tests.rs"]
mod tests;
