//! Filter-chain capability traits.
//!
//! The chain itself (ordering, dispatch, attachment) belongs to the
//! embedding runtime. The filter consumes two views of it: [`NextFilter`],
//! its immediate successor's event surface, and [`FilterChain`], the
//! attachment context handed to lifecycle callbacks.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::CodecError;
use crate::message::Payload;
use crate::session::Session;
use crate::write::WriteRequest;

/// Process-unique identity of a filter instance.
///
/// Chains record the ids of attached filters so that re-adding the same
/// instance can be refused; two instances of the same filter type have
/// distinct ids and coexist on one chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterId(u64);

impl FilterId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A filter's view of its successor in the chain.
///
/// Implemented by the embedding runtime; every event the codec filter
/// produces is delivered through one of these methods.
pub trait NextFilter: Send + Sync {
    /// An inbound message has been produced for the next filter.
    fn message_received(&self, session: &dyn Session, message: Payload);

    /// A write request has completed at the transport.
    fn message_sent(&self, session: &dyn Session, request: WriteRequest);

    /// An outbound write request is travelling towards the transport.
    fn filter_write(&self, session: &dyn Session, request: WriteRequest);

    /// An error occurred that should be surfaced without aborting dispatch.
    fn exception_caught(&self, session: &dyn Session, error: CodecError);

    /// The session has been closed.
    fn session_closed(&self, session: &dyn Session);
}

/// Attachment context passed to filter lifecycle callbacks.
pub trait FilterChain {
    /// The session this chain serves.
    fn session(&self) -> &dyn Session;

    /// Whether a filter with the given identity is already attached.
    fn contains(&self, filter: FilterId) -> bool;
}
