//! Session capability surface consumed by the filter.
//!
//! A session is owned by the embedding transport; the filter only observes
//! it. The one non-obvious member is the worker token: the runtime may hand a
//! session to a different worker between (or during) events, and the filter
//! checkpoints the token to detect that and yield.

/// Identifier assigned to a session by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl From<u64> for SessionId {
    fn from(value: u64) -> Self { Self(value) }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle naming the worker currently responsible for a session.
///
/// Tokens are compared for equality only; the runtime updates a session's
/// token when it moves the session to another worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerToken(u64);

impl From<u64> for WorkerToken {
    fn from(value: u64) -> Self { Self(value) }
}

/// Read-only view of a session, implemented by the embedding runtime.
pub trait Session: Send + Sync {
    /// Transport-assigned identifier.
    fn id(&self) -> SessionId;

    /// Whether the underlying connection is still open.
    fn is_connected(&self) -> bool;

    /// Token of the worker currently owning this session.
    fn worker_token(&self) -> WorkerToken;

    /// Whether the session is currently registered with a worker at all.
    ///
    /// Between deregistration and re-registration no worker may dispatch
    /// events for the session; pending decoded messages stay parked until
    /// the registered sentinel arrives.
    fn is_worker_registered(&self) -> bool;
}
