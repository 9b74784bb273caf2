//! Transaction state as tracked by the coordinator.

use std::time::Duration;

use crate::msg::error::TransportError;
use crate::util::Endpoint;

/// Where a transaction stands in its lifecycle, as reported by the
/// messenger through a completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranState {
    /// Allocated but not yet handed to the messenger for sending.
    Init,
    /// The outbound send completed.
    Sent,
    /// An inbound message (or transport error) was received.
    Recv,
}

/// The result of a transaction, once it has something to report.
///
/// Replaces the sentinel-pointer encoding a C callback contract would use
/// (a magic range of pointer values standing in for an error code) with an
/// ordinary sum type.
#[derive(Debug, Clone)]
pub enum Outcome<Msg> {
    /// No result yet; still outstanding.
    Pending,
    /// An inbound message arrived.
    Message(Msg),
    /// The messenger reported a transport failure instead of a message.
    Error(TransportError),
}

impl<Msg> Outcome<Msg> {
    /// True if the transaction is still waiting on a result.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A snapshot of one transaction's bookkeeping, as visible to the caller
/// through [`crate::msg::bsend::Bsend::get_transaction`].
#[derive(Debug, Clone)]
pub struct Transaction<Msg> {
    /// The peer this transaction talks to.
    pub endpoint: Endpoint,
    /// The timeout the transaction was added with.
    pub timeout: Duration,
    /// Current lifecycle state.
    pub state: TranState,
    /// Current result, if any.
    pub outcome: Outcome<Msg>,
}
