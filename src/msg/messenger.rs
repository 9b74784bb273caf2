//! The callback-driven, non-blocking transport the coordinator is built on
//! top of.
//!
//! A [`Messenger`] never blocks the calling thread: `send` and `recv_next`
//! hand work off to the messenger's own I/O machinery and return
//! immediately, with results delivered later through a [`CallbackToken`].
//! The coordinator in [`crate::msg::bsend`] is the thing that turns this
//! asynchronous contract into a blocking `join`.

use std::sync::Arc;
use std::time::Duration;

use crate::msg::bsend::Bsend;
use crate::msg::transaction::{Outcome, TranState};

/// A non-blocking transport capable of sending a message to a peer and
/// receiving one back.
///
/// `Handle` is whatever the messenger uses to track a transaction
/// internally (a socket, a connection id, ...). It is owned by the slot
/// that allocated it and is dropped — and so released, however the
/// messenger defines that — when the slot is cleared by
/// [`Bsend::reset`][crate::msg::bsend::Bsend::reset] or when allocation
/// succeeds but the slot table turns out to be full. No separate
/// `free_transaction` call is needed: ordinary `Drop` plays that role.
pub trait Messenger: Sized {
    /// The message payload type exchanged with peers.
    type Msg;
    /// An opaque, caller-defined value carried alongside a transaction.
    type Tag;
    /// The messenger's own per-transaction bookkeeping handle.
    ///
    /// Owned solely by the slot that allocated it: `send` and `recv_next`
    /// only ever see it by reference, so a messenger can attach `Drop`
    /// semantics (closing a socket, releasing a buffer) without the
    /// coordinator risking an extra, premature release through a clone.
    type Handle;

    /// Allocates a fresh transaction handle, or returns `None` if the
    /// messenger has exhausted its own resources (too many open
    /// connections, no free buffers, ...).
    fn allocate_transaction(&self) -> Option<Self::Handle>;

    /// Hands a message off to the messenger for sending. Completion is
    /// reported later through `token`.
    fn send(&self, handle: &Self::Handle, msg: Self::Msg, timeout: Duration, token: CallbackToken<Self>);

    /// Asks the messenger to keep listening for a response on a
    /// transaction that has already sent its outbound message.
    /// Completion is reported later through `token`.
    fn recv_next(&self, handle: &Self::Handle, token: CallbackToken<Self>);
}

/// A message type that can report its own wire type, and synthesize a
/// minimal status reply, for the logging and reply helpers in
/// [`crate::msg::reply`].
pub trait WireMessage: Sized {
    /// The message's 16-bit wire type field.
    fn message_type(&self) -> u16;

    /// Builds a minimal reply carrying a signed status code, or `None` if
    /// the messenger's allocator has no room for one.
    fn status_reply(code: i32) -> Option<Self>;
}

/// A handle back to the slot a completion callback belongs to.
///
/// Replaces the raw back-pointer a C callback would carry as `priv` with
/// an index into the coordinator's slot table, a generation counter that
/// detects callbacks arriving after a `reset`, and a strong reference to
/// the coordinator itself so the slot it names cannot be dropped out from
/// under a late callback.
pub struct CallbackToken<M: Messenger> {
    pub(crate) ctx: Arc<Bsend<M>>,
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl<M: Messenger> Clone for CallbackToken<M> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            index: self.index,
            generation: self.generation,
        }
    }
}

impl<M: Messenger> CallbackToken<M> {
    /// Reports a transaction's new state and outcome back to the
    /// coordinator that issued this token.
    ///
    /// Messengers call this once for the outbound send, and again for the
    /// inbound response if the transaction expects one. The token may be
    /// reused across both calls.
    pub fn complete(&self, messenger: &M, state: TranState, outcome: Outcome<M::Msg>) {
        self.ctx.on_completion(messenger, self.clone(), state, outcome);
    }
}
