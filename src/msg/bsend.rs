//! Blocking batch-RPC coordinator.
//!
//! [`Bsend`] lets a caller fan out up to `max_tr` concurrent transactions
//! through a [`Messenger`] and then block on [`Bsend::join`] until every one
//! of them reaches a terminal state. The messenger itself never blocks;
//! `join` is where the asynchronous, callback-driven transport is turned
//! into an ordinary blocking call.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::msg::error::BsendError;
use crate::msg::fast_log::{EventKind, FastLogBsendEvent, FastLogBuf, Severity};
use crate::msg::flags::BsendFlags;
use crate::msg::messenger::{CallbackToken, Messenger};
use crate::msg::transaction::{Outcome, TranState, Transaction};
use crate::util::cram_into_u16;
use crate::util::Endpoint;

struct Slot<M: Messenger> {
    handle: M::Handle,
    tag: M::Tag,
    flags: BsendFlags,
    transaction: Transaction<M::Msg>,
}

struct Inner<M: Messenger> {
    slots: Vec<Option<Slot<M>>>,
    num_tr: usize,
    num_finished: usize,
    generation: u64,
}

/// A batch of up to `max_tr` concurrent transactions, joined with a single
/// blocking call.
///
/// Always held behind an `Arc`: completion callbacks carry a strong
/// reference back to their owning context (see [`CallbackToken`]), so the
/// context cannot be dropped while a callback might still arrive for it.
pub struct Bsend<M: Messenger> {
    inner: Mutex<Inner<M>>,
    cond: Condvar,
    log: Arc<FastLogBuf>,
    max_tr: usize,
}

impl<M: Messenger> Bsend<M> {
    /// Creates a new context with room for `max_tr` concurrent
    /// transactions, logging to `log`.
    ///
    /// # Errors
    ///
    /// Returns [`BsendError::InvalidCapacity`] if `max_tr` is zero.
    pub fn new(log: &Arc<FastLogBuf>, max_tr: usize) -> Result<Arc<Self>, BsendError> {
        if max_tr == 0 {
            log.push(FastLogBsendEvent::error(
                EventKind::Init,
                Endpoint::UNSPECIFIED,
                BsendFlags::empty(),
                cram_into_u16(BsendError::InvalidCapacity.errno()),
                0,
            ));
            tracing::error!("bsend_init: max_tr must be positive");
            return Err(BsendError::InvalidCapacity);
        }
        let slots = (0..max_tr).map(|_| None).collect();
        let ctx = Arc::new(Self {
            inner: Mutex::new(Inner {
                slots,
                num_tr: 0,
                num_finished: 0,
                generation: 0,
            }),
            cond: Condvar::new(),
            log: Arc::clone(log),
            max_tr,
        });
        ctx.log_debug(EventKind::Init, Endpoint::UNSPECIFIED, BsendFlags::empty(), usize_to_aux(max_tr));
        Ok(ctx)
    }

    /// Allocates a fresh transaction from `messenger` and adds it to this
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns [`BsendError::NoMemory`] if the messenger has no transaction
    /// to give, or [`BsendError::TooManyTransactions`] if the slot table is
    /// already full.
    pub fn add(
        self: &Arc<Self>,
        messenger: &M,
        flags: BsendFlags,
        msg: M::Msg,
        endpoint: Endpoint,
        timeout: Duration,
        tag: M::Tag,
    ) -> Result<(), BsendError> {
        let Some(handle) = messenger.allocate_transaction() else {
            self.log_error(EventKind::AddTr, endpoint, flags, BsendError::NoMemory.errno(), 0);
            return Err(BsendError::NoMemory);
        };
        self.add_transaction(messenger, flags, msg, handle, endpoint, timeout, tag)
    }

    /// Adds an already-allocated transaction handle to this batch.
    ///
    /// Used directly by [`crate::msg::reply::bsend_reply`], which reuses
    /// the inbound request's handle to send a response on the same
    /// connection rather than allocating a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`BsendError::TooManyTransactions`] if the slot table is
    /// already full. On that path `handle` is dropped, releasing whatever
    /// the messenger attached to it.
    pub fn add_transaction(
        self: &Arc<Self>,
        messenger: &M,
        flags: BsendFlags,
        msg: M::Msg,
        handle: M::Handle,
        endpoint: Endpoint,
        timeout: Duration,
        tag: M::Tag,
    ) -> Result<(), BsendError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.num_tr >= self.max_tr {
            drop(inner);
            drop(handle);
            self.log_error(EventKind::AddTr, endpoint, flags, BsendError::TooManyTransactions.errno(), usize_to_aux(self.max_tr));
            return Err(BsendError::TooManyTransactions);
        }
        let index = inner.num_tr;
        let generation = inner.generation;
        let slot = Slot {
            handle,
            tag,
            flags,
            transaction: Transaction {
                endpoint,
                timeout,
                state: TranState::Init,
                outcome: Outcome::Pending,
            },
        };
        if let Some(existing) = inner.slots.get_mut(index) {
            *existing = Some(slot);
        }
        inner.num_tr += 1;
        let token = CallbackToken {
            ctx: Arc::clone(self),
            index,
            generation,
        };
        if let Some(slot) = inner.slots.get(index).and_then(Option::as_ref) {
            messenger.send(&slot.handle, msg, timeout, token);
        }
        drop(inner);
        self.log_debug(EventKind::AddTr, endpoint, flags, usize_to_aux(index + 1));
        Ok(())
    }

    /// Blocks until every transaction added so far has reached a terminal
    /// state, and returns how many were waited on.
    #[must_use]
    pub fn join(&self) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        while inner.num_finished < inner.num_tr {
            let outstanding = inner.num_tr - inner.num_finished;
            self.log_debug(EventKind::Join, Endpoint::UNSPECIFIED, BsendFlags::empty(), usize_to_aux(outstanding));
            inner = self.cond.wait(inner).unwrap_or_else(PoisonError::into_inner);
        }
        let num_tr = inner.num_tr;
        drop(inner);
        self.log_debug(EventKind::Join, Endpoint::UNSPECIFIED, BsendFlags::empty(), usize_to_aux(num_tr));
        num_tr
    }

    /// A snapshot of transaction `index`'s bookkeeping, or `None` if no
    /// transaction has been added at that index.
    #[must_use]
    pub fn get_transaction(&self, index: usize) -> Option<Transaction<M::Msg>>
    where
        M::Msg: Clone,
    {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if index >= inner.num_tr {
            return None;
        }
        inner.slots.get(index)?.as_ref().map(|slot| slot.transaction.clone())
    }

    /// The caller-supplied tag attached to transaction `index`, or `None`
    /// if no transaction has been added at that index.
    #[must_use]
    pub fn get_tag(&self, index: usize) -> Option<M::Tag>
    where
        M::Tag: Clone,
    {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if index >= inner.num_tr {
            return None;
        }
        inner.slots.get(index)?.as_ref().map(|slot| slot.tag.clone())
    }

    /// How many transactions have been added to this batch so far.
    #[must_use]
    pub fn get_num_sent(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).num_tr
    }

    /// The batch's slot capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.max_tr
    }

    /// Clears every slot and makes the context ready to accept a new batch.
    ///
    /// # Panics
    ///
    /// Panics if called while transactions are still outstanding
    /// (`num_finished != num_tr`): resetting a batch that a messenger
    /// thread might still be delivering callbacks for would hand out a
    /// slot index that's still live, so this is treated as a caller
    /// contract violation rather than logged and ignored.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        assert!(
            inner.num_finished == inner.num_tr,
            "bsend_reset called with {} of {} transactions still outstanding",
            inner.num_tr - inner.num_finished,
            inner.num_tr,
        );
        for slot in &mut inner.slots {
            *slot = None;
        }
        inner.num_tr = 0;
        inner.num_finished = 0;
        inner.generation = inner.generation.wrapping_add(1);
        drop(inner);
        self.log_debug(EventKind::Reset, Endpoint::UNSPECIFIED, BsendFlags::empty(), 0);
    }

    pub(crate) fn on_completion(&self, messenger: &M, token: CallbackToken<M>, state: TranState, outcome: Outcome<M::Msg>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(
            inner.generation, token.generation,
            "bsend completion callback arrived after the context was reset",
        );
        let Some(slot) = inner.slots.get_mut(token.index).and_then(Option::as_mut) else {
            panic!("bsend completion callback for an unpopulated slot");
        };
        slot.transaction.state = state;
        slot.transaction.outcome = outcome;
        let expect_response = slot.flags.contains(BsendFlags::EXPECT_RESPONSE);

        if expect_response && state == TranState::Sent && slot.transaction.outcome.is_pending() {
            messenger.recv_next(&slot.handle, token);
            return;
        }

        let finished = matches!(
            (expect_response, state),
            (true, TranState::Sent | TranState::Recv) | (false, TranState::Sent)
        );
        assert!(
            finished,
            "bsend messenger contract violation: unexpected transaction state {state:?} in completion callback (expect_response = {expect_response})",
        );
        inner.num_finished += 1;
        if inner.num_finished == inner.num_tr {
            self.cond.notify_all();
        }
    }

    fn log_debug(&self, kind: EventKind, endpoint: Endpoint, flags: BsendFlags, aux: u32) {
        self.log_event(Severity::Debug, kind, endpoint, flags, 0, aux);
    }

    fn log_error(&self, kind: EventKind, endpoint: Endpoint, flags: BsendFlags, errno: i32, aux: u32) {
        self.log_event(Severity::Error, kind, endpoint, flags, cram_into_u16(errno), aux);
    }

    fn log_event(&self, severity: Severity, kind: EventKind, endpoint: Endpoint, flags: BsendFlags, error: u16, aux: u32) {
        let event = FastLogBsendEvent {
            severity,
            kind,
            port: endpoint.port,
            ip: endpoint.ip,
            flags: flags.bits(),
            error,
            aux,
        };
        self.log.push(event);
        match severity {
            Severity::Debug => tracing::debug!(
                kind = ?kind,
                peer_ip = endpoint.ip,
                peer_port = endpoint.port,
                flags = flags.bits(),
                error,
                aux,
                "bsend event"
            ),
            Severity::Error => tracing::error!(
                kind = ?kind,
                peer_ip = endpoint.ip,
                peer_port = endpoint.port,
                flags = flags.bits(),
                error,
                aux,
                "bsend event"
            ),
        }
    }
}

impl<M: Messenger> Drop for Bsend<M> {
    fn drop(&mut self) {
        self.log_debug(EventKind::Free, Endpoint::UNSPECIFIED, BsendFlags::empty(), 0);
    }
}

#[expect(clippy::cast_possible_truncation, reason = "slot counts are bounded by max_tr, which callers size sanely")]
const fn usize_to_aux(value: usize) -> u32 {
    value as u32
}
