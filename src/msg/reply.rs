//! One-way reply helpers built on top of [`Bsend`].
//!
//! Both helpers reuse the inbound request's transaction handle to send a
//! response back on the same connection, wait for the send to finish, and
//! reset the context so it is ready to be reused for the next request.

use std::sync::Arc;
use std::time::Duration;

use crate::msg::bsend::Bsend;
use crate::msg::error::BsendError;
use crate::msg::fast_log::{EventKind, FastLogBsendEvent};
use crate::msg::flags::BsendFlags;
use crate::msg::messenger::{Messenger, WireMessage};
use crate::msg::transaction::Outcome;
use crate::util::Endpoint;

/// The wire type logged for `bsend_std_reply` failures that never got far
/// enough to build a real response (the messenger's allocator had nothing
/// to give).
const STD_REPLY_FAILURE_TYPE: u16 = 0;

/// Sends `response` back to `endpoint` over `handle`, blocks until it is
/// sent, and resets `ctx` for reuse.
///
/// # Errors
///
/// Returns [`BsendError::TooManyTransactions`] if `ctx`'s single reply slot
/// is somehow already occupied, or [`BsendError::Transport`] if the
/// messenger reports a transport failure instead of completing the send —
/// in which case the failure is also recorded on `log` as a `ReplyFail`
/// event.
///
/// # Panics
///
/// Panics if the reply transaction, which is one-way, is ever reported as
/// having received a response: that would be a messenger contract
/// violation, not a recoverable error.
#[expect(
    clippy::panic_in_result_fn,
    reason = "the panic documented above is a messenger contract violation, not one of this function's recoverable error cases"
)]
pub fn bsend_reply<M>(
    log: &Arc<crate::msg::fast_log::FastLogBuf>,
    ctx: &Arc<Bsend<M>>,
    messenger: &M,
    endpoint: Endpoint,
    handle: M::Handle,
    response: M::Msg,
) -> Result<(), BsendError>
where
    M: Messenger,
    M::Msg: WireMessage + Clone,
    M::Tag: Default,
{
    let ty = response.message_type();
    ctx.add_transaction(messenger, BsendFlags::empty(), response, handle, endpoint, Duration::ZERO, M::Tag::default())?;
    ctx.join();
    let Some(outcome) = ctx.get_transaction(0).map(|tr| tr.outcome) else {
        ctx.reset();
        return Ok(());
    };
    let result = match outcome {
        Outcome::Pending => Ok(()),
        Outcome::Message(_) => {
            panic!("bsend_reply: contract violation - a one-way reply transaction received a response")
        }
        Outcome::Error(err) => {
            log.push(FastLogBsendEvent::error(EventKind::ReplyFail, endpoint, BsendFlags::empty(), crate::util::cram_into_u16(err.code()), u32::from(ty)));
            tracing::error!(peer_ip = endpoint.ip, peer_port = endpoint.port, error = err.code(), ty, "bsend reply failed");
            Err(BsendError::Transport(err))
        }
    };
    ctx.reset();
    result
}

/// Convenience wrapper over [`bsend_reply`] that synthesizes a minimal
/// status-code response via [`WireMessage::status_reply`].
///
/// # Errors
///
/// Returns [`BsendError::NoMemory`] if the messenger's allocator has no
/// room for the status response (logged as a `ReplyFail` event), or
/// whatever [`bsend_reply`] itself returns once the response has been
/// built.
pub fn bsend_std_reply<M>(
    log: &Arc<crate::msg::fast_log::FastLogBuf>,
    ctx: &Arc<Bsend<M>>,
    messenger: &M,
    endpoint: Endpoint,
    handle: M::Handle,
    status: i32,
) -> Result<(), BsendError>
where
    M: Messenger,
    M::Msg: WireMessage + Clone,
    M::Tag: Default,
{
    let Some(response) = M::Msg::status_reply(status) else {
        log.push(FastLogBsendEvent::error(
            EventKind::ReplyFail,
            endpoint,
            BsendFlags::empty(),
            crate::util::cram_into_u16(BsendError::NoMemory.errno()),
            u32::from(STD_REPLY_FAILURE_TYPE),
        ));
        tracing::error!(peer_ip = endpoint.ip, peer_port = endpoint.port, status, "bsend_std_reply: response allocation failed");
        drop(handle);
        return Err(BsendError::NoMemory);
    };
    bsend_reply(log, ctx, messenger, endpoint, handle, response)
}
