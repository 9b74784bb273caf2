//! Blocking batch-RPC coordinator built on top of a callback-driven,
//! non-blocking messenger transport.
//!
//! [`bsend::Bsend`] lets a caller fan out a batch of concurrent
//! transactions and block until every one of them finishes; the messenger
//! it is built on ([`messenger::Messenger`]) never blocks itself. See
//! [`reply`] for the one-way response helpers built on top of it.

pub mod bsend;
pub mod error;
pub mod fast_log;
pub mod flags;
pub mod messenger;
pub mod reply;
pub mod transaction;

pub use bsend::Bsend;
pub use error::{BsendError, TransportError};
pub use fast_log::{EventKind, FastLogBsendEvent, FastLogBuf, Severity};
pub use flags::BsendFlags;
pub use messenger::{CallbackToken, Messenger, WireMessage};
pub use reply::{bsend_reply, bsend_std_reply};
pub use transaction::{Outcome, TranState, Transaction};
