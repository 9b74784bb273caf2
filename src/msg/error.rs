//! Error taxonomy for the batch-RPC coordinator.

use thiserror::Error;

use crate::util::errno::{EINVAL, EMFILE, ENOMEM};

/// A transport-level failure reported by a messenger through a completion
/// callback, carrying the POSIX-style error code the messenger chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportError(pub i32);

impl TransportError {
    /// The raw error code, as the messenger reported it.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }
}

/// Failure modes of the coordinator itself, as distinct from per-transaction
/// [`TransportError`]s delivered through completion callbacks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BsendError {
    /// `max_tr` was zero; a context needs room for at least one slot.
    #[error("bsend context requires a positive slot capacity")]
    InvalidCapacity,
    /// The messenger declined to allocate a transaction.
    #[error("messenger could not allocate a transaction")]
    NoMemory,
    /// The slot table is already holding `max_tr` transactions.
    #[error("bsend slot table is full")]
    TooManyTransactions,
    /// A reply transaction completed with a transport error, which
    /// `bsend_reply` surfaces to its caller instead of swallowing.
    #[error("reply transaction failed: {0:?}")]
    Transport(TransportError),
}

impl BsendError {
    /// The POSIX-style error number a caller should report for this
    /// failure, mirroring the errno-return convention the rest of the
    /// system uses.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::InvalidCapacity => EINVAL,
            Self::NoMemory => ENOMEM,
            Self::TooManyTransactions => EMFILE,
            Self::Transport(err) => err.code(),
        }
    }
}
