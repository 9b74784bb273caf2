//! Coordinator sizing limits.
//!
//! This is deliberately small: the coordinator has no daemon bootstrap of
//! its own (no file parsing, no environment layering), so there is nothing
//! here beyond the handful of values a host application would fold into
//! its own configuration and hand to [`crate::msg::Bsend::new`] and
//! [`crate::msg::FastLogBuf::new`].

use serde::Deserialize;

/// Sizing limits for a [`crate::msg::Bsend`] context and its fast-log
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BsendLimits {
    /// Maximum number of concurrent transactions a context can hold.
    pub max_tr: usize,
    /// Capacity of the fast-log ring buffer.
    pub log_capacity: usize,
}

impl BsendLimits {
    /// A reasonable default: room for 32 concurrent transactions and a
    /// log buffer deep enough to cover a handful of batches.
    pub const DEFAULT: Self = Self {
        max_tr: 32,
        log_capacity: 256,
    };
}

impl Default for BsendLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}
