//! Blocking batch-RPC coordinator for a callback-driven messenger.
//!
//! [`msg::Bsend`] lets a caller fan out up to a fixed number of concurrent
//! request/response (or one-way) transactions to peers through a
//! non-blocking [`msg::Messenger`] transport, then block on
//! [`msg::Bsend::join`] until every one of them reaches a terminal state.
//! [`msg::bsend_reply`] and [`msg::bsend_std_reply`] build one-way
//! responses on top of the same machinery.
//!
//! [`config::BsendLimits`] holds the sizing knobs a host application wires
//! up when constructing a context; this crate has no daemon bootstrap of
//! its own.

#![cfg_attr(test, expect(clippy::unwrap_used, reason = "test code can panic"))]
#![cfg_attr(test, expect(clippy::expect_used, reason = "test code can panic"))]
#![cfg_attr(
    test,
    expect(clippy::indexing_slicing, reason = "test code with known bounds")
)]
#![cfg_attr(test, expect(clippy::shadow_reuse, reason = "test code shadowing"))]
#![cfg_attr(
    test,
    expect(clippy::let_underscore_must_use, reason = "test cleanup code")
)]
#![cfg_attr(
    test,
    expect(clippy::unneeded_field_pattern, reason = "test pattern matching")
)]

pub mod config;
pub mod msg;
pub mod util;
