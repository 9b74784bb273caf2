//! Per-transaction flags.

use bitflags::bitflags;

bitflags! {
    /// Flags attached to a transaction at `add` time.
    ///
    /// Only one bit is defined today; the type is a byte-wide bitflag set
    /// rather than a bare `bool` so additional flags can be added without
    /// breaking callers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BsendFlags: u8 {
        /// The transaction expects an inbound response and should not be
        /// considered finished until one (or a transport error) arrives.
        /// Absent, the transaction finishes as soon as the outbound send
        /// completes.
        const EXPECT_RESPONSE = 0b0000_0001;
    }
}
