//! Saturating narrowing of error codes for the fast-log wire format.
//!
//! The fast-log event layout budgets sixteen bits for an error code. Real
//! errno values never come close to that range, but the conversion is
//! saturating rather than truncating so a logging path can never itself
//! panic or silently wrap a value into an unrelated one.

/// Crams a signed error code into the fast-log event's 16-bit field.
///
/// Negative codes (there should be none; callers pass positive errno
/// values) collapse to zero. Codes above `u16::MAX` saturate rather than
/// wrap.
#[must_use]
pub const fn cram_into_u16(code: i32) -> u16 {
    if code <= 0 {
        0
    } else if code > i32::from(u16::MAX) {
        u16::MAX
    } else {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "range-checked above: 0 < code <= u16::MAX"
        )]
        let narrowed = code as u16;
        narrowed
    }
}
