//! POSIX-style error numbers used to describe messenger and allocation
//! failures, without pulling in `libc` for a handful of constants.

/// Invalid argument (bad `max_tr`, malformed request).
pub const EINVAL: i32 = 22;
/// Out of memory (messenger could not allocate a transaction).
pub const ENOMEM: i32 = 12;
/// Too many open files / slot table exhausted.
pub const EMFILE: i32 = 24;
/// Permission denied.
pub const EACCES: i32 = 13;
/// Operation timed out.
pub const ETIMEDOUT: i32 = 110;
/// Connection reset by peer.
pub const ECONNRESET: i32 = 104;
