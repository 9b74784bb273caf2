//! Structured event log mirroring the coordinator's lifecycle.
//!
//! Each event is both pushed onto a small in-process ring buffer (cheap
//! enough to enable unconditionally, bounded so a busy context cannot
//! grow it without limit) and mirrored through `tracing`, so the same
//! information reaches a structured-logging pipeline without the ring
//! buffer's consumer having to exist.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::util::Endpoint;

use super::flags::BsendFlags;

/// Severity of a fast-log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine lifecycle event.
    Debug,
    /// A failure worth a human's attention.
    Error,
}

/// What kind of coordinator event this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Context constructed.
    Init,
    /// A transaction was added (or failed to be added).
    AddTr,
    /// A `join` call is waiting, or has finished waiting.
    Join,
    /// The context was reset for reuse.
    Reset,
    /// The context was dropped.
    Free,
    /// `bsend_reply` or `bsend_std_reply` could not deliver a response.
    ReplyFail,
}

/// One fast-log event: a fixed-size, opaque-on-the-wire record of
/// something the coordinator did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastLogBsendEvent {
    /// Event severity.
    pub severity: Severity,
    /// Event kind.
    pub kind: EventKind,
    /// Peer port, host byte order (zero for peer-less events).
    pub port: u16,
    /// Peer IPv4 address, host byte order (zero for peer-less events).
    pub ip: u32,
    /// Transaction flags at the time of the event (zero if not
    /// applicable).
    pub flags: u8,
    /// Error code, crammed into 16 bits (zero if not applicable).
    pub error: u16,
    /// Event-specific auxiliary value (slot index, outstanding count,
    /// capacity, ...).
    pub aux: u32,
}

impl FastLogBsendEvent {
    /// Size in bytes of the encoded form.
    pub const ENCODED_LEN: usize = 16;

    /// Builds a `Debug`-severity event. `endpoint` and `error` are zero
    /// for peer-less lifecycle points (`Init`, `Join`, `Reset`, `Free`)
    /// and populated for peer-bearing ones (`AddTr`).
    #[must_use]
    pub const fn debug(kind: EventKind, endpoint: Endpoint, flags: BsendFlags, error: u16, aux: u32) -> Self {
        Self {
            severity: Severity::Debug,
            kind,
            port: endpoint.port,
            ip: endpoint.ip,
            flags: flags.bits(),
            error,
            aux,
        }
    }

    /// Builds an event describing a failure.
    #[must_use]
    pub const fn error(kind: EventKind, endpoint: Endpoint, flags: BsendFlags, error: u16, aux: u32) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            port: endpoint.port,
            ip: endpoint.ip,
            flags: flags.bits(),
            error,
            aux,
        }
    }

    /// Encodes the event into its fixed-size wire form.
    ///
    /// The layout is internal to this crate: only the emitter and a
    /// matching decoder need to agree on it.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let severity = match self.severity {
            Severity::Debug => 0,
            Severity::Error => 1,
        };
        let kind = encode_kind(self.kind);
        let [p0, p1] = self.port.to_be_bytes();
        let [i0, i1, i2, i3] = self.ip.to_be_bytes();
        let [e0, e1] = self.error.to_be_bytes();
        let [a0, a1, a2, a3] = self.aux.to_be_bytes();
        [
            severity, kind, p0, p1, i0, i1, i2, i3, self.flags, e0, e1, 0, a0, a1, a2, a3,
        ]
    }

    /// Decodes an event from its fixed-size wire form, or `None` if the
    /// bytes do not describe a recognised event kind.
    #[must_use]
    pub fn decode(buf: [u8; Self::ENCODED_LEN]) -> Option<Self> {
        let [severity_byte, kind_byte, p0, p1, i0, i1, i2, i3, flags, e0, e1, _pad, a0, a1, a2, a3] = buf;
        let severity = match severity_byte {
            0 => Severity::Debug,
            1 => Severity::Error,
            _ => return None,
        };
        let kind = decode_kind(kind_byte)?;
        let port = u16::from_be_bytes([p0, p1]);
        let ip = u32::from_be_bytes([i0, i1, i2, i3]);
        let error = u16::from_be_bytes([e0, e1]);
        let aux = u32::from_be_bytes([a0, a1, a2, a3]);
        Some(Self {
            severity,
            kind,
            port,
            ip,
            flags,
            error,
            aux,
        })
    }
}

const fn encode_kind(kind: EventKind) -> u8 {
    match kind {
        EventKind::Init => 0,
        EventKind::AddTr => 1,
        EventKind::Join => 2,
        EventKind::Reset => 3,
        EventKind::Free => 4,
        EventKind::ReplyFail => 5,
    }
}

const fn decode_kind(byte: u8) -> Option<EventKind> {
    match byte {
        0 => Some(EventKind::Init),
        1 => Some(EventKind::AddTr),
        2 => Some(EventKind::Join),
        3 => Some(EventKind::Reset),
        4 => Some(EventKind::Free),
        5 => Some(EventKind::ReplyFail),
        _ => None,
    }
}

/// A bounded ring buffer of fast-log events.
///
/// Oldest events are dropped once `capacity` is reached; the buffer exists
/// for tests and local inspection, not as a durable audit trail.
#[derive(Debug)]
pub struct FastLogBuf {
    capacity: usize,
    events: Mutex<VecDeque<FastLogBsendEvent>>,
}

impl FastLogBuf {
    /// Creates a new buffer holding at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        })
    }

    /// Appends an event, evicting the oldest one if the buffer is full.
    pub fn push(&self, event: FastLogBsendEvent) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// A snapshot of the events currently held, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FastLogBsendEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    /// Number of events currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if no events are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The buffer's capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{EventKind, FastLogBsendEvent, FastLogBuf, Severity};
    use crate::msg::flags::BsendFlags;
    use crate::util::Endpoint;

    #[test]
    fn encode_decode_round_trips() {
        let event = FastLogBsendEvent::error(
            EventKind::ReplyFail,
            Endpoint::new(0x0A00_0001, 2049),
            BsendFlags::EXPECT_RESPONSE,
            110,
            7,
        );
        let decoded = FastLogBsendEvent::decode(event.encode()).expect("recognised event");
        assert_eq!(decoded, event);
    }

    #[test]
    fn unrecognised_kind_byte_fails_to_decode() {
        let [severity, _kind, p0, p1, i0, i1, i2, i3, flags, e0, e1, pad, a0, a1, a2, a3] =
            FastLogBsendEvent::debug(EventKind::Init, Endpoint::UNSPECIFIED, BsendFlags::empty(), 0, 0).encode();
        let buf = [
            severity, 0xFF, p0, p1, i0, i1, i2, i3, flags, e0, e1, pad, a0, a1, a2, a3,
        ];
        assert_eq!(FastLogBsendEvent::decode(buf), None);
    }

    #[test]
    fn ring_buffer_evicts_oldest_first() {
        let log = FastLogBuf::new(2);
        for aux in 0..3u32 {
            log.push(FastLogBsendEvent::debug(EventKind::AddTr, Endpoint::UNSPECIFIED, BsendFlags::empty(), 0, aux));
        }
        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].aux, 1);
        assert_eq!(snapshot[1].aux, 2);
    }

    proptest! {
        #[test]
        fn round_trip_holds_for_arbitrary_fields(
            severity_is_error in any::<bool>(),
            port in any::<u16>(),
            ip in any::<u32>(),
            flags in any::<u8>(),
            error in any::<u16>(),
            aux in any::<u32>(),
        ) {
            let event = FastLogBsendEvent {
                severity: if severity_is_error { Severity::Error } else { Severity::Debug },
                kind: EventKind::Join,
                port,
                ip,
                flags,
                error,
                aux,
            };
            prop_assert_eq!(FastLogBsendEvent::decode(event.encode()), Some(event));
        }
    }
}
