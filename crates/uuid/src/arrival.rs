//! Strictly monotonic arrival stamps.

use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::sync::Mutex;

/// The moment an admission entered the queue, plus a process-wide sequence number.
///
/// Ordering compares `arrived_at` first and falls back to `sequence`, which makes the
/// first-come-first-served order total even for stamps that share a timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrivalStamp {
    arrived_at: DateTime<Utc>,
    sequence: u64,
}

impl ArrivalStamp {
    /// Builds a stamp from its parts. Mostly useful for tests and for records read back
    /// from storage; live admissions should use [`ArrivalClock::next`].
    pub fn new(arrived_at: DateTime<Utc>, sequence: u64) -> Self {
        Self {
            arrived_at,
            sequence,
        }
    }

    pub fn arrived_at(&self) -> DateTime<Utc> {
        self.arrived_at
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Ord for ArrivalStamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.arrived_at
            .cmp(&other.arrived_at)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for ArrivalStamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Issues strictly increasing [`ArrivalStamp`]s.
///
/// If the wall clock has not advanced past the previous stamp (same millisecond, or a
/// backwards NTP step) the new timestamp is bumped to one millisecond after the last one.
#[derive(Debug, Default)]
pub struct ArrivalClock {
    last: Mutex<Option<ArrivalStamp>>,
}

impl ArrivalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a clock after a restart so new stamps sort after every persisted one.
    pub fn resume_after(last: Option<ArrivalStamp>) -> Self {
        Self {
            last: Mutex::new(last),
        }
    }

    /// Returns the next stamp.
    pub fn next(&self) -> ArrivalStamp {
        // The guarded value is a plain Copy stamp, so a poisoned lock still holds a valid one.
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();

        let stamp = match *last {
            Some(prev) if now <= prev.arrived_at => ArrivalStamp {
                arrived_at: prev.arrived_at + Duration::milliseconds(1),
                sequence: prev.sequence + 1,
            },
            Some(prev) => ArrivalStamp {
                arrived_at: now,
                sequence: prev.sequence + 1,
            },
            None => ArrivalStamp {
                arrived_at: now,
                sequence: 0,
            },
        };

        *last = Some(stamp);
        stamp
    }

    /// Moves the clock past `stamp` if it is ahead of the last stamp issued here.
    ///
    /// Used when another clock (typically another process sharing the same store) has
    /// stamped an admission this one has not seen; the next call to [`next`](Self::next)
    /// then sorts after it.
    pub fn observe(&self, stamp: ArrivalStamp) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if last.map_or(true, |prev| prev < stamp) {
            *last = Some(stamp);
        }
    }
}
