//! Deadline - 期限判定
//!
//! build が待ちすぎているかを決めます。比較は `>`（ちょうど期限は超過ではない）で、
//! 期限にはいつも tolerance buffer を足します。

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Default pending and running deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(24 * 60 * 60);

/// Default tolerance buffer added to every comparison.
pub const DEFAULT_BUFFER: Duration = Duration::from_secs(30 * 60);

/// Deadlines held by the reaper for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// How long a build may stay queued.
    pub pending: Duration,

    /// How long a build may stay running before its stages are inspected.
    pub running: Duration,

    /// Grace period absorbing clock skew between the store and the reaper.
    pub buffer: Duration,
}

impl Deadlines {
    /// Zero deadlines fall back to [`DEFAULT_DEADLINE`]. A zero buffer is kept as is.
    pub fn new(pending: Duration, running: Duration, buffer: Duration) -> Self {
        Self {
            pending: or_default(pending),
            running: or_default(running),
            buffer,
        }
    }

    pub fn pending_exceeded(&self, now: DateTime<Utc>, created: DateTime<Utc>) -> bool {
        is_exceeded(now, created, self.pending, self.buffer)
    }

    pub fn running_exceeded(&self, now: DateTime<Utc>, started: DateTime<Utc>) -> bool {
        is_exceeded(now, started, self.running, self.buffer)
    }
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            pending: DEFAULT_DEADLINE,
            running: DEFAULT_DEADLINE,
            buffer: DEFAULT_BUFFER,
        }
    }
}

fn or_default(deadline: Duration) -> Duration {
    if deadline.is_zero() {
        DEFAULT_DEADLINE
    } else {
        deadline
    }
}

/// Returns true iff `now - reference > limit + buffer`.
///
/// Exact equality is not exceeded. A `limit + buffer` too large to represent
/// never expires.
///
/// Example with limit=60m, buffer=5m:
/// - reference 64m ago: false
/// - reference 65m ago: false
/// - reference 66m ago: true
pub fn is_exceeded(
    now: DateTime<Utc>,
    reference: DateTime<Utc>,
    limit: Duration,
    buffer: Duration,
) -> bool {
    let Some(allowed) = limit
        .checked_add(buffer)
        .and_then(|d| TimeDelta::from_std(d).ok())
    else {
        return false;
    };
    now.signed_duration_since(reference) > allowed
}
