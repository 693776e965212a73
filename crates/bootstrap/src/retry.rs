// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fixed-interval polling with a wall-clock deadline.
//!
//! Both readiness checks (containers and database) are expressed through
//! [`poll_until`]. The probe is called at least once; between failed
//! attempts the loop sleeps for the poll interval, clipped so it never
//! sleeps past the deadline. When the deadline is reached the last failed
//! observation is handed back so the caller can say what was missing.

use std::time::{Duration, Instant};

/// Source of time for polling loops.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by the real monotonic clock and `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Interval between attempts and total time allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    #[must_use]
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// The deadline passed without a successful attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTimeout<O> {
    /// Number of probe calls made.
    pub attempts: u32,
    /// What the final failed attempt observed.
    pub last: O,
}

/// Calls `probe` until it returns `Ok` or `policy.timeout` elapses.
///
/// The probe receives the 1-based attempt number. A timeout too large to
/// represent as an [`Instant`] means there is no deadline.
///
/// # Errors
///
/// Returns [`PollTimeout`] carrying the last failed observation if no
/// attempt succeeded before the deadline.
pub fn poll_until<C, T, O, F>(
    clock: &C,
    policy: PollPolicy,
    mut probe: F,
) -> Result<T, PollTimeout<O>>
where
    C: Clock + ?Sized,
    F: FnMut(u32) -> Result<T, O>,
{
    let deadline = clock.now().checked_add(policy.timeout);
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        let last = match probe(attempts) {
            Ok(value) => return Ok(value),
            Err(observation) => observation,
        };

        let Some(deadline) = deadline else {
            clock.sleep(policy.interval);
            continue;
        };

        let now = clock.now();
        if now >= deadline {
            return Err(PollTimeout { attempts, last });
        }

        clock.sleep(policy.interval.min(deadline - now));
    }
}
