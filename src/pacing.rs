use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// most clock units run in one iteration: a thirtieth of a second of machine
/// time, rounded down
pub fn tick_cap(frequency: u64) -> u64 {
    frequency / 30
}

/// how many clock units `elapsed` wall time is worth, never more than
/// `tick_cap(frequency)`
pub fn ticks_for(elapsed: Duration, frequency: u64) -> u64 {
    let desired = frequency as u128 * elapsed.as_nanos() / NANOS_PER_SEC;
    desired.min(tick_cap(frequency) as u128) as u64
}

/// a monotonic source of "time since some fixed origin"
pub trait Clock {
    fn now(&self) -> Duration;
}

/// the real wall clock
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// clock that only moves when told to; clones share the same time, so a test
/// can keep a handle after giving one to the driver
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Turns the time between frame boundaries into a tick budget.
#[derive(Debug)]
pub struct Pacer {
    frequency: u64,
    last_frame: Duration,
}

impl Pacer {
    pub fn new(frequency: u64, now: Duration) -> Self {
        Pacer {
            frequency,
            last_frame: now,
        }
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn cap(&self) -> u64 {
        tick_cap(self.frequency)
    }

    /// wall time since the last frame boundary
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.last_frame)
    }

    /// ticks owed at `now`; doesn't move the frame boundary
    pub fn ticks_due(&self, now: Duration) -> u64 {
        ticks_for(self.elapsed(now), self.frequency)
    }

    /// close the current frame at `now`
    pub fn mark(&mut self, now: Duration) {
        self.last_frame = now;
    }
}
