use std::{cell::Cell, rc::Rc};

use serde::{Deserialize, Serialize};

/// An opaque representation of a time instant.
///
/// The unit of time is a second, counted from the clock's origin.
#[derive(
    Copy, Clone, Default, PartialEq, PartialOrd, Debug, Serialize, Deserialize,
)]
pub struct Instant(pub(crate) f64);

impl Instant {
    pub fn from_secs(secs: f64) -> Self {
        Instant(secs)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }
}

impl std::ops::Add<f64> for Instant {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        Instant(self.0 + rhs)
    }
}

impl std::ops::AddAssign<f64> for Instant {
    fn add_assign(&mut self, rhs: f64) {
        self.0 += rhs;
    }
}

impl std::ops::Sub<Instant> for Instant {
    type Output = f64;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.0 - rhs.0
    }
}

impl std::ops::Sub<f64> for Instant {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self::Output {
        Instant(self.0 - rhs)
    }
}

/// Source of the current time for the world.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Monotonic operating system clock.
pub struct WallClock(std::time::Instant);

impl Default for WallClock {
    fn default() -> Self {
        WallClock(std::time::Instant::now())
    }
}

impl Clock for WallClock {
    fn now(&self) -> Instant {
        Instant(self.0.elapsed().as_secs_f64())
    }
}

/// Manually advanced clock, clones share the same time value.
#[derive(Clone, Default, Debug)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn advance(&self, secs: f64) {
        self.0.set(self.0.get() + secs);
    }

    pub fn set(&self, t: Instant) {
        self.0.set(t.0);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant(self.0.get())
    }
}

/// Scheduled event time that survives the world being paused.
///
/// While paused the timer remembers how much time was left until the event
/// and re-anchors that remainder to the resume time.
#[derive(Copy, Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct Timer {
    next: Instant,
    frozen: Option<f64>,
}

impl Timer {
    pub fn at(next: Instant) -> Self {
        Timer { next, frozen: None }
    }

    pub fn after(now: Instant, secs: f64) -> Self {
        Timer::at(now + secs)
    }

    pub fn next(&self) -> Instant {
        self.next
    }

    pub fn is_paused(&self) -> bool {
        self.frozen.is_some()
    }

    /// Whether the scheduled time has arrived. Paused timers never fire.
    pub fn is_ready(&self, now: Instant) -> bool {
        self.frozen.is_none() && now >= self.next
    }

    /// Seconds until the event, negative if it's overdue.
    pub fn remaining(&self, now: Instant) -> f64 {
        self.frozen.unwrap_or(self.next - now)
    }

    /// Move the event forward from its previous anchor, keeping cadence.
    pub fn reschedule(&mut self, secs: f64) {
        self.next += secs;
    }

    /// Schedule the event relative to the current time.
    pub fn restart(&mut self, now: Instant, secs: f64) {
        self.next = now + secs;
        self.frozen = None;
    }

    pub fn pause(&mut self, now: Instant) {
        if self.frozen.is_none() {
            self.frozen = Some(self.next - now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(remaining) = self.frozen.take() {
            self.next = now + remaining;
        }
    }
}
