//! Monotonic time and blocking waits.
//!
//! The control loop never calls `Instant::now` or `thread::sleep` directly.
//! It goes through a [`Clock`], so tests and the plant simulation can inject
//! a clock that advances only when slept.

use std::thread;
use std::time::{Duration, Instant};

use crate::shutdown::ShutdownToken;

/// Time since the clock's origin.
pub type Timestamp = Duration;

pub trait Clock {
    /// Current time since this clock's origin.
    fn now(&self) -> Timestamp;

    /// Block the calling thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Wall clock backed by `Instant` and `thread::sleep`.
///
/// With a [`ShutdownToken`] attached, a pending sleep returns as soon as the
/// token is cancelled.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    shutdown: Option<ShutdownToken>,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, token: ShutdownToken) -> Self {
        self.shutdown = Some(token);
        self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        match &self.shutdown {
            Some(token) => {
                token.wait_timeout(duration);
            }
            None => thread::sleep(duration),
        }
    }
}

/// Clock that only advances when slept. Every sleep is recorded.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Timestamp,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without recording a sleep.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps.iter().sum()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
        self.sleeps.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_sleep() {
        let mut clock = ManualClock::new();
        clock.sleep(Duration::from_secs(3));
        clock.advance(Duration::from_millis(500));
        clock.sleep(Duration::from_secs(2));

        assert_eq!(clock.now(), Duration::from_millis(5500));
        assert_eq!(clock.sleeps().len(), 2);
        assert_eq!(clock.total_slept(), Duration::from_secs(5));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_millis(5));
        assert!(clock.now() >= before + Duration::from_millis(5));
    }

    #[test]
    fn cancelled_token_cuts_sleep_short() {
        let token = ShutdownToken::new();
        token.cancel();
        let mut clock = SystemClock::new().with_shutdown(token);

        let started = Instant::now();
        clock.sleep(Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
