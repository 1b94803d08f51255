//! Session clock.
//!
//! Two timelines are tracked. Session time (`now - start_time`) is what
//! phase timeouts read; pausing does not freeze it. Simulation time is
//! advanced by `dt * time_scale` and drives the notification sequences, so it
//! stops while the session is paused.

use std::time::Duration;

/// Window after a pause toggle during which another toggle is rejected.
pub const PAUSE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct SessionClock {
    start_time: Duration,
    unpause_guard_until: Duration,
    /// Latest `now` observed; readings never move backwards past it.
    latest: Duration,
    /// `now` of the last [`SessionClock::advance`].
    last_advance: Duration,
    sim_time: Duration,
    time_scale: f64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            start_time: Duration::ZERO,
            unpause_guard_until: Duration::ZERO,
            latest: Duration::ZERO,
            last_advance: Duration::ZERO,
            sim_time: Duration::ZERO,
            time_scale: 1.0,
        }
    }

    /// Reset the session timeline to start at `now`.
    pub fn start(&mut self, now: Duration) {
        self.start_time = now;
        self.latest = now;
        self.last_advance = now;
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    /// Session time elapsed at `now`. Monotonic across calls.
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.max(self.latest).saturating_sub(self.start_time)
    }

    /// Session time elapsed at the latest observed reading.
    pub fn current_elapsed(&self) -> Duration {
        self.latest.saturating_sub(self.start_time)
    }

    /// Record a reading without advancing simulation time.
    pub fn observe(&mut self, now: Duration) {
        self.latest = self.latest.max(now);
    }

    /// Move both timelines forward to `now` and return the simulation time.
    pub fn advance(&mut self, now: Duration) -> Duration {
        let dt = now.saturating_sub(self.last_advance);
        self.last_advance = self.last_advance.max(now);
        self.observe(now);
        self.sim_time += if self.time_scale == 1.0 {
            dt
        } else {
            dt.mul_f64(self.time_scale)
        };
        self.sim_time
    }

    pub fn sim_time(&self) -> Duration {
        self.sim_time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.max(0.0);
    }

    /// True while a pause toggle at `now` must be rejected.
    pub fn is_guarded(&self, now: Duration) -> bool {
        now < self.unpause_guard_until
    }

    pub fn arm_guard(&mut self, now: Duration) {
        self.unpause_guard_until = now.saturating_add(PAUSE_DEBOUNCE);
    }

    pub fn guard_until(&self) -> Duration {
        self.unpause_guard_until
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_elapsed_is_relative_to_start() {
        let mut clock = SessionClock::new();
        clock.start(secs(3.0));
        assert_eq!(clock.start_time(), secs(3.0));
        assert_eq!(clock.elapsed(secs(3.0)), Duration::ZERO);
        assert_eq!(clock.elapsed(secs(5.5)), secs(2.5));
    }

    #[test]
    fn test_elapsed_never_decreases() {
        let mut clock = SessionClock::new();
        clock.start(Duration::ZERO);
        clock.advance(secs(4.0));
        // An out-of-order reading does not rewind the clock
        assert_eq!(clock.elapsed(secs(1.0)), secs(4.0));
    }

    #[test]
    fn test_sim_time_stops_at_zero_scale() {
        let mut clock = SessionClock::new();
        clock.start(Duration::ZERO);
        assert_eq!(clock.advance(secs(1.0)), secs(1.0));

        clock.set_time_scale(0.0);
        assert_eq!(clock.advance(secs(3.0)), secs(1.0));
        // Session time keeps running
        assert_eq!(clock.elapsed(secs(3.0)), secs(3.0));

        clock.set_time_scale(1.0);
        assert_eq!(clock.advance(secs(3.5)), secs(1.5));
    }

    #[test]
    fn test_observe_does_not_lose_sim_time() {
        let mut clock = SessionClock::new();
        clock.start(Duration::ZERO);
        clock.observe(secs(2.0));
        assert_eq!(clock.current_elapsed(), secs(2.0));
        assert_eq!(clock.advance(secs(2.0)), secs(2.0));
    }

    #[test]
    fn test_guard_rejects_within_debounce_window() {
        let mut clock = SessionClock::new();
        assert!(!clock.is_guarded(Duration::ZERO));

        clock.arm_guard(secs(2.0));
        assert_eq!(clock.guard_until(), secs(2.5));
        assert!(clock.is_guarded(secs(2.0)));
        assert!(clock.is_guarded(secs(2.499)));
        assert!(!clock.is_guarded(secs(2.5)));
    }
}
