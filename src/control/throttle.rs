//! Rate limiting for the mapping pipeline.

use std::time::{Duration, Instant};

/// Default gap between pointer samples that reach the pipeline.
pub const POINTER_INTERVAL: Duration = Duration::from_millis(30);
/// Default gap between hand-tracking frames that reach the pipeline.
pub const HANDS_INTERVAL: Duration = Duration::from_millis(33);

/// Passes at most one sample per `interval`.
///
/// Marker positions are updated by the caller regardless; only the
/// quantize/resolve/emit pipeline sits behind the throttle.
#[derive(Debug, Clone, Copy)]
pub struct InputThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl InputThrottle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True if a sample at `now` may pass. Records `now` when it does.
    pub fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forget the last admitted sample so the next one passes.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_always_passes() {
        let mut t = InputThrottle::new(POINTER_INTERVAL);
        assert!(t.admit(Instant::now()));
    }

    #[test]
    fn drops_samples_inside_interval() {
        let t0 = Instant::now();
        let mut t = InputThrottle::new(Duration::from_millis(30));
        assert!(t.admit(t0));
        assert!(!t.admit(t0 + Duration::from_millis(10)));
        assert!(!t.admit(t0 + Duration::from_millis(29)));
        assert!(t.admit(t0 + Duration::from_millis(30)));
        assert!(!t.admit(t0 + Duration::from_millis(45)));
        assert!(t.admit(t0 + Duration::from_millis(61)));
    }

    #[test]
    fn reset_reopens_gate() {
        let t0 = Instant::now();
        let mut t = InputThrottle::new(HANDS_INTERVAL);
        assert!(t.admit(t0));
        t.reset();
        assert!(t.admit(t0 + Duration::from_millis(1)));
    }

    #[test]
    fn roughly_thirty_per_second() {
        let t0 = Instant::now();
        let mut t = InputThrottle::new(HANDS_INTERVAL);
        let passed = (0..1000)
            .filter(|ms| t.admit(t0 + Duration::from_millis(*ms)))
            .count();
        assert_eq!(passed, 31);
    }
}
