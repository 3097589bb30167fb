use std::time::{Duration, Instant};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    pub const INVALID: TimerToken = TimerToken(0);
}

/// Trailing-edge debounce: each request replaces the pending timer, and only
/// the most recent token can fire.
#[derive(Debug)]
pub struct Debounce {
    duration: Duration,
    timer: TimerToken,
    deadline: Option<Instant>,
    next_token: u64,
}

impl Debounce {
    pub fn trailing(duration: Duration) -> Self {
        Self {
            duration,
            timer: TimerToken::INVALID,
            deadline: None,
            next_token: 1,
        }
    }

    pub fn request(&mut self, now: Instant) -> TimerToken {
        self.timer = TimerToken(self.next_token);
        self.next_token += 1;
        self.deadline = Some(now + self.duration);
        self.timer
    }

    pub fn cancel(&mut self) {
        self.timer = TimerToken::INVALID;
        self.deadline.take();
    }

    pub fn is_pending(&self) -> bool {
        self.timer != TimerToken::INVALID
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consumes the pending timer if `token` is still the live one.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if token != TimerToken::INVALID && token == self.timer {
            self.cancel();
            true
        } else {
            false
        }
    }

    /// Consumes the pending timer if its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => self.fire(self.timer),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_latest_token_fires() {
        let mut debounce = Debounce::trailing(Duration::from_millis(200));
        let now = Instant::now();
        let first = debounce.request(now);
        let second = debounce.request(now + Duration::from_millis(50));
        assert!(!debounce.fire(first));
        assert!(debounce.fire(second));
        assert!(!debounce.fire(second));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn fires_once_the_quiet_window_elapses() {
        let mut debounce = Debounce::trailing(Duration::from_millis(200));
        let t0 = Instant::now();
        debounce.request(t0);
        debounce.request(t0 + Duration::from_millis(150));
        assert!(!debounce.fire_due(t0 + Duration::from_millis(300)));
        assert!(debounce.fire_due(t0 + Duration::from_millis(350)));
        assert!(!debounce.fire_due(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn cancel_drops_the_pending_timer() {
        let mut debounce = Debounce::trailing(Duration::from_millis(200));
        let t0 = Instant::now();
        let token = debounce.request(t0);
        debounce.cancel();
        assert_eq!(debounce.deadline(), None);
        assert!(!debounce.fire(token));
    }
}
