/// Monotonic milliseconds. Wraps at `u32::MAX` like the board tick counter.
pub type Millis = u32;

/// A non-blocking periodic gate. All elapsed-time arithmetic is wrapping, so
/// a gate keeps working across the monotonic counter overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    last: Millis,
    interval: Millis,
}

impl Gate {
    pub fn new(interval: Millis, now: Millis) -> Self {
        Self {
            last: now,
            interval,
        }
    }

    /// Fires once `interval` has elapsed since the last firing and re-arms at `now`.
    pub fn should_fire(&mut self, now: Millis) -> bool {
        if self.elapsed(now) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Millis) {
        self.last = now;
    }

    pub fn set_interval(&mut self, interval: Millis) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Millis {
        self.interval
    }

    pub fn last(&self) -> Millis {
        self.last
    }

    pub fn elapsed(&self, now: Millis) -> Millis {
        now.wrapping_sub(self.last)
    }
}
