use std::time::Instant;

use crate::chip::chip8::constants::CHIP8_TIMER_PERIOD;

/// An 8-bit countdown timer that is decremented once per `CHIP8_TIMER_PERIOD`
/// of wall-clock time, independent of how many instructions ran meanwhile.
///
/// The timer is driven by polling `update` with a monotonic clock. Each timer
/// keeps its own cadence: the period is measured from its own last decrement.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    value: u8,
    last_decrement: Instant,
}

impl Timer {
    pub fn new(now: Instant) -> Self {
        Timer {
            value: 0,
            last_decrement: now,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn set(&mut self, value: u8) {
        self.value = value;
    }

    /// Decrements the timer if at least one period has passed since its last
    /// decrement. Returns whether it was decremented.
    pub fn update(&mut self, now: Instant) -> bool {
        // An idle timer follows the clock so that a freshly set value
        // does not lose its first period.
        if self.value == 0 {
            self.last_decrement = now;
            return false;
        }

        if now.saturating_duration_since(self.last_decrement) < CHIP8_TIMER_PERIOD {
            return false;
        }

        self.value -= 1;
        self.last_decrement = now;
        true
    }
}
