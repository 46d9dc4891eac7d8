// src/watch/debounce.rs

//! Trigger debouncing.
//!
//! The window is measured from the previous *attempt*, not the previous run:
//! every attempt moves the timestamp to "now", so a steady stream of events
//! closer together than the delay keeps every one of them rejected.

use std::time::{Duration, Instant};

/// Outcome of a single debounce attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Debounce {
    /// Enough time passed since the previous attempt.
    Admitted,
    /// The previous attempt was `elapsed` ago, less than the delay.
    TooSoon { elapsed: Duration },
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    /// `None` stands for "far in the past", so the first attempt always passes.
    last_attempt: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_attempt: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    /// Record an attempt at `now` and report whether it may proceed.
    pub fn attempt(&mut self, now: Instant) -> Debounce {
        let previous = self.last_attempt.replace(now);
        match previous {
            Some(prev) => {
                let elapsed = now.saturating_duration_since(prev);
                if elapsed < self.delay {
                    Debounce::TooSoon { elapsed }
                } else {
                    Debounce::Admitted
                }
            }
            None => Debounce::Admitted,
        }
    }
}

/// Seconds rounded to two decimals, for log lines.
pub fn round_secs(d: Duration) -> f64 {
    (d.as_secs_f64() * 100.0).round() / 100.0
}
