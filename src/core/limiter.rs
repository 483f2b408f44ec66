// src/core/limiter.rs — Minimum-interval admission gate for chat turns

use std::time::{Duration, Instant};

/// Outcome of asking the gate for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Granted,
    Denied { retry_after: Duration },
}

/// Enforces a minimum interval between admitted requests.
///
/// Only granted requests move the window: a denied caller retrying
/// immediately is not punished with a longer wait.
#[derive(Debug)]
pub struct CooldownGate {
    interval: Duration,
    last_admitted: Option<Instant>,
}

impl CooldownGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_admitted: None,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Admit the request at `now`, or report how long until the next slot.
    pub fn try_acquire(&mut self, now: Instant) -> Admission {
        if let Some(last) = self.last_admitted {
            let elapsed = now.duration_since(last);
            if elapsed < self.interval {
                return Admission::Denied {
                    retry_after: self.interval - elapsed,
                };
            }
        }
        self.last_admitted = Some(now);
        Admission::Granted
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
