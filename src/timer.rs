//! Single-shot, re-armable deadline timer
//!
//! No threads: the host loop calls [`DebounceTimer::fire_if_due`] with the
//! current instant. Re-arming replaces the pending deadline.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config;

/// How the shadow comes back after it was hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ShadowShowPolicy {
    /// Wait for a quiet period before showing
    Debounced { delay_ms: u64 },
    /// Show on the next poll; bursts within one loop iteration coalesce
    Coalesced,
}

impl Default for ShadowShowPolicy {
    fn default() -> Self {
        ShadowShowPolicy::Debounced {
            delay_ms: config::timing::SHADOW_SHOW_DELAY_MS,
        }
    }
}

impl ShadowShowPolicy {
    pub fn delay(&self) -> Duration {
        match self {
            ShadowShowPolicy::Debounced { delay_ms } => Duration::from_millis(*delay_ms),
            ShadowShowPolicy::Coalesced => Duration::ZERO,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer to fire `delay` after `now`
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire once if the deadline has passed. Disarms on fire.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
