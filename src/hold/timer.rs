//! Sustained-hold timer
//!
//! Accumulates presence time across consecutive present samples and
//! fires exactly one completion per continuous hold.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::clock::{Clock, SystemClock};

/// Default time a hand must stay visible to count as a successful sign
pub const DEFAULT_HOLD_DURATION_MS: u64 = 3000;

/// One frame's worth of detector output, reduced to presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionSample {
    /// At least one qualifying hand was reported
    pub present: bool,
    /// Frame time in milliseconds
    pub timestamp_ms: u64,
}

impl DetectionSample {
    /// Sample with a qualifying hand
    pub fn present(timestamp_ms: u64) -> Self {
        Self {
            present: true,
            timestamp_ms,
        }
    }

    /// Sample without a qualifying hand
    pub fn absent(timestamp_ms: u64) -> Self {
        Self {
            present: false,
            timestamp_ms,
        }
    }
}

/// Result of feeding one sample to the timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldUpdate {
    /// Normalized hold progress in [0, 1]
    pub progress: f32,
    /// The hold just reached the configured duration
    pub completed: bool,
}

impl HoldUpdate {
    const IDLE: Self = Self {
        progress: 0.0,
        completed: false,
    };

    const DONE: Self = Self {
        progress: 1.0,
        completed: true,
    };
}

/// Hold timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldConfig {
    /// Continuous presence required for a completion, always > 0
    pub hold_duration_ms: u64,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
        }
    }
}

/// Converts a presence stream into debounced hold completions
pub struct HoldTimer {
    config: HoldConfig,
    clock: Arc<dyn Clock>,
    /// Timestamp of the first present sample of the active hold
    hold_start_ms: Option<u64>,
    last_progress: f32,
}

impl HoldTimer {
    /// Create a timer stamping samples with its own system clock
    pub fn new(config: HoldConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Create a timer with an injected clock
    pub fn with_clock(config: HoldConfig, clock: Arc<dyn Clock>) -> Self {
        let config = HoldConfig {
            hold_duration_ms: config.hold_duration_ms.max(1),
        };
        Self {
            config,
            clock,
            hold_start_ms: None,
            last_progress: 0.0,
        }
    }

    /// Get the effective configuration
    pub fn config(&self) -> HoldConfig {
        self.config
    }

    /// Last progress value reported by `observe`
    pub fn progress(&self) -> f32 {
        self.last_progress
    }

    /// Whether a hold is currently being accumulated
    pub fn is_holding(&self) -> bool {
        self.hold_start_ms.is_some()
    }

    /// Drop any accumulated hold
    pub fn reset(&mut self) {
        self.hold_start_ms = None;
        self.last_progress = 0.0;
    }

    /// Observe a presence flag stamped with the injected clock
    pub fn observe_now(&mut self, present: bool) -> HoldUpdate {
        let timestamp_ms = self.clock.now_millis();
        self.observe(DetectionSample {
            present,
            timestamp_ms,
        })
    }

    /// Feed one sample and report the hold state after it
    pub fn observe(&mut self, sample: DetectionSample) -> HoldUpdate {
        let update = self.step(sample);
        self.last_progress = update.progress;
        update
    }

    fn step(&mut self, sample: DetectionSample) -> HoldUpdate {
        if !sample.present {
            if self.hold_start_ms.take().is_some() {
                debug!(at = sample.timestamp_ms, "hold interrupted");
            }
            return HoldUpdate::IDLE;
        }

        let Some(start) = self.hold_start_ms else {
            self.hold_start_ms = Some(sample.timestamp_ms);
            debug!(at = sample.timestamp_ms, "hold started");
            return HoldUpdate::IDLE;
        };

        // A timestamp earlier than the hold start counts as no elapsed time
        let elapsed = sample.timestamp_ms.saturating_sub(start);
        if elapsed >= self.config.hold_duration_ms {
            self.hold_start_ms = None;
            debug!(elapsed_ms = elapsed, "hold completed");
            return HoldUpdate::DONE;
        }

        HoldUpdate {
            progress: (elapsed as f32 / self.config.hold_duration_ms as f32).min(1.0),
            completed: false,
        }
    }
}

impl std::fmt::Debug for HoldTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldTimer")
            .field("config", &self.config)
            .field("hold_start_ms", &self.hold_start_ms)
            .field("last_progress", &self.last_progress)
            .finish()
    }
}
