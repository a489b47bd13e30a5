//! Hold detection module
//!
//! Turns a noisy per-frame "hand present" stream into a single
//! completion event once a hand has been held up long enough:
//! - Any absent frame resets the hold to zero
//! - Progress is reported normalized to [0, 1]
//! - Completion fires once per continuous hold, then the hold restarts

mod clock;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use timer::{DetectionSample, HoldConfig, HoldTimer, HoldUpdate};
