//! Detector adapter module
//!
//! The hand-landmark detector itself lives outside this crate. This module
//! receives its per-frame output, decides whether the frame qualifies as
//! "the expected sign is being shown", and reduces it to a
//! [`DetectionSample`](crate::hold::DetectionSample).

mod adapter;
mod simulated;

pub use adapter::{
    AnyHandClassifier, DetectionAdapter, FrameSource, GestureClassifier, Hand, HandFrame, Landmark,
    spawn_frame_source,
};
pub use simulated::{HoldScript, SimulatedDetector};
