//! signe-engine: gesture-hold detection and lesson progression for
//! Signe avec moi, a sign-language practice game for children
//!
//! The engine pairs each practice item with live hand detection:
//! - `hold` debounces per-frame presence into sustained-hold completions
//! - `session` runs the AwaitingHold / Celebrating / Finished state machine
//! - `detector` and `narration` are the seams to the camera and speech
//! - `events` is everything the presentation layer renders
//!
//! The hand-landmark detector and text-to-speech are external; this crate
//! only consumes their output and never touches a camera or audio device.

pub mod catalog;
pub mod config;
pub mod detector;
pub mod events;
pub mod hold;
pub mod lifecycle;
pub mod narration;
pub mod session;
