//! Narration module
//!
//! Text-to-speech is an external, best-effort capability. The engine only
//! ever calls [`Narrator::speak`] on state-machine entry actions and
//! ignores whatever goes wrong.

mod narrator;

pub use narrator::{
    NarrationError, Narrator, QueuedNarrator, TracingNarrator, UnavailableNarrator, Utterance,
};
