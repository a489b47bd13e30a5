//! Events module for session progression
//!
//! Everything the presentation layer needs to render the lesson: a state
//! snapshot on every phase or item change, plus hold progress and
//! completion notices.

use serde::{Deserialize, Serialize};

/// The three phases of a practice session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Listening for a hold on the current item
    #[default]
    AwaitingHold,
    /// A sign succeeded; holds are ignored until the window elapses
    Celebrating,
    /// The last item was completed
    Finished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::AwaitingHold => write!(f, "AwaitingHold"),
            Phase::Celebrating => write!(f, "Celebrating"),
            Phase::Finished => write!(f, "Finished"),
        }
    }
}

/// Renderable view of the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub current_index: usize,
    pub score: usize,
    pub item_count: usize,
}

/// Events emitted by the session controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Phase, item, or score changed
    Snapshot(SessionSnapshot),

    /// Hold progress on the current item changed
    HoldProgress {
        item_id: String,
        /// Normalized progress in [0, 1]
        progress: f32,
    },

    /// A hold on the current item succeeded
    SignCompleted {
        item_id: String,
        score: usize,
    },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::Snapshot(s) => write!(
                f,
                "SNAPSHOT ({} item {}/{} score {})",
                s.phase,
                s.current_index + 1,
                s.item_count,
                s.score
            ),
            SessionEvent::HoldProgress { item_id, progress } => {
                write!(f, "HOLD_PROGRESS ({} {:.0}%)", item_id, progress * 100.0)
            }
            SessionEvent::SignCompleted { item_id, score } => {
                write!(f, "SIGN_COMPLETED ({} score {})", item_id, score)
            }
        }
    }
}
