//! Scripted frame source for demos and tests without a camera
//!
//! Replays a list of show/hide segments at a fixed frame interval,
//! stamping frames on a virtual timeline that advances with each frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::adapter::{FrameSource, Hand, HandFrame, Landmark};

/// Number of landmarks per synthetic hand
const LANDMARKS_PER_HAND: usize = 21;

/// One segment of a simulated session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldScript {
    /// A hand is visible for this long
    Show { millis: u64 },
    /// No hand is visible for this long
    Hide { millis: u64 },
}

impl HoldScript {
    fn millis(&self) -> u64 {
        match self {
            HoldScript::Show { millis } | HoldScript::Hide { millis } => *millis,
        }
    }

    fn shows_hand(&self) -> bool {
        matches!(self, HoldScript::Show { .. })
    }
}

/// Frame source replaying a [`HoldScript`] sequence
pub struct SimulatedDetector {
    script: Vec<HoldScript>,
    frame_interval: Duration,
    /// Sleep between frames; off for tests that only need the frame stream
    realtime: bool,
    running: Arc<AtomicBool>,
}

impl SimulatedDetector {
    /// Create a realtime simulator emitting one frame every `frame_interval`
    pub fn new(script: Vec<HoldScript>, frame_interval: Duration) -> Self {
        Self {
            script,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            realtime: true,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Emit frames as fast as the channel accepts them
    pub fn unpaced(mut self) -> Self {
        self.realtime = false;
        self
    }

    /// Script of a child who gets every sign, once after a brief dropout
    ///
    /// Each item: arrive, hold briefly and lose the hand for one frame,
    /// then hold long enough to succeed and wait out the celebration.
    pub fn child_practicing(
        items: usize,
        hold_ms: u64,
        celebration_ms: u64,
        frame_interval: Duration,
    ) -> Vec<HoldScript> {
        let dropout_ms = (frame_interval.as_millis() as u64).max(1);
        let mut script = Vec::with_capacity(items * 5);
        for _ in 0..items {
            script.push(HoldScript::Hide { millis: 400 });
            script.push(HoldScript::Show { millis: hold_ms / 2 });
            script.push(HoldScript::Hide { millis: dropout_ms });
            script.push(HoldScript::Show { millis: hold_ms + 200 });
            script.push(HoldScript::Hide { millis: celebration_ms + 300 });
        }
        script
    }

    /// Handle that stops the simulator from another thread
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    fn frame(timestamp_ms: u64, shows_hand: bool) -> HandFrame {
        if shows_hand {
            let hand = Hand::new(vec![Landmark::new(0.5, 0.5, 0.0); LANDMARKS_PER_HAND]);
            HandFrame::with_hands(timestamp_ms, vec![hand])
        } else {
            HandFrame::empty(timestamp_ms)
        }
    }
}

impl FrameSource for SimulatedDetector {
    fn on_frame(self: Box<Self>, tx: mpsc::Sender<HandFrame>) {
        info!(segments = self.script.len(), "simulated detector started");

        let step = self.frame_interval.as_millis() as u64;
        let mut now_ms = 0u64;

        'script: for segment in &self.script {
            debug!(?segment, at = now_ms, "simulated segment");
            let end = now_ms + segment.millis();

            while now_ms < end {
                if !self.running.load(Ordering::SeqCst) {
                    break 'script;
                }

                if tx.blocking_send(Self::frame(now_ms, segment.shows_hand())).is_err() {
                    warn!("frame receiver closed, stopping simulated detector");
                    break 'script;
                }

                if self.realtime {
                    std::thread::sleep(self.frame_interval);
                }
                now_ms += step;
            }
        }

        info!(at = now_ms, "simulated detector finished");
    }
}
