//! Frame types, gesture classification, and sample conversion

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::error;

use crate::catalog::PracticeItem;
use crate::hold::{Clock, DetectionSample};

/// A single normalized landmark point reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    /// Create a landmark from normalized coordinates
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One detected hand as an ordered list of landmarks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
}

impl Hand {
    /// Create a hand from its ordered landmarks
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Non-empty and every coordinate is a real number
    pub fn is_well_formed(&self) -> bool {
        !self.landmarks.is_empty() && self.landmarks.iter().all(Landmark::is_finite)
    }
}

/// Raw detector output for one camera frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Frame time; stamped from the adapter clock when missing
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    /// `None` when the detector produced nothing for this frame
    #[serde(default)]
    pub hands: Option<Vec<Hand>>,
}

impl HandFrame {
    /// Frame in which the detector reported hands
    pub fn with_hands(timestamp_ms: u64, hands: Vec<Hand>) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            hands: Some(hands),
        }
    }

    /// Frame in which the detector produced nothing
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            hands: None,
        }
    }
}

/// Decides whether the hands in a frame count as the expected sign
///
/// This is where a real hand-shape classifier plugs in.
pub trait GestureClassifier: Send + Sync {
    fn qualifies(&self, hands: &[Hand], expected: &PracticeItem) -> bool;
}

/// Accepts any frame with at least one well-formed hand
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyHandClassifier;

impl GestureClassifier for AnyHandClassifier {
    fn qualifies(&self, hands: &[Hand], _expected: &PracticeItem) -> bool {
        hands.iter().any(Hand::is_well_formed)
    }
}

/// Anything that can deliver detector frames over a channel
///
/// Sources stop by dropping the sender; consumers treat a closed channel
/// as "detector stopped", not as an error.
pub trait FrameSource: Send + 'static {
    fn on_frame(self: Box<Self>, tx: mpsc::Sender<HandFrame>);
}

/// Run a frame source on its own thread and return the receiving end
pub fn spawn_frame_source<S: FrameSource>(source: S, capacity: usize) -> mpsc::Receiver<HandFrame> {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let spawned = std::thread::Builder::new()
        .name("frame-source".to_string())
        .spawn(move || Box::new(source).on_frame(tx));

    // On failure the sender is dropped with the closure, so the receiver
    // simply reports a stopped detector.
    if let Err(e) = spawned {
        error!(?e, "failed to spawn frame source thread");
    }
    rx
}

/// Converts raw frames into presence samples
pub struct DetectionAdapter {
    classifier: Box<dyn GestureClassifier>,
    clock: Arc<dyn Clock>,
}

impl DetectionAdapter {
    /// Create an adapter with a custom classifier
    pub fn new(classifier: Box<dyn GestureClassifier>, clock: Arc<dyn Clock>) -> Self {
        Self { classifier, clock }
    }

    /// Adapter with the default any-hand classifier
    pub fn any_hand(clock: Arc<dyn Clock>) -> Self {
        Self::new(Box::new(AnyHandClassifier), clock)
    }

    /// Reduce a frame to a sample for the item currently being practiced
    pub fn to_sample(&self, frame: &HandFrame, expected: &PracticeItem) -> DetectionSample {
        let timestamp_ms = frame
            .timestamp_ms
            .unwrap_or_else(|| self.clock.now_millis());
        let present = match frame.hands.as_deref() {
            Some(hands) if !hands.is_empty() => self.classifier.qualifies(hands, expected),
            _ => false,
        };

        DetectionSample {
            present,
            timestamp_ms,
        }
    }
}
