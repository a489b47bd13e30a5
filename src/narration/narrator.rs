//! Narrator capability and the built-in narrators

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

/// A phrase to be spoken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    /// BCP 47 language tag, e.g. `fr-CA`
    pub language: String,
}

/// Errors a narrator may report; callers never propagate them
#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("speech synthesis is not available")]
    Unavailable,

    #[error("narration queue is full")]
    Busy,

    #[error("narration player has stopped")]
    Closed,
}

/// Fire-and-forget speech capability
pub trait Narrator: Send + Sync {
    fn speak(&self, text: &str, language: &str) -> Result<(), NarrationError>;
}

/// Logs each utterance instead of speaking it
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNarrator;

impl Narrator for TracingNarrator {
    fn speak(&self, text: &str, language: &str) -> Result<(), NarrationError> {
        info!(%language, %text, "narrating");
        Ok(())
    }
}

/// Narrator for platforms without speech synthesis
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableNarrator;

impl Narrator for UnavailableNarrator {
    fn speak(&self, _text: &str, _language: &str) -> Result<(), NarrationError> {
        Err(NarrationError::Unavailable)
    }
}

/// Hands utterances to a player task without waiting for playback
///
/// A full queue drops the utterance rather than blocking the engine.
#[derive(Debug, Clone)]
pub struct QueuedNarrator {
    tx: mpsc::Sender<Utterance>,
}

impl QueuedNarrator {
    /// Create a narrator and the receiver its player task drains
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Utterance>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl Narrator for QueuedNarrator {
    fn speak(&self, text: &str, language: &str) -> Result<(), NarrationError> {
        let utterance = Utterance {
            text: text.to_string(),
            language: language.to_string(),
        };
        self.tx.try_send(utterance).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NarrationError::Busy,
            mpsc::error::TrySendError::Closed(_) => NarrationError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_narrator_delivers() {
        let (narrator, mut rx) = QueuedNarrator::new(4);
        narrator.speak("Bonjour", "fr-CA").unwrap();

        let utterance = tokio_test::block_on(rx.recv()).unwrap();
        assert_eq!(utterance.text, "Bonjour");
        assert_eq!(utterance.language, "fr-CA");
    }

    #[test]
    fn test_queued_narrator_reports_full_and_closed() {
        let (narrator, rx) = QueuedNarrator::new(1);
        narrator.speak("un", "fr-CA").unwrap();
        assert!(matches!(narrator.speak("deux", "fr-CA"), Err(NarrationError::Busy)));

        drop(rx);
        assert!(matches!(narrator.speak("trois", "fr-CA"), Err(NarrationError::Closed)));
    }

    #[test]
    fn test_unavailable_narrator_fails() {
        assert!(matches!(
            UnavailableNarrator.speak("Bravo!", "fr-CA"),
            Err(NarrationError::Unavailable)
        ));
    }
}
