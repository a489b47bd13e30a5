//! Core session state machine
//!
//! Moves through the lesson one item at a time: wait for a sustained hold,
//! celebrate, then advance or finish. Manual navigation may jump anywhere
//! at any time and always lands in AwaitingHold.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::catalog::PracticeItem;
use crate::events::{Phase, SessionEvent, SessionSnapshot};
use crate::hold::{Clock, DetectionSample, HoldConfig, HoldTimer};
use crate::narration::Narrator;

/// Default length of the celebration window
pub const DEFAULT_CELEBRATION_MS: u64 = 2200;

/// Manual navigation request from the previous/next controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Previous,
    Next,
    /// Jump to an index; out-of-range values are clamped
    GoTo(usize),
}

/// Session tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub hold: HoldConfig,
    pub celebration: Duration,
    /// Language tag passed to the narrator
    pub language: String,
    /// Spoken when a sign succeeds
    pub congratulation: String,
    /// Spoken when the last item is done
    pub closing: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hold: HoldConfig::default(),
            celebration: Duration::from_millis(DEFAULT_CELEBRATION_MS),
            language: "fr-CA".to_string(),
            congratulation: "Bravo!".to_string(),
            closing: "Tu as terminé la leçon. Bravo!".to_string(),
        }
    }
}

/// Ticket for a pending celebration window
///
/// Hand the generation back to [`SessionController::celebration_elapsed`]
/// once `duration` has passed. Tickets from a window the session has since
/// left are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CelebrationTimer {
    pub generation: u64,
    pub duration: Duration,
}

/// Errors constructing a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot start a session without practice items")]
    EmptyCatalog,
}

/// Owns the session state and drives it from hold samples and timers
pub struct SessionController {
    items: Vec<PracticeItem>,
    config: SessionConfig,
    phase: Phase,
    current_index: usize,
    score: usize,
    started: bool,
    /// Ids of completed items, in completion order
    completed: Vec<String>,
    hold: HoldTimer,
    /// Bumped on every celebration entry and exit
    generation: u64,
    narrator: Arc<dyn Narrator>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Create a controller for a non-empty list of items
    pub fn new(
        items: Vec<PracticeItem>,
        config: SessionConfig,
        narrator: Arc<dyn Narrator>,
        clock: Arc<dyn Clock>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Result<Self, SessionError> {
        if items.is_empty() {
            return Err(SessionError::EmptyCatalog);
        }

        let hold = HoldTimer::with_clock(config.hold, clock);
        Ok(Self {
            items,
            config,
            phase: Phase::AwaitingHold,
            current_index: 0,
            score: 0,
            started: false,
            completed: Vec::new(),
            hold,
            generation: 0,
            narrator,
            event_tx,
        })
    }

    /// Get the current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Get the index of the item being practiced
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Get the number of successful holds, capped at the item count
    pub fn score(&self) -> usize {
        self.score
    }

    /// Get the number of items in the lesson
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Get the item being practiced
    pub fn current_item(&self) -> &PracticeItem {
        &self.items[self.current_index]
    }

    /// Ids of completed items, in completion order
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Get the progress of the active hold in [0, 1]
    pub fn hold_progress(&self) -> f32 {
        self.hold.progress()
    }

    /// Capture the renderable session state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_index: self.current_index,
            score: self.score,
            item_count: self.items.len(),
        }
    }

    /// Present the first item; later calls do nothing
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        info!(items = self.items.len(), "session started");
        self.started = true;
        self.enter_awaiting_hold();
    }

    /// Begin a fresh session from the first item
    pub fn restart(&mut self) {
        info!(score = self.score, "session restarted");
        self.started = true;
        self.generation += 1;
        self.score = 0;
        self.completed.clear();
        self.current_index = 0;
        self.enter_awaiting_hold();
    }

    /// Feed one detection sample
    ///
    /// Samples are only consumed while awaiting a hold. Returns a timer
    /// ticket when the sample completes a hold.
    pub fn observe(&mut self, sample: DetectionSample) -> Option<CelebrationTimer> {
        if !self.started || self.phase != Phase::AwaitingHold {
            return None;
        }

        let previous = self.hold.progress();
        let update = self.hold.observe(sample);
        if update.progress != previous {
            self.emit(SessionEvent::HoldProgress {
                item_id: self.current_item().id.clone(),
                progress: update.progress,
            });
        }

        if update.completed {
            Some(self.enter_celebrating())
        } else {
            None
        }
    }

    /// Close the celebration window identified by `generation`
    ///
    /// Returns false, changing nothing, when the ticket is stale.
    pub fn celebration_elapsed(&mut self, generation: u64) -> bool {
        if self.phase != Phase::Celebrating || generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                phase = %self.phase,
                "ignoring stale celebration timer"
            );
            return false;
        }

        self.generation += 1;
        if self.current_index + 1 < self.items.len() {
            self.current_index += 1;
            self.enter_awaiting_hold();
        } else {
            self.enter_finished();
        }
        true
    }

    /// Jump to another item, cancelling any pending celebration
    pub fn navigate(&mut self, navigation: Navigation) {
        let last = self.items.len() - 1;
        let target = match navigation {
            Navigation::Previous => self.current_index.saturating_sub(1),
            Navigation::Next => (self.current_index + 1).min(last),
            Navigation::GoTo(index) => index.min(last),
        };

        info!(
            ?navigation,
            from = self.current_index,
            to = target,
            phase = %self.phase,
            "manual navigation"
        );

        self.started = true;
        self.generation += 1;
        self.current_index = target;
        self.enter_awaiting_hold();
    }

    fn enter_awaiting_hold(&mut self) {
        self.reset_hold();
        self.transition_to(Phase::AwaitingHold);

        let item = self.current_item();
        let text = item.narration().to_string();
        debug!(item = %item.id, "presenting item");
        self.narrate(&text);
    }

    fn enter_celebrating(&mut self) -> CelebrationTimer {
        let item_id = self.current_item().id.clone();
        self.score = (self.score + 1).min(self.items.len());
        self.completed.push(item_id.clone());
        self.generation += 1;
        self.reset_hold();

        self.emit(SessionEvent::SignCompleted {
            item_id,
            score: self.score,
        });
        self.transition_to(Phase::Celebrating);

        let text = self.config.congratulation.clone();
        self.narrate(&text);

        CelebrationTimer {
            generation: self.generation,
            duration: self.config.celebration,
        }
    }

    fn enter_finished(&mut self) {
        self.reset_hold();
        self.transition_to(Phase::Finished);

        let text = self.config.closing.clone();
        self.narrate(&text);
    }

    /// Drop the active hold, telling the UI when its progress ring empties
    fn reset_hold(&mut self) {
        let previous = self.hold.progress();
        self.hold.reset();
        if previous != 0.0 {
            self.emit(SessionEvent::HoldProgress {
                item_id: self.current_item().id.clone(),
                progress: 0.0,
            });
        }
    }

    fn transition_to(&mut self, phase: Phase) {
        info!(
            from = %self.phase,
            to = %phase,
            index = self.current_index,
            score = self.score,
            "session transition"
        );
        self.phase = phase;
        self.emit(SessionEvent::Snapshot(self.snapshot()));
    }

    fn narrate(&self, text: &str) {
        if let Err(e) = self.narrator.speak(text, &self.config.language) {
            warn!(%e, %text, "narration failed");
        }
    }

    fn emit(&self, event: SessionEvent) {
        debug!(%event, "emitting session event");
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::catalog::Catalog;
    use crate::hold::ManualClock;
    use crate::narration::{NarrationError, UnavailableNarrator};

    #[derive(Default)]
    struct RecordingNarrator {
        spoken: Mutex<Vec<String>>,
    }

    impl RecordingNarrator {
        fn spoken(&self) -> Vec<String> {
            self.spoken.lock().unwrap().clone()
        }
    }

    impl Narrator for RecordingNarrator {
        fn speak(&self, text: &str, _language: &str) -> Result<(), NarrationError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn items(count: usize) -> Vec<PracticeItem> {
        Catalog::builtin().into_items().into_iter().take(count).collect()
    }

    fn create_controller(
        count: usize,
    ) -> (
        SessionController,
        Arc<RecordingNarrator>,
        broadcast::Receiver<SessionEvent>,
    ) {
        let narrator = Arc::new(RecordingNarrator::default());
        let (tx, rx) = broadcast::channel(64);
        let controller = SessionController::new(
            items(count),
            SessionConfig::default(),
            narrator.clone(),
            Arc::new(ManualClock::new(0)),
            tx,
        )
        .unwrap();
        (controller, narrator, rx)
    }

    /// Hold a hand up from `start` until the hold completes
    fn complete_hold(controller: &mut SessionController, start: u64) -> CelebrationTimer {
        assert!(controller.observe(DetectionSample::present(start)).is_none());
        controller
            .observe(DetectionSample::present(start + 3000))
            .expect("hold should complete")
    }

    fn snapshots(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionSnapshot> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::Snapshot(s) = event {
                out.push(s);
            }
        }
        out
    }

    #[test]
    fn test_empty_items_rejected() {
        let (tx, _) = broadcast::channel(4);
        let result = SessionController::new(
            Vec::new(),
            SessionConfig::default(),
            Arc::new(UnavailableNarrator),
            Arc::new(ManualClock::new(0)),
            tx,
        );
        assert!(matches!(result, Err(SessionError::EmptyCatalog)));
    }

    #[test]
    fn test_start_presents_first_item_once() {
        let (mut sc, narrator, mut rx) = create_controller(3);
        sc.start();
        sc.start();

        assert_eq!(narrator.spoken(), vec!["Bonjour"]);
        assert_eq!(snapshots(&mut rx).len(), 1);
        assert_eq!(sc.phase(), Phase::AwaitingHold);
    }

    #[test]
    fn test_samples_ignored_before_start() {
        let (mut sc, _, _) = create_controller(3);
        assert!(sc.observe(DetectionSample::present(0)).is_none());
        assert!(sc.observe(DetectionSample::present(5000)).is_none());
        assert_eq!(sc.score(), 0);
    }

    #[test]
    fn test_completion_then_advance() {
        let (mut sc, narrator, _) = create_controller(3);
        sc.start();

        let timer = complete_hold(&mut sc, 0);
        assert_eq!(sc.phase(), Phase::Celebrating);
        assert_eq!(sc.score(), 1);
        assert_eq!(timer.duration, Duration::from_millis(DEFAULT_CELEBRATION_MS));

        assert!(sc.celebration_elapsed(timer.generation));
        assert_eq!(sc.current_index(), 1);
        assert_eq!(sc.phase(), Phase::AwaitingHold);
        assert_eq!(sc.hold_progress(), 0.0);
        assert_eq!(narrator.spoken(), vec!["Bonjour", "Bravo!", "Merci"]);
    }

    #[test]
    fn test_last_item_finishes() {
        let (mut sc, narrator, _) = create_controller(3);
        sc.navigate(Navigation::GoTo(2));

        let timer = complete_hold(&mut sc, 0);
        assert!(sc.celebration_elapsed(timer.generation));

        assert_eq!(sc.phase(), Phase::Finished);
        assert_eq!(sc.current_index(), 2);
        assert_eq!(sc.score(), 1);
        assert_eq!(
            narrator.spoken().last().map(String::as_str),
            Some("Tu as terminé la leçon. Bravo!")
        );
    }

    #[test]
    fn test_holds_ignored_while_celebrating() {
        let (mut sc, _, _) = create_controller(3);
        sc.start();
        complete_hold(&mut sc, 0);

        assert!(sc.observe(DetectionSample::present(3100)).is_none());
        assert!(sc.observe(DetectionSample::present(9000)).is_none());
        assert_eq!(sc.score(), 1);
        assert_eq!(sc.completed(), ["bonjour"]);
    }

    #[test]
    fn test_navigation_cancels_celebration() {
        let (mut sc, _, mut rx) = create_controller(3);
        sc.start();
        sc.navigate(Navigation::Next);
        let timer = complete_hold(&mut sc, 0);
        assert_eq!(sc.phase(), Phase::Celebrating);

        sc.navigate(Navigation::Previous);
        snapshots(&mut rx);

        // the old timer fires anyway
        assert!(!sc.celebration_elapsed(timer.generation));
        assert_eq!(sc.current_index(), 0);
        assert_eq!(sc.phase(), Phase::AwaitingHold);
        assert_eq!(sc.score(), 1);
        assert!(snapshots(&mut rx).is_empty());
    }

    #[test]
    fn test_stale_timer_after_restart_is_noop() {
        let (mut sc, _, _) = create_controller(3);
        sc.start();
        let timer = complete_hold(&mut sc, 0);
        sc.restart();

        assert!(!sc.celebration_elapsed(timer.generation));
        assert_eq!(sc.score(), 0);
        assert_eq!(sc.current_index(), 0);
        assert!(sc.completed().is_empty());
    }

    #[test]
    fn test_timer_cannot_fire_twice() {
        let (mut sc, _, _) = create_controller(3);
        sc.start();
        let timer = complete_hold(&mut sc, 0);

        assert!(sc.celebration_elapsed(timer.generation));
        assert!(!sc.celebration_elapsed(timer.generation));
        assert_eq!(sc.current_index(), 1);
    }

    #[test]
    fn test_navigation_clamps() {
        let (mut sc, _, _) = create_controller(3);
        sc.start();

        sc.navigate(Navigation::Previous);
        assert_eq!(sc.current_index(), 0);
        sc.navigate(Navigation::GoTo(99));
        assert_eq!(sc.current_index(), 2);
        sc.navigate(Navigation::Next);
        assert_eq!(sc.current_index(), 2);
    }

    #[test]
    fn test_navigation_resets_hold_and_keeps_score() {
        let (mut sc, _, _) = create_controller(3);
        sc.start();
        let timer = complete_hold(&mut sc, 0);
        sc.celebration_elapsed(timer.generation);

        sc.observe(DetectionSample::present(10_000));
        sc.observe(DetectionSample::present(12_000));
        assert!(sc.hold_progress() > 0.6);

        sc.navigate(Navigation::Previous);
        assert_eq!(sc.hold_progress(), 0.0);
        assert_eq!(sc.score(), 1);
        // hold restarts from zero after navigating
        assert!(sc.observe(DetectionSample::present(13_000)).is_none());
    }

    #[test]
    fn test_finished_can_be_revisited() {
        let (mut sc, _, _) = create_controller(1);
        sc.start();
        let timer = complete_hold(&mut sc, 0);
        sc.celebration_elapsed(timer.generation);
        assert_eq!(sc.phase(), Phase::Finished);

        assert!(sc.observe(DetectionSample::present(5000)).is_none());

        sc.navigate(Navigation::GoTo(0));
        assert_eq!(sc.phase(), Phase::AwaitingHold);
    }

    #[test]
    fn test_score_never_exceeds_item_count() {
        let (mut sc, _, _) = create_controller(2);
        sc.start();

        let mut t = 0;
        for _ in 0..5 {
            let timer = complete_hold(&mut sc, t);
            sc.celebration_elapsed(timer.generation);
            sc.navigate(Navigation::GoTo(0));
            t += 10_000;
        }

        assert_eq!(sc.score(), 2);
        assert_eq!(sc.completed().len(), 5);
    }

    #[test]
    fn test_narration_failure_does_not_block() {
        let (tx, _) = broadcast::channel(16);
        let mut sc = SessionController::new(
            items(2),
            SessionConfig::default(),
            Arc::new(UnavailableNarrator),
            Arc::new(ManualClock::new(0)),
            tx,
        )
        .unwrap();

        sc.start();
        let timer = complete_hold(&mut sc, 0);
        assert!(sc.celebration_elapsed(timer.generation));
        assert_eq!(sc.current_index(), 1);
    }

    #[test]
    fn test_progress_events_only_on_change() {
        let (mut sc, _, mut rx) = create_controller(3);
        sc.start();
        snapshots(&mut rx);

        sc.observe(DetectionSample::absent(0));
        sc.observe(DetectionSample::present(100));
        sc.observe(DetectionSample::present(1600));
        sc.observe(DetectionSample::present(1600));

        let mut progress = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::HoldProgress { progress: p, .. } = event {
                progress.push(p);
            }
        }
        assert_eq!(progress, vec![0.5]);
    }

    fn progress_events(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<(String, f32)> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::HoldProgress { item_id, progress } = event {
                out.push((item_id, progress));
            }
        }
        out
    }

    #[test]
    fn test_navigation_mid_hold_empties_progress() {
        let (mut sc, _, mut rx) = create_controller(3);
        sc.start();
        sc.observe(DetectionSample::present(0));
        sc.observe(DetectionSample::present(2000));
        progress_events(&mut rx);

        sc.navigate(Navigation::Next);
        sc.observe(DetectionSample::absent(2100));
        sc.observe(DetectionSample::present(2200));

        assert_eq!(progress_events(&mut rx), vec![("merci".to_string(), 0.0)]);
        assert_eq!(sc.hold_progress(), 0.0);
    }

    #[test]
    fn test_completion_empties_progress_before_next_item() {
        let (mut sc, _, mut rx) = create_controller(3);
        sc.start();
        let timer = complete_hold(&mut sc, 0);
        sc.celebration_elapsed(timer.generation);

        assert_eq!(
            progress_events(&mut rx),
            vec![("bonjour".to_string(), 1.0), ("bonjour".to_string(), 0.0)]
        );

        // the next item starts from an empty ring without a duplicate reset
        sc.observe(DetectionSample::present(10_000));
        assert!(progress_events(&mut rx).is_empty());
    }

    #[test]
    fn test_snapshot_sequence_for_one_item() {
        let (mut sc, _, mut rx) = create_controller(3);
        sc.start();
        let timer = complete_hold(&mut sc, 0);
        sc.celebration_elapsed(timer.generation);

        let phases: Vec<(Phase, usize, usize)> = snapshots(&mut rx)
            .into_iter()
            .map(|s| (s.phase, s.current_index, s.score))
            .collect();
        assert_eq!(
            phases,
            vec![
                (Phase::AwaitingHold, 0, 0),
                (Phase::Celebrating, 0, 1),
                (Phase::AwaitingHold, 1, 1),
            ]
        );
    }
}
