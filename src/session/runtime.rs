//! Async driver for a practice session
//!
//! Owns the controller and reacts to three inputs: detector frames,
//! presentation-layer commands, and the celebration deadline. Everything
//! runs on one task, so transitions never race each other.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::detector::{DetectionAdapter, HandFrame};

use super::controller::{CelebrationTimer, Navigation, SessionController};

/// Requests from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Previous/next controls or a direct jump
    Navigate { to: Navigation },
    /// Start the lesson over
    Restart,
}

/// A celebration window waiting to elapse
#[derive(Debug, Clone, Copy)]
struct PendingCelebration {
    generation: u64,
    deadline: Instant,
}

/// Runs a [`SessionController`] against live channels
pub struct SessionRuntime {
    controller: SessionController,
    adapter: DetectionAdapter,
}

impl SessionRuntime {
    /// Create a runtime around a controller and detector adapter
    pub fn new(controller: SessionController, adapter: DetectionAdapter) -> Self {
        Self {
            controller,
            adapter,
        }
    }

    /// Get the controller, for inspecting session state
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Start the session and process input until every source is closed
    ///
    /// A closed frame channel means the detector stopped; the session keeps
    /// honouring commands and any pending celebration.
    pub async fn run(
        &mut self,
        mut frames: mpsc::Receiver<HandFrame>,
        mut commands: mpsc::Receiver<SessionCommand>,
    ) {
        self.controller.start();

        let mut frames_open = true;
        let mut commands_open = true;
        let mut pending: Option<PendingCelebration> = None;

        while frames_open || commands_open || pending.is_some() {
            let deadline = pending.map(|p| p.deadline).unwrap_or_else(Instant::now);

            tokio::select! {
                frame = frames.recv(), if frames_open => match frame {
                    Some(frame) => {
                        if let Some(timer) = self.handle_frame(&frame) {
                            pending = Some(PendingCelebration {
                                generation: timer.generation,
                                deadline: Instant::now() + timer.duration,
                            });
                        }
                    }
                    None => {
                        info!("detector stopped delivering frames");
                        frames_open = false;
                    }
                },

                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        if pending.take().is_some() {
                            debug!("pending celebration cancelled");
                        }
                        self.handle_command(command);
                    }
                    None => {
                        debug!("command channel closed");
                        commands_open = false;
                    }
                },

                _ = sleep_until(deadline), if pending.is_some() => {
                    if let Some(p) = pending.take() {
                        self.controller.celebration_elapsed(p.generation);
                    }
                }
            }
        }

        info!(
            score = self.controller.score(),
            phase = %self.controller.phase(),
            "session runtime stopped"
        );
    }

    fn handle_frame(&mut self, frame: &HandFrame) -> Option<CelebrationTimer> {
        let sample = self.adapter.to_sample(frame, self.controller.current_item());
        self.controller.observe(sample)
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Navigate { to } => self.controller.navigate(to),
            SessionCommand::Restart => self.controller.restart(),
        }
    }
}
